//! Score display
//!
//! Five score texts, a message line and a visibility fade. `ScoreBoard`
//! is shared with the physical debug panel, which mirrors the same texts.

use af_channel::{ChannelClient, Event, Message};
use af_core::ChannelId;
use af_tween::{Animator, Ease, Timeline};

use crate::display::Display;
use crate::host::{SceneHost, SurfaceSnapshot};
use crate::overlay::OverlaySlot;

/// Score texts as last announced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    pub collected: i64,
    pub rolling: i64,
    pub spin_tokens: i64,
    pub rounds: i64,
    pub quota: i64,
}

impl ScoreBoard {
    /// Apply an `update-*` event; false for any other event
    pub fn apply(&mut self, event: &Event) -> bool {
        match event {
            Event::UpdateCollectedPoints(a) => self.collected = a.value,
            Event::UpdateRollingPoints(a) => self.rolling = a.value,
            Event::UpdateSpinTokens(update) => self.spin_tokens = update.apply(self.spin_tokens),
            Event::UpdateRounds(a) => self.rounds = a.value,
            Event::UpdateQuota(a) => self.quota = a.value,
            _ => return false,
        }
        true
    }

    /// (field name, text) pairs
    pub fn texts(&self) -> [(&'static str, String); 5] {
        [
            ("collected", self.collected.to_string()),
            ("rolling", self.rolling.to_string()),
            ("spin-tokens", self.spin_tokens.to_string()),
            ("rounds", self.rounds.to_string()),
            ("quota", self.quota.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreProperty {
    Opacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCue {
    FadeComplete,
}

pub struct ScoreDisplay<H: SceneHost> {
    client: ChannelClient,
    host: H,
    animator: Animator<ScoreProperty, ScoreCue>,
    overlay: OverlaySlot,
    board: ScoreBoard,
    message: Option<Message>,
    visible: bool,
}

impl<H: SceneHost> ScoreDisplay<H> {
    pub fn new(client: ChannelClient, host: H) -> Self {
        let mut display = Self {
            client,
            host,
            animator: Animator::new().with_value(ScoreProperty::Opacity, 0.0),
            overlay: OverlaySlot::new(),
            board: ScoreBoard::default(),
            message: None,
            visible: false,
        };
        display.snapshot();
        display
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f32 {
        self.animator.scalar(ScoreProperty::Opacity)
    }

    pub fn overlay(&self) -> &OverlaySlot {
        &self.overlay
    }

    fn snapshot(&mut self) {
        let mut snapshot = SurfaceSnapshot::of(ChannelId::Score)
            .visible(self.visible)
            .properties(self.animator.store());
        for (name, text) in self.board.texts() {
            snapshot = snapshot.text(name, text);
        }
        if let Some(message) = &self.message {
            snapshot = snapshot.text("message", message.message.clone());
        }
        self.overlay.refresh(&mut self.host, &snapshot);
    }

    fn fade(&mut self, visible: bool, immediate: bool) {
        self.visible = visible;
        let target = if visible { 1.0 } else { 0.0 };
        if immediate {
            self.animator.set(ScoreProperty::Opacity, target);
            self.snapshot();
            return;
        }
        self.animator.start(
            Timeline::new()
                .to(ScoreProperty::Opacity, target, 0.5, Ease::Power1Out)
                .on_complete(ScoreCue::FadeComplete),
        );
    }

    pub fn show(&mut self, immediate: bool) {
        self.fade(true, immediate);
    }

    pub fn hide(&mut self, immediate: bool) {
        self.fade(false, immediate);
    }

    pub fn show_message(&mut self, message: &Message) {
        self.message = Some(message.clone());
        self.snapshot();
    }

    pub fn hide_message(&mut self) {
        self.message = None;
        self.snapshot();
    }
}

impl<H: SceneHost> Display for ScoreDisplay<H> {
    fn client(&self) -> &ChannelClient {
        &self.client
    }

    fn handle_event(&mut self, event: &Event) {
        if self.board.apply(event) {
            self.snapshot();
            return;
        }
        match event {
            Event::Show(v) => self.show(v.immediate),
            Event::Hide(v) => self.hide(v.immediate),
            Event::ShowMessage(message) => self.show_message(message),
            Event::HideMessage => self.hide_message(),
            other => log::trace!("[Score] Ignoring '{}'", other.name()),
        }
    }

    fn advance(&mut self, dt: f32) {
        for cue in self.animator.advance(dt) {
            match cue {
                ScoreCue::FadeComplete => self.snapshot(),
            }
        }
    }
}
