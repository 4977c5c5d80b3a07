//! Combi Display
//!
//! The paytable screen: a symbol × tier grid with one highlighted cell per
//! row, side panels whose color follows jackpots and farkles, a jackpot
//! video, message overlays, and the lose-final screamer.
//!
//! ## States
//!
//! ```text
//! Hidden ──show──► Visible ⇄ Highlighted ──jackpot──► JackpotFlash ──jackpot-end──► (back)
//!    any ──lose-final──► LoseFinal
//! ```

use af_channel::{ChannelClient, Event, Message, MessageSize};
use af_core::{CabinetConfig, ChannelId, Paytable, Rgb, Tier};
use af_tween::{Animator, Ease, Timeline, TransitionToken};

use crate::display::Display;
use crate::host::{SceneHost, SurfaceSnapshot};
use crate::overlay::OverlaySlot;

/// Model tinted by jackpot / farkle
pub const COMBI_MODEL: &str = "combi";
/// Video played on lose-final
pub const SCREAMER_VIDEO: &str = "right-screamer";
/// Playback rate of the screamer
pub const SCREAMER_RATE: f32 = 1.2;
/// Farkle and lose-final color
pub const ALERT_COLOR: Rgb = Rgb::new(1.0, 71.0 / 255.0, 38.0 / 255.0);
/// Side panels and overlay color outside of flashes
pub const NEUTRAL_COLOR: Rgb = Rgb::WHITE;

/// Jackpot palette keyed by symbol
pub fn jackpot_palette(symbol: &str) -> Option<Rgb> {
    let packed = match symbol {
        "🍋" => 0xd9ffd9,
        "🍒" => 0xff99cc,
        "🍊" => 0xffd280,
        "🍇" => 0x804d80,
        "7" => 0x80ffff,
        _ => return None,
    };
    Some(Rgb::from_u32(packed))
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES / CUES / PHASE
// ═══════════════════════════════════════════════════════════════════════════════

/// Animated properties of the combi surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CombiProperty {
    GridOpacity,
    SidePanelOpacity,
    SidePanelColor,
    /// Overlay `--primary-color`
    PrimaryColor,
    OverlayOpacity,
    JackpotVideoOpacity,
    /// Underlying 3D canvas (fullscreen messages only)
    CanvasOpacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombiCue {
    ShowComplete,
    HideComplete,
    FarkleRevert,
}

/// Observable state of the combi display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombiPhase {
    Hidden,
    Visible,
    Highlighted,
    JackpotFlash,
    LoseFinal,
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMBI DISPLAY
// ═══════════════════════════════════════════════════════════════════════════════

pub struct CombiDisplay<H: SceneHost> {
    client: ChannelClient,
    host: H,
    animator: Animator<CombiProperty, CombiCue>,
    overlay: OverlaySlot,
    paytable: Paytable,
    /// Highlighted tier per paytable row
    highlights: Vec<Option<Tier>>,
    visible: bool,
    jackpot: Option<String>,
    pending_reverts: u32,
    lose_final: bool,
    message: Option<Message>,
    message_fade: Option<TransitionToken>,
    farkle_secs: f32,
}

impl<H: SceneHost> CombiDisplay<H> {
    /// Build the paytable and take the initial snapshot
    pub fn new(client: ChannelClient, host: H, config: &CabinetConfig) -> Self {
        let paytable = Paytable::build(config);
        let animator = Animator::new()
            .with_value(CombiProperty::GridOpacity, 0.0)
            .with_value(CombiProperty::SidePanelOpacity, 0.0)
            .with_value(CombiProperty::SidePanelColor, NEUTRAL_COLOR)
            .with_value(CombiProperty::PrimaryColor, NEUTRAL_COLOR)
            .with_value(CombiProperty::OverlayOpacity, 1.0)
            .with_value(CombiProperty::JackpotVideoOpacity, 0.0)
            .with_value(CombiProperty::CanvasOpacity, 1.0);

        let mut display = Self {
            client,
            host,
            animator,
            overlay: OverlaySlot::new(),
            highlights: vec![None; paytable.len()],
            paytable,
            visible: false,
            jackpot: None,
            pending_reverts: 0,
            lose_final: false,
            message: None,
            message_fade: None,
            farkle_secs: config.timing.farkle_secs,
        };
        display.snapshot();
        display
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }

    pub fn animator(&self) -> &Animator<CombiProperty, CombiCue> {
        &self.animator
    }

    pub fn value(&self, property: CombiProperty) -> f32 {
        self.animator.scalar(property)
    }

    pub fn color(&self, property: CombiProperty) -> Option<Rgb> {
        self.animator.color(property)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Farkle flash still waiting for its revert
    pub fn is_alert(&self) -> bool {
        self.pending_reverts > 0
    }

    pub fn overlay(&self) -> &OverlaySlot {
        &self.overlay
    }

    /// Highlighted tier in a paytable row
    pub fn highlight(&self, row: usize) -> Option<Tier> {
        self.highlights.get(row).copied().flatten()
    }

    /// Highlighted tier for a symbol
    pub fn highlight_of(&self, symbol: &str) -> Option<Tier> {
        self.paytable.row_of(symbol).and_then(|row| self.highlight(row))
    }

    pub fn highlighted_cells(&self) -> Vec<(usize, Tier)> {
        self.highlights
            .iter()
            .enumerate()
            .filter_map(|(row, tier)| tier.map(|t| (row, t)))
            .collect()
    }

    pub fn phase(&self) -> CombiPhase {
        if self.lose_final {
            CombiPhase::LoseFinal
        } else if self.jackpot.is_some() {
            CombiPhase::JackpotFlash
        } else if !self.visible {
            CombiPhase::Hidden
        } else if self.highlights.iter().any(Option::is_some) {
            CombiPhase::Highlighted
        } else {
            CombiPhase::Visible
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshot
    // ─────────────────────────────────────────────────────────────────────────

    fn snapshot(&mut self) {
        let mut snapshot = SurfaceSnapshot::of(ChannelId::Combi)
            .visible(self.visible)
            .properties(self.animator.store())
            .highlights(self.highlighted_cells());
        if let Some(message) = &self.message {
            snapshot = snapshot.text("message", message.message.clone());
        }
        self.overlay.refresh(&mut self.host, &snapshot);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Visibility
    // ─────────────────────────────────────────────────────────────────────────

    pub fn show(&mut self, immediate: bool) {
        self.visible = true;
        if immediate {
            self.animator.set(CombiProperty::GridOpacity, 1.0);
            self.animator.set(CombiProperty::SidePanelOpacity, 1.0);
            self.host.set_model_visible(COMBI_MODEL, true, false);
            self.snapshot();
            return;
        }

        self.animator.start(
            Timeline::new()
                .from_to_at(CombiProperty::GridOpacity, 0.0, 1.0, 1.0, Ease::Power1Out, 1.0)
                .from_to_at(CombiProperty::SidePanelOpacity, 0.0, 1.0, 1.0, Ease::Power1Out, 1.0)
                .on_complete(CombiCue::ShowComplete),
        );
        self.host.set_model_visible(COMBI_MODEL, true, true);
    }

    pub fn hide(&mut self, immediate: bool) {
        self.visible = false;
        if immediate {
            self.animator.set(CombiProperty::GridOpacity, 0.0);
            self.host.set_model_visible(COMBI_MODEL, false, false);
            self.animator.set(CombiProperty::SidePanelOpacity, 0.0);
            self.snapshot();
            return;
        }

        self.animator.start(
            Timeline::new()
                .from_to_at(CombiProperty::GridOpacity, 1.0, 0.0, 0.5, Ease::Power1Out, 0.5)
                .to_at(CombiProperty::SidePanelOpacity, 0.0, 0.5, Ease::Rough, 0.5)
                .on_complete(CombiCue::HideComplete),
        );
        self.host.set_model_visible(COMBI_MODEL, false, true);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Highlight
    // ─────────────────────────────────────────────────────────────────────────

    /// Clear every highlight
    pub fn reset(&mut self) {
        self.highlights.iter_mut().for_each(|h| *h = None);
        self.snapshot();
    }

    /// Move the highlight of `symbol`'s row to the `value` tier
    pub fn update_combi(&mut self, symbol: &str, value: &str) {
        let (Some(row), Some(tier)) = (self.paytable.row_of(symbol), Tier::from_highlight(value))
        else {
            log::warn!("[Combi] Invalid symbol or value: {symbol} {value}");
            return;
        };

        // one cell per row: the slot replaces the previous tier
        self.highlights[row] = Some(tier);
        self.snapshot();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Flashes
    // ─────────────────────────────────────────────────────────────────────────

    fn tween_palette(&mut self, color: Rgb) {
        self.animator.start(
            Timeline::new()
                .to_at(CombiProperty::SidePanelColor, color, 0.5, Ease::Rough, 0.0)
                .to_at(CombiProperty::PrimaryColor, color, 0.5, Ease::Rough, 0.0),
        );
    }

    pub fn jackpot(&mut self, symbol: &str) {
        self.animator.start(Timeline::new().to_at(
            CombiProperty::JackpotVideoOpacity,
            1.0,
            0.5,
            Ease::Rough,
            0.1,
        ));

        match jackpot_palette(symbol) {
            Some(color) => {
                self.tween_palette(color);
                self.host.set_tint(COMBI_MODEL, color);
            }
            None => log::debug!("[Combi] No jackpot palette for '{symbol}'"),
        }
        self.jackpot = Some(symbol.to_string());
    }

    pub fn jackpot_end(&mut self) {
        self.animator.start(Timeline::new().to(
            CombiProperty::JackpotVideoOpacity,
            0.0,
            0.5,
            Ease::Rough,
        ));
        self.tween_palette(NEUTRAL_COLOR);
        self.host.set_tint(COMBI_MODEL, Rgb::WHITE);
        self.jackpot = None;
    }

    /// Alert flash; reverts on its own after the farkle window
    pub fn farkle(&mut self) {
        self.tween_palette(ALERT_COLOR);
        self.host.set_tint(COMBI_MODEL, ALERT_COLOR);
        self.animator
            .delayed_call(self.farkle_secs, CombiCue::FarkleRevert);
        self.pending_reverts += 1;
    }

    fn farkle_revert(&mut self) {
        self.tween_palette(NEUTRAL_COLOR);
        self.host.set_tint(COMBI_MODEL, Rgb::WHITE);
        self.pending_reverts = self.pending_reverts.saturating_sub(1);
    }

    pub fn lose_final(&mut self) {
        log::info!("[Combi] Lose final");
        self.lose_final = true;
        self.host.set_tint(COMBI_MODEL, ALERT_COLOR);
        self.animator.start(Timeline::new().to(
            CombiProperty::OverlayOpacity,
            0.0,
            0.5,
            Ease::Power1Out,
        ));
        self.host.play_video(SCREAMER_VIDEO, SCREAMER_RATE);
    }

    /// Host callback: a video finished playing
    pub fn on_video_ended(&mut self, video: &str) {
        if video != SCREAMER_VIDEO {
            log::debug!("[Combi] Video '{video}' ended");
            return;
        }
        self.animator.set(CombiProperty::OverlayOpacity, 1.0);
        self.hide(true);
        self.host.set_tint(COMBI_MODEL, Rgb::WHITE);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────────

    pub fn show_message(&mut self, message: &Message) {
        let mut timeline = Timeline::new()
            .from_to_at(CombiProperty::GridOpacity, 1.0, 0.0, 0.5, Ease::Rough, 0.0)
            .from_to_at(CombiProperty::SidePanelOpacity, 1.0, 0.0, 0.5, Ease::Rough, 0.0);
        if message.size == MessageSize::Fullscreen {
            timeline =
                timeline.from_to_at(CombiProperty::CanvasOpacity, 1.0, 0.0, 0.5, Ease::Rough, 0.0);
        }
        self.message = Some(message.clone());
        self.message_fade = Some(self.animator.start(timeline));
    }

    pub fn hide_message(&mut self) {
        self.message = None;
        self.message_fade = Some(
            self.animator.start(
                Timeline::new()
                    .from_to_at(CombiProperty::CanvasOpacity, 0.0, 1.0, 0.5, Ease::Rough, 0.0)
                    .from_to_at(CombiProperty::GridOpacity, 0.0, 1.0, 0.5, Ease::Rough, 0.0)
                    .from_to_at(CombiProperty::SidePanelOpacity, 0.0, 1.0, 0.5, Ease::Rough, 0.0),
            ),
        );
    }
}

impl<H: SceneHost> Display for CombiDisplay<H> {
    fn client(&self) -> &ChannelClient {
        &self.client
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Show(v) => self.show(v.immediate),
            Event::Hide(v) => self.hide(v.immediate),
            Event::Reset | Event::ResetCombi => self.reset(),
            Event::UpdateCombi(update) => self.update_combi(&update.symbol, &update.value),
            Event::Jackpot(info) => self.jackpot(&info.symbol),
            Event::JackpotEnd => self.jackpot_end(),
            Event::Farkle => self.farkle(),
            Event::LoseFinal => self.lose_final(),
            Event::ShowMessage(message) => self.show_message(message),
            Event::HideMessage => self.hide_message(),
            other => log::trace!("[Combi] Ignoring '{}'", other.name()),
        }
    }

    fn advance(&mut self, dt: f32) {
        let fading = self
            .message_fade
            .is_some_and(|token| self.animator.is_active(token));

        for cue in self.animator.advance(dt) {
            match cue {
                CombiCue::ShowComplete | CombiCue::HideComplete => self.snapshot(),
                CombiCue::FarkleRevert => self.farkle_revert(),
            }
        }

        // message fades refresh the ghost every frame
        if fading {
            self.snapshot();
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use af_channel::Router;
    use approx::assert_relative_eq;

    fn combi() -> CombiDisplay<RecordingHost> {
        let router = Router::new();
        let client = router.register(ChannelId::Combi);
        CombiDisplay::new(client, RecordingHost::new(), &CabinetConfig::default())
    }

    fn run(display: &mut CombiDisplay<RecordingHost>, secs: f32) {
        let frames = (secs * 60.0).round() as usize;
        for _ in 0..frames {
            display.advance(1.0 / 60.0);
        }
    }

    #[test]
    fn test_initial_snapshot() {
        let display = combi();
        assert_eq!(display.host().live_overlays(), 1);
        assert_eq!(display.phase(), CombiPhase::Hidden);
    }

    #[test]
    fn test_immediate_show_snapshots_at_once() {
        let mut display = combi();
        display.show(true);
        assert_eq!(display.value(CombiProperty::GridOpacity), 1.0);
        assert_eq!(display.value(CombiProperty::SidePanelOpacity), 1.0);
        assert_eq!(display.host().model_visible(COMBI_MODEL), Some(true));
        assert_eq!(display.overlay().refresh_count(), 2);
        assert!(display.host().latest_overlay().unwrap().visible);
    }

    #[test]
    fn test_animated_show_snapshots_on_completion() {
        let mut display = combi();
        display.show(false);
        run(&mut display, 0.5);
        assert_eq!(display.value(CombiProperty::GridOpacity), 0.0);
        assert_eq!(display.overlay().refresh_count(), 1);

        run(&mut display, 1.6);
        assert_relative_eq!(display.value(CombiProperty::GridOpacity), 1.0);
        assert_eq!(display.overlay().refresh_count(), 2);
        assert_eq!(display.host().live_overlays(), 1);
    }

    #[test]
    fn test_animated_hide_window() {
        let mut display = combi();
        display.show(true);
        display.hide(false);
        run(&mut display, 0.4);
        assert_relative_eq!(display.value(CombiProperty::GridOpacity), 1.0);
        run(&mut display, 0.7);
        assert_eq!(display.value(CombiProperty::GridOpacity), 0.0);
        assert_eq!(display.value(CombiProperty::SidePanelOpacity), 0.0);
        assert_eq!(display.overlay().refresh_count(), 3);
    }

    #[test]
    fn test_update_moves_highlight_within_row() {
        let mut display = combi();
        display.update_combi("🍒", "x1");
        display.update_combi("🍒", "x3");
        assert_eq!(display.highlight_of("🍒"), Some(Tier::X3));
        assert_eq!(display.highlighted_cells().len(), 1);

        display.update_combi("🍋", "x2");
        assert_eq!(display.highlight_of("🍋"), Some(Tier::X1));
        assert_eq!(display.highlighted_cells().len(), 2);
    }

    #[test]
    fn test_invalid_update_is_ignored() {
        let mut display = combi();
        let before = display.overlay().refresh_count();
        display.update_combi("🥥", "x3");
        display.update_combi("🍒", "x7");
        assert!(display.highlighted_cells().is_empty());
        assert_eq!(display.overlay().refresh_count(), before);
    }

    #[test]
    fn test_unknown_jackpot_symbol_keeps_palette() {
        let mut display = combi();
        display.jackpot("💀");
        run(&mut display, 1.0);
        assert_relative_eq!(display.value(CombiProperty::JackpotVideoOpacity), 1.0);
        assert_eq!(display.color(CombiProperty::SidePanelColor), Some(NEUTRAL_COLOR));
        assert_eq!(display.host().tint(COMBI_MODEL), None);
    }

    #[test]
    fn test_message_fade_snapshots_each_frame() {
        let mut display = combi();
        display.show(true);
        let before = display.overlay().refresh_count();
        display.show_message(&Message::fullscreen("Shooter time"));
        run(&mut display, 0.25);
        assert_eq!(display.overlay().refresh_count(), before + 15);
        run(&mut display, 1.0);
        assert_eq!(display.value(CombiProperty::CanvasOpacity), 0.0);
        assert_eq!(display.host().live_overlays(), 1);

        display.hide_message();
        run(&mut display, 1.0);
        assert_eq!(display.value(CombiProperty::GridOpacity), 1.0);
        assert!(display.message().is_none());
    }

    #[test]
    fn test_show_during_message_fade_restores_canvas() {
        let mut display = combi();
        display.show(true);
        display.show_message(&Message::fullscreen("Shooter time"));
        run(&mut display, 1.0);
        display.hide_message();
        run(&mut display, 0.2);
        display.hide(true);
        display.show(false);
        run(&mut display, 2.5);

        assert_eq!(display.value(CombiProperty::CanvasOpacity), 1.0);
        assert_eq!(display.value(CombiProperty::GridOpacity), 1.0);
        assert!(display.animator().is_idle());
    }
}
