//! Shooter bonus round
//!
//! Five targets pop up with the gun. Each button press knocks its target
//! down and reports the hit to the scene; the round ends when every
//! target is down or the time runs out.

use af_channel::{ButtonPress, ChannelClient, Event};
use af_core::{CabinetConfig, ChannelId, WHEEL_COUNT};
use af_tween::{Animator, Ease, Timeline, TransitionToken};

use crate::display::Display;
use crate::host::SceneHost;

pub const GUN_MODEL: &str = "gun";
pub const TARGET_COUNT: usize = WHEEL_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShooterProperty {
    /// 0 standing, 1 knocked down
    TargetTilt(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShooterCue {
    TimeUp,
}

pub struct ShooterDisplay<H: SceneHost> {
    client: ChannelClient,
    host: H,
    animator: Animator<ShooterProperty, ShooterCue>,
    targets: [bool; TARGET_COUNT],
    active: bool,
    timer: Option<TransitionToken>,
    duration: f32,
    hits: u32,
}

impl<H: SceneHost> ShooterDisplay<H> {
    pub fn new(client: ChannelClient, host: H, config: &CabinetConfig) -> Self {
        let animator = (0..TARGET_COUNT as u8).fold(Animator::new(), |a, i| {
            a.with_value(ShooterProperty::TargetTilt(i), 1.0)
        });
        Self {
            client,
            host,
            animator,
            targets: [false; TARGET_COUNT],
            active: false,
            timer: None,
            duration: config.timing.shooter_secs,
            hits: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_target_up(&self, index: usize) -> bool {
        self.targets.get(index).copied().unwrap_or(false)
    }

    pub fn tilt(&self, index: usize) -> f32 {
        self.animator.scalar(ShooterProperty::TargetTilt(index as u8))
    }

    /// Hits in the current or last round
    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn start(&mut self) {
        if self.active {
            log::warn!("[Shooter] Already running");
            return;
        }
        log::info!("[Shooter] Start ({}s)", self.duration);
        self.active = true;
        self.hits = 0;
        self.targets = [true; TARGET_COUNT];
        for i in 0..TARGET_COUNT as u8 {
            self.animator.start(Timeline::new().to(
                ShooterProperty::TargetTilt(i),
                0.0,
                0.3,
                Ease::Power2Out,
            ));
        }
        self.host.set_model_visible(GUN_MODEL, true, true);
        self.timer = Some(self.animator.delayed_call(self.duration, ShooterCue::TimeUp));
    }

    pub fn hit(&mut self, index: usize) {
        if !self.active {
            return;
        }
        match self.targets.get_mut(index) {
            Some(up) if *up => *up = false,
            Some(_) => return,
            None => {
                log::warn!("[Shooter] Target index {index} out of range");
                return;
            }
        }

        self.hits += 1;
        self.animator.start(Timeline::new().to(
            ShooterProperty::TargetTilt(index as u8),
            1.0,
            0.3,
            Ease::Power2Out,
        ));
        self.host.play_audio("shooter-hit");
        self.client
            .send(ChannelId::Scene, Event::ShooterHit(ButtonPress { index }));

        if self.targets.iter().all(|up| !up) {
            self.finish();
        }
    }

    fn finish(&mut self) {
        log::info!("[Shooter] End with {} hits", self.hits);
        self.active = false;
        if let Some(token) = self.timer.take() {
            self.animator.cancel(token);
        }
        self.host.set_model_visible(GUN_MODEL, false, true);
        self.client.send(ChannelId::Scene, Event::EndShooter);
    }
}

impl<H: SceneHost> Display for ShooterDisplay<H> {
    fn client(&self) -> &ChannelClient {
        &self.client
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::StartShooter => self.start(),
            Event::Button(press) => self.hit(press.index),
            other => log::trace!("[Shooter] Ignoring '{}'", other.name()),
        }
    }

    fn advance(&mut self, dt: f32) {
        for cue in self.animator.advance(dt) {
            match cue {
                ShooterCue::TimeUp => {
                    self.timer = None;
                    if self.active {
                        self.finish();
                    }
                }
            }
        }
    }
}
