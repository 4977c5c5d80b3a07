//! Fixed-step cabinet loop
//!
//! Wires the orchestrator and every display to one router and steps them
//! in a fixed order each frame. Video playback is simulated: a started
//! video ends after its length divided by the playback rate.

use af_channel::{ChannelClient, Event, Router, RouterStats};
use af_core::{CabinetConfig, ChannelId, Multiplier};
use af_display::{
    CombiDisplay, Display, MachineDisplay, PhysicalDisplay, RecordingHost, ScoreDisplay,
    ShooterDisplay,
};
use af_game::{GamePhase, GameResult, GameState, Orchestrator, SessionStats};
use serde::Serialize;

use crate::player::{PlayerAction, ScriptedPlayer};

/// Length of every simulated video at rate 1.0
pub const VIDEO_SECS: f32 = 2.5;

/// End-of-session report
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub elapsed_secs: f32,
    pub phase: GamePhase,
    pub round: i64,
    pub quota: i64,
    pub spin_tokens: i64,
    pub collected_points: i64,
    pub rolling_points: i64,
    /// Last multiplier lit on the bulbs
    pub bulb: Multiplier,
    pub stats: SessionStats,
    pub router: RouterStats,
    /// Overlays alive on the combi and score surfaces
    pub live_overlays: usize,
}

struct PendingVideo {
    video: String,
    remaining: f32,
}

pub struct Cabinet {
    router: Router,
    game: Orchestrator<RecordingHost>,
    combi: CombiDisplay<RecordingHost>,
    score: ScoreDisplay<RecordingHost>,
    machine: MachineDisplay<RecordingHost>,
    panel: PhysicalDisplay<RecordingHost>,
    shooter: ShooterDisplay<RecordingHost>,
    bulbs: ChannelClient,
    bulb: Multiplier,
    videos: Vec<PendingVideo>,
    frames: u64,
    elapsed: f32,
}

impl Cabinet {
    pub fn new(config: CabinetConfig, seed: u64) -> GameResult<Self> {
        let router = Router::new();
        let combi = CombiDisplay::new(router.register(ChannelId::Combi), RecordingHost::new(), &config);
        let score = ScoreDisplay::new(router.register(ChannelId::Score), RecordingHost::new());
        let machine = MachineDisplay::new(router.register(ChannelId::Machine), RecordingHost::new());
        let panel = PhysicalDisplay::new(
            router.register(ChannelId::PhysicalDebug),
            RecordingHost::new(),
        );
        let shooter = ShooterDisplay::new(
            router.register(ChannelId::Shooter),
            RecordingHost::new(),
            &config,
        );
        let bulbs = router.register(ChannelId::Bulbs);
        let game = Orchestrator::new(&router, RecordingHost::new(), config, seed)?;

        log::info!(
            "[Cabinet] Ready: {} channels, seed {seed}",
            router.channels().len()
        );

        Ok(Self {
            router,
            game,
            combi,
            score,
            machine,
            panel,
            shooter,
            bulbs,
            bulb: Multiplier::X1,
            videos: Vec::new(),
            frames: 0,
            elapsed: 0.0,
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn game(&self) -> &Orchestrator<RecordingHost> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Orchestrator<RecordingHost> {
        &mut self.game
    }

    pub fn combi(&self) -> &CombiDisplay<RecordingHost> {
        &self.combi
    }

    pub fn score(&self) -> &ScoreDisplay<RecordingHost> {
        &self.score
    }

    pub fn machine(&self) -> &MachineDisplay<RecordingHost> {
        &self.machine
    }

    pub fn panel(&self) -> &PhysicalDisplay<RecordingHost> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut PhysicalDisplay<RecordingHost> {
        &mut self.panel
    }

    pub fn shooter(&self) -> &ShooterDisplay<RecordingHost> {
        &self.shooter
    }

    pub fn state(&self) -> &GameState {
        self.game.state()
    }

    pub fn bulb(&self) -> Multiplier {
        self.bulb
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Begin the session; without `skip_intro` the first button starts it
    pub fn start(&mut self, skip_intro: bool) {
        if skip_intro {
            self.game.start_skip_intro();
        } else {
            log::info!("[Cabinet] Waiting for a button to start");
        }
    }

    /// Feed one physical input through the debug panel
    pub fn apply(&mut self, action: PlayerAction) {
        log::debug!("[Cabinet] {action:?}");
        match action {
            PlayerAction::Button(index) => self.panel.press_button(index),
            PlayerAction::Lever => self.panel.pull_lever(),
            PlayerAction::Collect => self.panel.press_collect(),
        }
    }

    /// One frame: orchestrator first, then every display in channel order
    pub fn step(&mut self, dt: f32) {
        self.game.pump(dt);
        self.combi.pump(dt);
        self.score.pump(dt);
        self.machine.pump(dt);
        self.panel.pump(dt);
        self.shooter.pump(dt);

        for envelope in self.bulbs.drain() {
            if let Event::Bulb(multiplier) = envelope.event {
                log::debug!("[Bulbs] {multiplier}");
                self.bulb = multiplier;
            }
        }

        self.track_videos(dt);

        self.frames += 1;
        self.elapsed += dt;
    }

    fn track_videos(&mut self, dt: f32) {
        for (video, rate) in self.combi.host_mut().take_started_videos() {
            let rate = if rate > 0.0 { rate } else { 1.0 };
            self.videos.push(PendingVideo {
                video,
                remaining: VIDEO_SECS / rate,
            });
        }

        let mut ended = Vec::new();
        self.videos.retain_mut(|pending| {
            pending.remaining -= dt;
            if pending.remaining <= 0.0 {
                ended.push(std::mem::take(&mut pending.video));
                false
            } else {
                true
            }
        });
        for video in ended {
            self.combi.on_video_ended(&video);
        }
    }

    /// Run `seconds` at `fps`, letting `player` act before each frame
    ///
    /// Returns the number of frames stepped.
    pub fn run(&mut self, seconds: f32, fps: u32, mut player: Option<&mut ScriptedPlayer>) -> u64 {
        if fps == 0 {
            return 0;
        }
        let dt = 1.0 / fps as f32;
        let frames = (seconds.max(0.0) * fps as f32).round() as u64;

        for _ in 0..frames {
            if let Some(player) = player.as_deref_mut() {
                if let Some(action) = player.tick(dt, self.game.state()) {
                    self.apply(action);
                }
            }
            self.step(dt);
        }

        log::info!(
            "[Cabinet] Ran {frames} frames, phase {:?}, round {}",
            self.game.state().phase,
            self.game.state().round
        );
        frames
    }

    pub fn summary(&self) -> SessionSummary {
        let state = self.game.state();
        SessionSummary {
            frames: self.frames,
            elapsed_secs: self.elapsed,
            phase: state.phase,
            round: state.round,
            quota: state.quota,
            spin_tokens: state.spin_tokens,
            collected_points: state.collected_points,
            rolling_points: state.rolling_points,
            bulb: self.bulb,
            stats: self.game.stats().clone(),
            router: self.router.stats(),
            live_overlays: self.combi.host().live_overlays() + self.score.host().live_overlays(),
        }
    }
}
