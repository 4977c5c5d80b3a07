//! Game orchestrator
//!
//! Owns the authoritative round / quota / token state. Player input
//! arrives on the machine channel, lifecycle events on the scene channel.
//! Every command method mutates the state and announces the change; the
//! displays are never touched directly.
//!
//! ```text
//! Intro ──skip-intro──► Playing ──quota──► Shooter ──end-shooter──► Playing
//!                          │
//!                          └──out of tokens──► SecondChance ──respawn──► Playing
//!                                                   └──► Lost
//! ```

use af_channel::{
    Amount, ButtonLights, ChannelClient, CombiUpdate, ColorArg, Envelope, Event, JackpotInfo,
    Message, Receiver, Router, TokenUpdate, Visibility, WheelSignal,
};
use af_core::{CabinetConfig, ChannelId, Multiplier, Paytable, Rgb, WHEEL_COUNT};
use af_display::{MACHINE_OUT_SECS, SceneHost};
use af_tween::Scheduler;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{GameError, GameResult};
use crate::outcome::{JACKPOT_COUNT, SpinOutcome, evaluate};
use crate::state::{GamePhase, GameState, SessionStats};

/// Channels showing the score texts
pub const SCORE_TEXTS: [ChannelId; 2] = [ChannelId::Score, ChannelId::PhysicalDebug];

pub const MESSAGE_AUDIO: &str = "message";
pub const SPIN_AUDIO: &str = "spin";
pub const FARKLE_AUDIO: &str = "farkle";
pub const JACKPOT_AUDIO: &str = "jackpot";

pub const SHOOTER_MESSAGE: &str = "Shooter time";
pub const SHOOTER_BRIEFING: &str =
    "USE YOUR BUTTONS. <BR> THEY'RE JUST TARGETS. <BR> 1 TARGET = 1 JETONS.";

/// Lose-final outer LED color
pub const LOSE_COLOR: Rgb = Rgb::new(1.0, 0.0, 0.0);

/// Deferred orchestrator work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCue {
    SkipIntro,
    ShooterBriefing,
    JackpotEnd,
    Respawn,
    /// Machine has slid out: start the screamer
    LoseFinal,
}

pub struct Orchestrator<H: SceneHost> {
    config: CabinetConfig,
    paytable: Paytable,
    /// Player input
    machine: ChannelClient,
    /// Lifecycle events; also the sender of everything we announce
    scene: ChannelClient,
    host: H,
    state: GameState,
    stats: SessionStats,
    scheduler: Scheduler<GameCue>,
    rng: ChaCha8Rng,
    last_outcome: Option<SpinOutcome>,
    intro_started: bool,
}

impl<H: SceneHost> Orchestrator<H> {
    /// Validate the config and register on the machine and scene channels
    pub fn new(router: &Router, host: H, config: CabinetConfig, seed: u64) -> GameResult<Self> {
        config.validate()?;
        Ok(Self {
            paytable: Paytable::build(&config),
            machine: router.register(ChannelId::Machine),
            scene: router.register(ChannelId::Scene),
            config,
            host,
            state: GameState::default(),
            stats: SessionStats::default(),
            scheduler: Scheduler::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            last_outcome: None,
            intro_started: false,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &CabinetConfig {
        &self.config
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last_outcome.as_ref()
    }

    /// Nothing scheduled
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Reseed the wheel RNG
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    fn announce(&self, receiver: impl Into<Receiver>, event: Event) -> usize {
        self.scene.send(receiver, event)
    }

    // ═════════════════════════════════════════════════════════════════════════
    // STATE SETTERS
    // ═════════════════════════════════════════════════════════════════════════

    pub fn set_round(&mut self, round: i64) -> usize {
        self.state.round = round;
        self.announce(SCORE_TEXTS, Event::UpdateRounds(Amount { value: round }))
    }

    pub fn set_quota(&mut self, quota: i64) -> usize {
        self.state.quota = quota;
        self.announce(SCORE_TEXTS, Event::UpdateQuota(Amount { value: quota }))
    }

    pub fn set_spin_tokens(&mut self, tokens: i64) -> usize {
        self.state.spin_tokens = tokens;
        self.announce(SCORE_TEXTS, Event::UpdateSpinTokens(TokenUpdate::Set(tokens)))
    }

    /// Announced as "+N" so the texts count up
    pub fn add_spin_tokens(&mut self, tokens: i64) -> usize {
        self.state.spin_tokens += tokens;
        self.announce(SCORE_TEXTS, Event::UpdateSpinTokens(TokenUpdate::Add(tokens)))
    }

    pub fn set_multiplier(&mut self, multiplier: Multiplier) -> usize {
        self.state.multiplier = multiplier;
        self.announce(ChannelId::Bulbs, Event::Bulb(multiplier))
    }

    pub fn set_collected_points(&mut self, points: i64) -> usize {
        self.state.collected_points = points;
        self.announce(
            SCORE_TEXTS,
            Event::UpdateCollectedPoints(Amount { value: points }),
        )
    }

    pub fn set_rolling_points(&mut self, points: i64) -> usize {
        self.state.rolling_points = points;
        self.announce(SCORE_TEXTS, Event::UpdateRollingPoints(Amount { value: points }))
    }

    /// Button lights follow the lever: only usable while it is
    pub fn set_lever_locked(&mut self, locked: bool) -> usize {
        self.state.lever_locked = locked;
        log::debug!("[Game] Lever locked: {locked}");
        self.announce(
            ChannelId::PhysicalDebug,
            Event::ButtonLightsEnabled(ButtonLights::all(!locked)),
        )
    }

    pub fn set_collect_locked(&mut self, locked: bool) -> usize {
        self.state.collect_locked = locked;
        log::debug!("[Game] Collect locked: {locked}");
        0
    }

    /// `show-message` plus the message sound
    pub fn show_message(&mut self, receiver: impl Into<Receiver>, message: Message) -> usize {
        self.host.play_audio(MESSAGE_AUDIO);
        self.announce(receiver, Event::ShowMessage(message))
    }

    // ═════════════════════════════════════════════════════════════════════════
    // EVENT LOOP
    // ═════════════════════════════════════════════════════════════════════════

    /// Handle queued input and lifecycle events, then run due cues
    ///
    /// Returns the number of events handled.
    pub fn pump(&mut self, dt: f32) -> usize {
        let input: Vec<Envelope> = self.machine.drain();
        let lifecycle: Vec<Envelope> = self.scene.drain();
        let handled = input.len() + lifecycle.len();

        for envelope in input {
            self.handle_input(&envelope.event);
        }
        for envelope in lifecycle {
            self.handle_lifecycle(&envelope.event);
        }

        for cue in self.scheduler.advance(dt) {
            self.run_cue(cue);
        }
        handled
    }

    /// Player input from the machine channel
    pub fn handle_input(&mut self, event: &Event) {
        match event {
            Event::Button(press) => self.press_button(press.index),
            Event::Lever => {
                if let Err(e) = self.pull_lever() {
                    log::debug!("[Game] Lever ignored: {e}");
                }
            }
            Event::ButtonCollect => self.collect(),
            // LED commands for the machine display share the channel
            other => log::trace!("[Game] Ignoring machine event '{}'", other.name()),
        }
    }

    /// Lifecycle events from the scene channel
    pub fn handle_lifecycle(&mut self, event: &Event) {
        match event {
            Event::StartRound => log::info!("[Game] Start round {}", self.state.round),
            Event::CompleteRound(info) => {
                log::info!("[Game] Complete round requested ({})", info.index);
                self.complete_round();
            }
            Event::StartShooter => self.start_shooter(),
            Event::EndShooter => self.end_shooter(),
            Event::ShooterHit(press) => self.shooter_hit(press.index),
            other => log::trace!("[Game] Ignoring scene event '{}'", other.name()),
        }
    }

    fn run_cue(&mut self, cue: GameCue) {
        match cue {
            GameCue::SkipIntro => self.finish_intro(),
            GameCue::ShooterBriefing => {
                self.announce(ChannelId::Shooter, Event::StartShooter);
                self.show_message(
                    ChannelId::Combi,
                    Message::inner(SHOOTER_BRIEFING)
                        .with_modifier("BUTTONS")
                        .with_modifier("JETONS"),
                );
            }
            GameCue::JackpotEnd => {
                self.announce(ChannelId::Combi, Event::JackpotEnd);
            }
            GameCue::Respawn => self.respawn(),
            GameCue::LoseFinal => {
                self.scene.broadcast(Event::LoseFinal);
            }
        }
    }

    // ═════════════════════════════════════════════════════════════════════════
    // PLAYER INPUT
    // ═════════════════════════════════════════════════════════════════════════

    /// Hold or release a wheel for the next spin
    pub fn press_button(&mut self, index: usize) {
        if index >= WHEEL_COUNT {
            log::warn!("[Game] Button index {index} out of range");
            return;
        }
        if self.state.phase == GamePhase::Intro {
            if !self.intro_started {
                log::info!("[Game] Button {index} starts the session");
                self.start_skip_intro();
            }
            return;
        }
        if self.state.phase != GamePhase::Playing || self.state.lever_locked {
            return;
        }
        if self.last_outcome.is_none() {
            log::debug!("[Game] Nothing to hold before the first spin");
            return;
        }

        let held = !self.state.held[index];
        self.state.held[index] = held;
        self.announce(
            ChannelId::Machine,
            Event::WheelLock(WheelSignal {
                index,
                value: held,
                color: if held { None } else { Some(Rgb::WHITE) },
            }),
        );
    }

    /// Spend a token and spin every wheel that is not held
    pub fn pull_lever(&mut self) -> GameResult<SpinOutcome> {
        if self.state.phase != GamePhase::Playing {
            return Err(GameError::NotPlaying(self.state.phase));
        }
        if self.state.lever_locked {
            return Err(GameError::LeverLocked);
        }
        if self.state.spin_tokens <= 0 {
            return Err(GameError::NoTokens);
        }

        self.set_spin_tokens(self.state.spin_tokens - 1);
        let mut wheels = self.state.wheels;
        for (wheel, position) in wheels.iter_mut().enumerate() {
            if !self.state.held[wheel] {
                *position = self.rng.random_range(0..self.config.symbols.len());
            }
        }
        self.host.play_audio(SPIN_AUDIO);
        self.apply_spin(wheels)
    }

    /// Land the wheels on fixed positions (no token spent)
    pub fn spin_wheels(&mut self, wheels: [usize; WHEEL_COUNT]) -> GameResult<SpinOutcome> {
        self.apply_spin(wheels)
    }

    fn apply_spin(&mut self, wheels: [usize; WHEEL_COUNT]) -> GameResult<SpinOutcome> {
        let outcome = evaluate(&self.config, &self.paytable, &wheels)?;
        self.state.wheels = wheels;
        self.stats.spins += 1;

        // previous combination blinks stop with the new spin
        for wheel in 0..WHEEL_COUNT {
            if !self.state.held[wheel] {
                self.announce(
                    ChannelId::Machine,
                    Event::WheelBlink(WheelSignal {
                        index: wheel,
                        value: false,
                        color: None,
                    }),
                );
            }
        }

        self.announce(ChannelId::Combi, Event::ResetCombi);
        for entry in &outcome.counts {
            self.announce(
                ChannelId::Combi,
                Event::UpdateCombi(CombiUpdate {
                    symbol: entry.symbol.clone(),
                    value: entry.highlight(),
                }),
            );
        }

        if outcome.farkle {
            log::info!("[Game] Farkle, {} rolling points lost", self.state.rolling_points);
            self.stats.farkles += 1;
            self.set_rolling_points(0);
            self.set_multiplier(Multiplier::X1);
            self.announce(ChannelId::Combi, Event::Farkle);
            self.host.play_audio(FARKLE_AUDIO);
            self.release_holds();
        } else {
            if let Some(symbol) = &outcome.jackpot {
                log::info!("[Game] Jackpot {symbol}");
                self.stats.jackpots += 1;
                self.announce(
                    [ChannelId::Combi, ChannelId::Machine],
                    Event::Jackpot(JackpotInfo {
                        symbol: symbol.clone(),
                        count: JACKPOT_COUNT,
                    }),
                );
                self.host.play_audio(JACKPOT_AUDIO);
                self.scheduler
                    .delayed_call(self.config.timing.jackpot_secs, GameCue::JackpotEnd);
            }

            if outcome.bonus_tokens > 0 {
                self.stats.bonus_tokens += outcome.bonus_tokens as u64;
                self.add_spin_tokens(outcome.bonus_tokens as i64);
            }

            let gained = outcome.points * self.state.multiplier.factor();
            let rolling = (self.state.rolling_points + gained).max(0);
            self.set_rolling_points(rolling);

            for (wheel, &combined) in outcome.combination_wheels.iter().enumerate() {
                if combined && !self.state.held[wheel] {
                    self.announce(
                        ChannelId::Machine,
                        Event::WheelBlink(WheelSignal {
                            index: wheel,
                            value: true,
                            color: None,
                        }),
                    );
                }
            }
            if outcome.combination_wheels.iter().any(|c| *c) {
                let next = self.state.multiplier.next();
                self.set_multiplier(next);
            }
        }

        self.last_outcome = Some(outcome.clone());

        if self.state.spin_tokens <= 0
            && self.state.rolling_points == 0
            && !self.state.quota_reached()
        {
            self.lose();
        }
        Ok(outcome)
    }

    /// Release every held wheel and stop combination blinks
    fn release_holds(&mut self) {
        for wheel in 0..WHEEL_COUNT {
            let event = if self.state.held[wheel] {
                self.state.held[wheel] = false;
                Event::WheelLock(WheelSignal {
                    index: wheel,
                    value: false,
                    color: Some(Rgb::WHITE),
                })
            } else {
                Event::WheelBlink(WheelSignal {
                    index: wheel,
                    value: false,
                    color: None,
                })
            };
            self.announce(ChannelId::Machine, event);
        }
    }

    /// Bank the rolling points
    pub fn collect(&mut self) {
        if self.state.phase != GamePhase::Playing || self.state.collect_locked {
            log::debug!("[Game] Collect ignored");
            return;
        }

        let rolling = self.state.rolling_points;
        self.stats.total_collected += rolling;
        self.set_collected_points(self.state.collected_points + rolling);
        self.set_rolling_points(0);
        self.set_multiplier(Multiplier::X1);
        self.announce(ChannelId::Combi, Event::ResetCombi);
        self.release_holds();
        self.announce(ChannelId::PhysicalDebug, Event::ResetButtonsLight);
        self.last_outcome = None;

        if self.state.quota_reached() {
            self.complete_round();
        } else if self.state.spin_tokens <= 0 {
            self.lose();
        }
    }

    // ═════════════════════════════════════════════════════════════════════════
    // ROUNDS
    // ═════════════════════════════════════════════════════════════════════════

    /// Hide the intro, then show the boards with the starting state
    pub fn start_skip_intro(&mut self) {
        if self.intro_started {
            return;
        }
        self.intro_started = true;
        self.scheduler
            .delayed_call(self.config.timing.skip_intro_delay_secs, GameCue::SkipIntro);
    }

    fn finish_intro(&mut self) {
        self.announce(
            [ChannelId::Combi, ChannelId::Score],
            Event::Show(Visibility::IMMEDIATE),
        );
        self.set_spin_tokens(self.config.rules.starting_tokens as i64);
        self.set_quota(self.config.rules.starting_quota);
        self.set_round(1);
        self.set_lever_locked(false);
        self.state.phase = GamePhase::Playing;
        log::info!("[Game] Session started");
    }

    pub fn complete_round(&mut self) {
        log::info!("[Game] Round {} complete", self.state.round);
        self.stats.rounds_completed += 1;
        self.set_collected_points(0);
        self.set_round(self.state.round + 1);
        self.start_shooter();
    }

    pub fn start_shooter(&mut self) {
        log::info!("[Game] Shooter start");
        self.state.phase = GamePhase::Shooter;
        self.set_multiplier(Multiplier::X1);
        self.announce(ChannelId::Machine, Event::MachineOut);
        self.set_lever_locked(true);
        self.set_collect_locked(true);
        self.show_message(
            ChannelId::Score,
            Message::inner(SHOOTER_MESSAGE).with_modifier("SHOOT"),
        );
        self.scheduler
            .delayed_call(self.config.timing.message_delay_secs, GameCue::ShooterBriefing);
    }

    pub fn shooter_hit(&mut self, index: usize) {
        if self.state.phase != GamePhase::Shooter {
            log::warn!("[Game] Shooter hit {index} outside the shooter round");
            return;
        }
        self.stats.shooter_hits += 1;
        self.add_spin_tokens(self.config.rules.tokens_per_hit as i64);
    }

    pub fn end_shooter(&mut self) {
        if self.state.phase != GamePhase::Shooter {
            log::warn!("[Game] End shooter outside the shooter round");
            return;
        }
        log::info!("[Game] Shooter end, {} tokens", self.state.spin_tokens);
        self.state.phase = GamePhase::Playing;
        self.set_quota(self.state.quota + self.config.rules.quota_step);
        self.set_lever_locked(false);
        self.set_collect_locked(false);
        self.announce(ChannelId::Machine, Event::MachineIn);
        self.announce([ChannelId::Combi, ChannelId::Score], Event::HideMessage);

        if self.state.spin_tokens <= 0 {
            self.lose();
        }
    }

    // ═════════════════════════════════════════════════════════════════════════
    // LOSING
    // ═════════════════════════════════════════════════════════════════════════

    pub fn lose(&mut self) {
        log::info!("[Game] Lose");
        self.stats.losses += 1;
        if self.config.rules.second_chance && !self.state.second_chance_used {
            self.state.second_chance_used = true;
            self.state.phase = GamePhase::SecondChance;
            self.announce(ChannelId::Machine, Event::MachineOut);
            self.set_lever_locked(true);
            self.scheduler
                .delayed_call(self.config.timing.respawn_delay_secs, GameCue::Respawn);
        } else {
            self.lose_final();
        }
    }

    pub fn respawn(&mut self) {
        log::info!("[Game] Respawn");
        self.state.phase = GamePhase::Playing;
        self.set_quota(self.state.quota + self.config.rules.quota_step);
        self.set_spin_tokens(self.config.rules.respawn_tokens as i64);
        self.set_lever_locked(false);
        self.announce(ChannelId::Machine, Event::MachineIn);
    }

    pub fn lose_final(&mut self) {
        log::info!("[Game] Lose final");
        self.state.phase = GamePhase::Lost;
        self.set_lever_locked(true);
        self.set_collect_locked(true);
        self.announce(ChannelId::Machine, Event::LedsOff);
        self.announce(
            ChannelId::Machine,
            Event::OuterLedsColor(ColorArg { color: LOSE_COLOR }),
        );
        self.announce(ChannelId::Machine, Event::MachineOut);
        self.scheduler.delayed_call(MACHINE_OUT_SECS, GameCue::LoseFinal);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
