//! Authoritative game state

use af_core::{Multiplier, WHEEL_COUNT};
use serde::{Deserialize, Serialize};

/// Where the session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    /// Waiting for the intro to finish
    #[default]
    Intro,
    /// Spinning and collecting
    Playing,
    /// Bonus shooter round
    Shooter,
    /// Lost once, waiting for the respawn
    SecondChance,
    /// Session over
    Lost,
}

/// Round, quota and token state
///
/// Only the orchestrator's command methods mutate this; every change is
/// announced to the displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub round: i64,
    pub quota: i64,
    pub spin_tokens: i64,
    pub multiplier: Multiplier,
    pub collected_points: i64,
    pub rolling_points: i64,
    pub lever_locked: bool,
    pub collect_locked: bool,
    /// Symbol index shown by each wheel
    pub wheels: [usize; WHEEL_COUNT],
    /// Wheels held by the player for the next spin
    pub held: [bool; WHEEL_COUNT],
    pub second_chance_used: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: GamePhase::Intro,
            round: 0,
            quota: 0,
            spin_tokens: 0,
            multiplier: Multiplier::X1,
            collected_points: 0,
            rolling_points: 0,
            lever_locked: false,
            collect_locked: false,
            wheels: [0; WHEEL_COUNT],
            held: [false; WHEEL_COUNT],
            second_chance_used: false,
        }
    }
}

impl GameState {
    /// Collected plus rolling points
    pub fn banked_total(&self) -> i64 {
        self.collected_points + self.rolling_points
    }

    pub fn quota_reached(&self) -> bool {
        self.collected_points >= self.quota
    }

    pub fn held_count(&self) -> usize {
        self.held.iter().filter(|h| **h).count()
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spins: u64,
    pub farkles: u64,
    pub jackpots: u64,
    pub bonus_tokens: u64,
    pub rounds_completed: u64,
    pub shooter_hits: u64,
    pub total_collected: i64,
    pub losses: u64,
}

impl SessionStats {
    /// Farkle rate in percent
    pub fn farkle_rate(&self) -> f64 {
        if self.spins > 0 {
            (self.farkles as f64 / self.spins as f64) * 100.0
        } else {
            0.0
        }
    }
}
