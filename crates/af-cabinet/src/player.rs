//! Scripted player
//!
//! Stands in for a person at the cabinet: pulls the lever, holds the odd
//! wheel, collects when the quota is in reach and shoots during the bonus
//! round. Seeded, so a session replays exactly.

use af_core::WHEEL_COUNT;
use af_game::{GamePhase, GameState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One physical input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Button(usize),
    Lever,
    Collect,
}

pub struct ScriptedPlayer {
    rng: ChaCha8Rng,
    /// Seconds between inputs
    think_secs: f32,
    cooldown: f32,
    actions: u64,
}

impl ScriptedPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            think_secs: 0.8,
            cooldown: 0.0,
            actions: 0,
        }
    }

    pub fn with_think_secs(mut self, secs: f32) -> Self {
        self.think_secs = secs.max(0.0);
        self
    }

    /// Inputs issued so far
    pub fn actions(&self) -> u64 {
        self.actions
    }

    /// Next input, if the player acts this frame
    pub fn tick(&mut self, dt: f32, state: &GameState) -> Option<PlayerAction> {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return None;
        }
        self.cooldown = self.think_secs;

        let action = self.decide(state)?;
        self.actions += 1;
        Some(action)
    }

    fn decide(&mut self, state: &GameState) -> Option<PlayerAction> {
        match state.phase {
            GamePhase::Intro | GamePhase::Shooter => {
                Some(PlayerAction::Button(self.rng.random_range(0..WHEEL_COUNT)))
            }
            GamePhase::Playing if !state.lever_locked => {
                let needed = state.quota - state.collected_points;
                let rolling = state.rolling_points;
                if rolling > 0
                    && (rolling >= needed || state.spin_tokens <= 0 || self.rng.random_bool(0.25))
                {
                    Some(PlayerAction::Collect)
                } else if state.spin_tokens > 0 {
                    if state.held_count() < 2 && self.rng.random_bool(0.2) {
                        Some(PlayerAction::Button(self.rng.random_range(0..WHEEL_COUNT)))
                    } else {
                        Some(PlayerAction::Lever)
                    }
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameState {
        GameState {
            phase: GamePhase::Playing,
            quota: 200,
            spin_tokens: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_waits_between_inputs() {
        let mut player = ScriptedPlayer::new(1).with_think_secs(0.5);
        let state = playing();
        assert!(player.tick(0.1, &state).is_some());
        assert!(player.tick(0.1, &state).is_none());
        assert!(player.tick(0.45, &state).is_some());
        assert_eq!(player.actions(), 2);
    }

    #[test]
    fn test_collects_when_quota_in_reach() {
        let mut player = ScriptedPlayer::new(3);
        let state = GameState {
            rolling_points: 250,
            ..playing()
        };
        assert_eq!(player.tick(1.0, &state), Some(PlayerAction::Collect));
    }

    #[test]
    fn test_idle_when_locked_or_lost() {
        let mut player = ScriptedPlayer::new(5);
        let locked = GameState {
            lever_locked: true,
            ..playing()
        };
        assert_eq!(player.tick(1.0, &locked), None);

        let lost = GameState {
            phase: GamePhase::Lost,
            ..playing()
        };
        assert_eq!(player.tick(1.0, &lost), None);
    }

    #[test]
    fn test_shoots_during_bonus_round() {
        let mut player = ScriptedPlayer::new(9);
        let state = GameState {
            phase: GamePhase::Shooter,
            ..playing()
        };
        assert!(matches!(player.tick(1.0, &state), Some(PlayerAction::Button(i)) if i < WHEEL_COUNT));
    }
}
