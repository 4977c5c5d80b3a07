//! Game errors

use af_core::CoreError;
use thiserror::Error;

use crate::state::GamePhase;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] CoreError),

    #[error("Wheel {wheel} shows symbol {symbol}, only {available} symbols configured")]
    UnknownSymbol {
        wheel: usize,
        symbol: usize,
        available: usize,
    },

    #[error("Not playing (phase {0:?})")]
    NotPlaying(GamePhase),

    #[error("Lever is locked")]
    LeverLocked,

    #[error("No spin tokens left")]
    NoTokens,
}

pub type GameResult<T> = Result<T, GameError>;
