//! af-game: Game orchestrator for ArcadeForge
//!
//! The orchestrator is the only owner of round, quota and token state.
//! It reacts to player input and lifecycle events, evaluates spins and
//! tells the displays what changed through the router.

mod error;
mod orchestrator;
mod outcome;
mod state;

pub use error::*;
pub use orchestrator::*;
pub use outcome::*;
pub use state::*;
