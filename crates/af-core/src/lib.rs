//! af-core: Shared types for ArcadeForge
//!
//! Provides:
//! - Display channel identifiers
//! - RGB colors with `#rrggbb` serde
//! - Symbols, paytable tiers and multipliers
//! - Cabinet configuration and the paytable matrix

mod channel;
mod color;
mod config;
mod error;
mod paytable;
mod symbol;

pub use channel::*;
pub use color::*;
pub use config::*;
pub use error::*;
pub use paytable::*;
pub use symbol::*;

/// Number of wheels on the machine (and LED buttons on the panel)
pub const WHEEL_COUNT: usize = 5;
