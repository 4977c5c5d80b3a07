//! ArcadeForge headless cabinet
//!
//! Runs the orchestrator and all five displays against recording hosts on
//! a fixed-step loop, optionally driven by a seeded scripted player.

mod cabinet;
mod player;

pub use cabinet::*;
pub use player::*;
