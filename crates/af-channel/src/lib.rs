//! af-channel: Channel router for ArcadeForge
//!
//! Displays register under a `ChannelId` and exchange typed `Event`s.
//! Senders address one channel, an ordered set, or everyone.
//!
//! ```text
//! Orchestrator ──send──► Router ──► [combi inbox] ──► CombiDisplay
//!                                └─► [score inbox] ──► ScoreDisplay
//! ```
//!
//! `send_wire` accepts the JSON wire shape and validates the payload
//! against the event catalog before anything is delivered.

mod error;
mod event;
mod router;
mod wire;

pub use error::*;
pub use event::*;
pub use router::*;
pub use wire::*;
