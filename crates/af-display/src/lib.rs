//! af-display: Display controllers for ArcadeForge
//!
//! One controller per channel. Each owns a `ChannelClient`, an `Animator`
//! keyed by its own properties, and a `SceneHost` for everything visual.
//!
//! ```text
//! Router ──► inbox ──pump(dt)──► handle_event ──► Animator ──► SceneHost
//!                                                    │
//!                                    cues ◄──────────┘ (snapshots, reverts)
//! ```
//!
//! | Controller      | Channel          | Overlay |
//! |-----------------|------------------|---------|
//! | CombiDisplay    | combi            | yes     |
//! | ScoreDisplay    | score            | yes     |
//! | MachineDisplay  | machine          | no      |
//! | PhysicalDisplay | physical-debug   | no      |
//! | ShooterDisplay  | shooter          | no      |

mod combi;
mod display;
mod host;
mod machine;
mod overlay;
mod physical;
mod score;
mod shooter;

pub use combi::*;
pub use display::*;
pub use host::*;
pub use machine::*;
pub use overlay::*;
pub use physical::*;
pub use score::*;
pub use shooter::*;
