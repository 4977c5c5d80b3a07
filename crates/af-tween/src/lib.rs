//! af-tween: Transition engine for ArcadeForge displays
//!
//! ## Model
//!
//! ```text
//! Controller ──start(Timeline)──► Animator ──advance(dt)──► PropertyStore
//!      ▲                             │
//!      └────── fired cues ◄──────────┘
//! ```
//!
//! Each display controller owns one `Animator` keyed by its own property
//! enum. Timelines are started, replaced and cancelled through tokens;
//! completions come back as cue values from `advance()` instead of
//! callbacks, so a controller never hands out references to itself.

mod animator;
mod ease;
mod store;
mod timeline;
mod value;

pub use animator::*;
pub use ease::*;
pub use store::*;
pub use timeline::*;
pub use value::*;
