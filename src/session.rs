//! Playback session store.
//!
//! `PlaybackSession` holds what is loaded and how it should play. It does no
//! I/O and knows nothing about the media element; it is mutated only by
//! dispatching [`Action`]s and records which aspects changed so the playback
//! surface can react with explicit transitions.

mod model;
mod nav;

pub use model::*;
pub use nav::Direction;
