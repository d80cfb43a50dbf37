//! Playback surface: keeps one media element in step with the session.
//!
//! The surface never decides *what* should play; it reads the session's
//! recorded changes and runs named transitions against its element, then
//! turns element events back into session actions.

mod machine;

pub use machine::*;
