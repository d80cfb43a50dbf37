//! Application module: the playlist page model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the loaded playlist, the
//! table selection and page-level flags. Playback state itself lives in the
//! session.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
