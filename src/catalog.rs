//! Catalog module: playlist and track data plus the sources that provide it.
//!
//! Tracks and playlists use the shape of the Spotify Web API payloads so the
//! same types deserialize API responses and exported JSON files. A local
//! directory can also be scanned into a `Playlist`.

mod format;
mod local;
mod model;
mod source;

pub use format::*;
pub use local::scan;
pub use model::*;
pub use source::*;

#[cfg(test)]
mod tests;
