//! Media element: the audio primitive the playback surface drives.
//!
//! [`MediaElement`] is the capability contract (bind, start, stop, volume,
//! position, duration, events). [`RodioElement`] implements it with a
//! worker thread that downloads or reads a clip and plays it through rodio.

mod element;
mod player;
mod sink;
mod thread;
mod types;

pub use element::MediaElement;
pub use player::RodioElement;
pub use types::*;

#[cfg(test)]
mod tests;
