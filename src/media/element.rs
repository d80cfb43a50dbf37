use std::time::Duration;

use super::types::{MediaEvent, StartTicket};

/// Capabilities the playback surface needs from an audio primitive.
///
/// `start` may complete asynchronously; its outcome arrives later as
/// [`MediaEvent::StartSettled`] carrying the same ticket. Binding a new
/// source stops current audio and must keep any in-flight start for the old
/// source from producing sound.
pub trait MediaElement {
    /// Point the element at `source` (URL or file path); `None` unbinds.
    fn bind_source(&mut self, source: Option<&str>);
    /// Begin or resume playback. After the source ended, plays it again
    /// from the beginning.
    fn start(&mut self, ticket: StartTicket);
    fn stop(&mut self);
    /// Linear gain in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);
    fn position(&self) -> Duration;
    /// Unknown until the source has been loaded.
    fn duration(&self) -> Option<Duration>;
    /// Next pending event, if any. Never blocks.
    fn poll_event(&mut self) -> Option<MediaEvent>;
}
