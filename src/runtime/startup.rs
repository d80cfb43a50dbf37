use crate::config;
use crate::session::{Action, PlaybackSession};

/// Seed the session with the configured playback defaults.
pub fn apply_playback_defaults(session: &mut PlaybackSession, settings: &config::Settings) {
    session.dispatch(Action::SetVolume(settings.playback.volume));
    if settings.playback.shuffle != session.shuffle() {
        session.dispatch(Action::ToggleShuffle);
    }
    if settings.playback.repeat != session.repeat() {
        session.dispatch(Action::ToggleRepeat);
    }
}
