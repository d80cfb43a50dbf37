use crate::mpris::MprisHandle;
use crate::session::{PlaybackSession, PlaybackStatus};

/// What MPRIS last saw; compared each loop so updates go out only on change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MprisSnapshot {
    track_id: Option<String>,
    index: Option<usize>,
    status: PlaybackStatus,
    shuffle: bool,
    repeat: bool,
    volume: u8,
}

impl MprisSnapshot {
    pub fn of(session: &PlaybackSession) -> Self {
        Self {
            track_id: session.current_track().map(|t| t.id.clone()),
            index: session.current_index(),
            status: session.status(),
            shuffle: session.shuffle(),
            repeat: session.repeat(),
            volume: session.volume(),
        }
    }
}

pub fn update_mpris(mpris: &MprisHandle, session: &PlaybackSession) {
    mpris.set_track_metadata(session.current_index(), session.current_track());
    mpris.set_playback(session.status());
    mpris.set_flags(session.shuffle(), session.repeat(), session.volume());
}

/// Push to MPRIS when anything it exposes changed since `last`.
pub fn sync_mpris(mpris: &MprisHandle, session: &PlaybackSession, last: &mut MprisSnapshot) {
    let now = MprisSnapshot::of(session);
    if now != *last {
        update_mpris(mpris, session);
        *last = now;
    }
}
