//! Application model types: `App`, `LoadState` and `Row`.

use chrono::{DateTime, Utc};

use crate::catalog::{CatalogError, Playlist, Track};
use crate::session::{Action, PlaybackSession};

/// Where the playlist fetch stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// One line of the track table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub track: Track,
    pub added_at: Option<DateTime<Utc>>,
}

/// The main application model.
pub struct App {
    pub source_label: String,
    pub load_state: LoadState,
    pub playlist: Option<Playlist>,
    pub rows: Vec<Row>,
    pub selected: usize,

    /// Cursor follows the current track when it changes on its own.
    pub follow_playback: bool,
    followed_id: Option<String>,

    pub details_window: bool,
}

impl App {
    /// Create an `App` waiting for the playlist behind `source_label`.
    pub fn new(source_label: impl Into<String>, follow_playback: bool) -> Self {
        Self {
            source_label: source_label.into(),
            load_state: LoadState::Loading,
            playlist: None,
            rows: Vec::new(),
            selected: 0,
            follow_playback,
            followed_id: None,
            details_window: false,
        }
    }

    /// Take the fetch result. A loaded playlist becomes the session's
    /// active playlist; a failure leaves the session untouched.
    pub fn finish_loading(
        &mut self,
        result: Result<Playlist, CatalogError>,
        session: &mut PlaybackSession,
    ) {
        match result {
            Ok(playlist) => {
                self.rows = playlist
                    .entries()
                    .map(|(item, track)| Row {
                        track: track.clone(),
                        added_at: item.added_at,
                    })
                    .collect();
                tracing::info!(name = %playlist.name, tracks = self.rows.len(), "playlist loaded");
                session.dispatch(Action::SetPlaylist(playlist.tracks()));
                self.playlist = Some(playlist);
                self.selected = 0;
                self.load_state = LoadState::Ready;
            }
            Err(e) => {
                tracing::error!(error = %e, source = %self.source_label, "playlist load failed");
                self.load_state = LoadState::Failed(e.to_string());
            }
        }
    }

    pub fn has_tracks(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.rows.get(self.selected).map(|r| &r.track)
    }

    pub fn toggle_details_window(&mut self) {
        self.details_window = !self.details_window;
    }

    pub fn toggle_follow_playback(&mut self) {
        self.follow_playback = !self.follow_playback;
    }

    /// Move selection down one row, wrapping to the top.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.rows.len();
        }
    }

    /// Move selection up one row, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            let len = self.rows.len();
            self.selected = (self.selected % len + len - 1) % len;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    /// A row is highlighted as active only while its track is playing.
    pub fn row_is_active(&self, idx: usize, session: &PlaybackSession) -> bool {
        session.is_playing()
            && self
                .rows
                .get(idx)
                .map(|r| session.is_current(&r.track))
                .unwrap_or(false)
    }

    /// Actions for the play intent on row `idx`: the current row toggles
    /// play/pause, any other row becomes current and plays.
    pub fn play_row_actions(&self, idx: usize, session: &PlaybackSession) -> Vec<Action> {
        let Some(row) = self.rows.get(idx) else {
            return Vec::new();
        };
        if session.is_current(&row.track) {
            vec![Action::SetIsPlaying(!session.is_playing())]
        } else {
            vec![
                Action::SetCurrentTrack(row.track.clone()),
                Action::SetIsPlaying(true),
            ]
        }
    }

    /// Like/unlike the selected row.
    pub fn like_selected_action(&self) -> Option<Action> {
        self.selected_track().cloned().map(Action::ToggleLike)
    }

    /// Move the cursor onto the current track when it changed since the last
    /// call. Returns true when the cursor moved.
    pub fn follow(&mut self, session: &PlaybackSession) -> bool {
        let current_id = session.current_track().map(|t| t.id.clone());
        if current_id == self.followed_id {
            return false;
        }
        self.followed_id = current_id;
        if !self.follow_playback {
            return false;
        }
        let Some(id) = self.followed_id.as_deref() else {
            return false;
        };
        match self.rows.iter().position(|r| r.track.id == id) {
            Some(idx) if idx != self.selected => {
                self.selected = idx;
                true
            }
            _ => false,
        }
    }
}
