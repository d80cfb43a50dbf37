use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::Track;

use super::nav::{Direction, identity_order, shuffled_order, step};

/// The mutations the session accepts. Nothing else writes session state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetCurrentTrack(Track),
    SetIsPlaying(bool),
    ToggleShuffle,
    ToggleRepeat,
    /// Clamped to `0..=100`.
    SetVolume(i32),
    /// Percentage of the current track elapsed; ignored without a track.
    SetProgress(f64),
    SetPlaylist(Vec<Track>),
    ToggleLike(Track),
}

/// What the playback surface must react to after a batch of actions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub track: bool,
    pub playing: bool,
    pub volume: bool,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        !(self.track || self.playing || self.volume)
    }
}

/// Coarse status for status lines and MPRIS.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The single playback session of a running client.
#[derive(Debug)]
pub struct PlaybackSession {
    current_track: Option<Track>,
    is_playing: bool,
    shuffle: bool,
    repeat: bool,
    volume: u8,
    progress: f64,
    active_playlist: Vec<Track>,
    play_order: Vec<usize>,
    liked_tracks: HashSet<String>,
    changes: Changes,
    rng: StdRng,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

fn clamp_volume(volume: i32) -> u8 {
    volume.clamp(0, 100) as u8
}

fn clamp_progress(progress: f64) -> f64 {
    if progress.is_finite() {
        progress.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose shuffle order is drawn from `rng`.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            shuffle: false,
            repeat: false,
            volume: 100,
            progress: 0.0,
            active_playlist: Vec::new(),
            play_order: Vec::new(),
            liked_tracks: HashSet::new(),
            changes: Changes::default(),
            rng,
        }
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SetCurrentTrack(track) => {
                tracing::debug!(id = %track.id, name = %track.name, "current track");
                self.current_track = Some(track);
                self.progress = 0.0;
                self.changes.track = true;
            }
            Action::SetIsPlaying(playing) => {
                if self.is_playing != playing {
                    self.is_playing = playing;
                    self.changes.playing = true;
                }
            }
            Action::ToggleShuffle => {
                self.shuffle = !self.shuffle;
                self.rebuild_order();
            }
            Action::ToggleRepeat => {
                self.repeat = !self.repeat;
            }
            Action::SetVolume(volume) => {
                let volume = clamp_volume(volume);
                if self.volume != volume {
                    self.volume = volume;
                    self.changes.volume = true;
                }
            }
            Action::SetProgress(progress) => {
                if self.current_track.is_some() {
                    self.progress = clamp_progress(progress);
                }
            }
            Action::SetPlaylist(tracks) => {
                tracing::debug!(len = tracks.len(), "active playlist replaced");
                self.active_playlist = tracks;
                self.rebuild_order();
            }
            Action::ToggleLike(track) => {
                if !self.liked_tracks.remove(&track.id) {
                    self.liked_tracks.insert(track.id);
                }
            }
        }
    }

    /// Drain the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Changes {
        std::mem::take(&mut self.changes)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn progress(&self) -> f64 {
        if self.current_track.is_some() {
            self.progress
        } else {
            0.0
        }
    }

    pub fn active_playlist(&self) -> &[Track] {
        &self.active_playlist
    }

    /// Indices into `active_playlist` in the order navigation walks them.
    #[cfg(test)]
    pub fn play_order(&self) -> &[usize] {
        &self.play_order
    }

    #[cfg(test)]
    pub fn liked_tracks(&self) -> &HashSet<String> {
        &self.liked_tracks
    }

    pub fn is_liked(&self, track: &Track) -> bool {
        self.liked_tracks.contains(&track.id)
    }

    pub fn is_current(&self, track: &Track) -> bool {
        self.current_track
            .as_ref()
            .map(|c| c.id == track.id)
            .unwrap_or(false)
    }

    pub fn status(&self) -> PlaybackStatus {
        match (&self.current_track, self.is_playing) {
            (None, _) => PlaybackStatus::Stopped,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(_), false) => PlaybackStatus::Paused,
        }
    }

    /// Index of the current track in `active_playlist`, matched by id.
    pub fn current_index(&self) -> Option<usize> {
        let current = self.current_track.as_ref()?;
        self.active_playlist.iter().position(|t| t.id == current.id)
    }

    /// The track one step away from the current one in play order.
    ///
    /// Wraps at both ends. `None` only when the playlist is empty. A current
    /// track that is absent or not part of the playlist starts the walk at
    /// the first entry of the play order.
    pub fn neighbour(&self, direction: Direction) -> Option<&Track> {
        let pos = self
            .current_index()
            .and_then(|idx| self.play_order.iter().position(|&i| i == idx));
        let next = step(self.play_order.len(), pos, direction)?;
        self.active_playlist.get(self.play_order[next])
    }

    fn rebuild_order(&mut self) {
        let len = self.active_playlist.len();
        self.play_order = if self.shuffle {
            let first = self.current_index();
            shuffled_order(len, first, &mut self.rng)
        } else {
            identity_order(len)
        };
    }
}
