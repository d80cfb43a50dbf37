use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Album {
    pub name: String,
    pub images: Vec<Image>,
}

/// A single playable song. Immutable once received from a catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Album,
    #[serde(default)]
    pub duration_ms: u64,
    /// Short preview clip (remote URL or local file path). The catalog may
    /// legitimately have none for a track.
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl Track {
    /// Artist names joined the way the track table shows them.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.album.images.first().map(|i| i.url.as_str())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// True when there is a non-empty audio source to bind.
    pub fn is_playable(&self) -> bool {
        self.preview_url
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    /// Removed or unavailable entries come back as `null`.
    #[serde(default)]
    pub track: Option<Track>,
}

/// One page of playlist items. `next` is the URL of the following page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlaylistTracks {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub tracks: PlaylistTracks,
}

impl Playlist {
    /// Items that actually carry a track, in play order.
    pub fn entries(&self) -> impl Iterator<Item = (&PlaylistItem, &Track)> {
        self.tracks
            .items
            .iter()
            .filter_map(|item| item.track.as_ref().map(|t| (item, t)))
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.entries().map(|(_, t)| t.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.entries().map(|(_, t)| t.duration_ms).sum()
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .and_then(|o| o.display_name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }
}
