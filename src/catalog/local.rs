use std::path::Path;

use chrono::{DateTime, Utc};
use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Album, Artist, Playlist, PlaylistItem, PlaylistTracks, Track};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Build a track from a file on disk. Tags are optional; the file stem is
/// used as the name when there is no title tag.
fn read_track(path: &Path) -> Track {
    let mut name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artists = Vec::new();
    let mut album = Album::default();
    let mut duration_ms = 0;

    if let Ok(tagged) = lofty::read_from_path(path) {
        duration_ms = tagged.properties().duration().as_millis() as u64;

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(title) = non_blank(tag.title()) {
                name = title;
            }
            if let Some(artist) = non_blank(tag.artist()) {
                artists.push(Artist { name: artist });
            }
            if let Some(album_name) = non_blank(tag.album()) {
                album.name = album_name;
            }
        }
    }

    let location = path.display().to_string();
    Track {
        id: format!("local:{location}"),
        name,
        artists,
        album,
        duration_ms,
        preview_url: Some(location),
    }
}

fn sort_key(track: &Track) -> String {
    let artists = track.artist_names();
    if artists.is_empty() {
        track.name.to_lowercase()
    } else {
        format!("{} - {}", artists, track.name).to_lowercase()
    }
}

/// Scan `dir` for audio files and present them as a playlist named after
/// the directory. Files are ordered by "artist - title", case-insensitive.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Playlist {
    let mut entries: Vec<(Option<DateTime<Utc>>, Track)> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            let added_at = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from);
            entries.push((added_at, read_track(path)));
        }
    }

    entries.sort_by_cached_key(|(_, t)| sort_key(t));
    tracing::debug!(dir = %dir.display(), count = entries.len(), "scanned local playlist");

    let name = dir
        .file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| dir.display().to_string());

    Playlist {
        id: dir.display().to_string(),
        name,
        owner: None,
        images: Vec::new(),
        tracks: PlaylistTracks {
            items: entries
                .into_iter()
                .map(|(added_at, track)| PlaylistItem {
                    added_at,
                    track: Some(track),
                })
                .collect(),
            next: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(playlist: &Playlist) -> Vec<String> {
        playlist.entries().map(|(_, t)| t.name.clone()).collect()
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_builds_playable_tracks_sorted_case_insensitive() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let playlist = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(names(&playlist), vec!["A", "b"]);

        let (item, first) = playlist.entries().next().unwrap();
        assert!(first.is_playable());
        assert!(first.id.starts_with("local:"));
        assert!(first.preview_url.as_deref().unwrap().ends_with("A.ogg"));
        assert!(item.added_at.is_some());
        assert!(playlist.owner_name().is_none());
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        assert_eq!(names(&scan(dir.path(), &settings)), vec!["visible"]);
    }

    #[test]
    fn scan_respects_recursive_false_and_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        let flat = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        assert_eq!(names(&scan(dir.path(), &flat)), vec!["root"]);

        // WalkDir depth counts root as 0, so depth 2 reaches d1/* but not d1/d2/*.
        let capped = LibrarySettings {
            max_depth: Some(2),
            ..LibrarySettings::default()
        };
        assert_eq!(names(&scan(dir.path(), &capped)), vec!["one", "root"]);
    }
}
