use super::*;
use crate::config::{ApiSettings, LibrarySettings};
use std::time::Duration;

const PLAYLIST_JSON: &str = r#"{
  "id": "37i9dQZF1DXcBWIGoYBM5M",
  "name": "Today's Top Hits",
  "owner": { "display_name": "Spotify" },
  "images": [{ "url": "https://i.scdn.co/image/cover", "height": 640, "width": 640 }],
  "tracks": {
    "items": [
      {
        "added_at": "2024-03-01T10:00:00Z",
        "track": {
          "id": "t1",
          "name": "First",
          "artists": [{ "name": "Alpha" }, { "name": "Beta" }],
          "album": { "name": "Debut", "images": [{ "url": "https://i.scdn.co/image/a" }] },
          "duration_ms": 200000,
          "preview_url": "https://p.scdn.co/mp3-preview/t1"
        }
      },
      { "added_at": "2024-03-02T10:00:00Z", "track": null },
      {
        "added_at": "2024-03-03T10:00:00Z",
        "track": {
          "id": "t2",
          "name": "Second",
          "artists": [{ "name": "Gamma" }],
          "album": { "name": "Later", "images": [] },
          "duration_ms": 59500,
          "preview_url": null,
          "popularity": 80
        }
      }
    ],
    "next": null,
    "total": 3
  }
}"#;

#[test]
fn playlist_json_deserializes_and_skips_null_tracks() {
    let playlist: Playlist = serde_json::from_str(PLAYLIST_JSON).unwrap();

    assert_eq!(playlist.name, "Today's Top Hits");
    assert_eq!(playlist.owner_name(), Some("Spotify"));
    assert_eq!(playlist.cover_url(), Some("https://i.scdn.co/image/cover"));
    assert_eq!(playlist.tracks.items.len(), 3);
    assert_eq!(playlist.len(), 2);
    assert_eq!(playlist.total_duration_ms(), 259_500);

    let tracks = playlist.tracks();
    assert_eq!(tracks[0].id, "t1");
    assert_eq!(tracks[0].artist_names(), "Alpha, Beta");
    assert_eq!(tracks[0].cover_url(), Some("https://i.scdn.co/image/a"));
    assert!(tracks[0].is_playable());
    assert_eq!(tracks[1].id, "t2");
    assert!(!tracks[1].is_playable());
    assert_eq!(tracks[1].cover_url(), None);
}

#[test]
fn blank_preview_url_is_not_playable() {
    let mut playlist: Playlist = serde_json::from_str(PLAYLIST_JSON).unwrap();
    let track = playlist.tracks.items[0].track.as_mut().unwrap();
    track.preview_url = Some("   ".into());
    assert!(!track.is_playable());
}

#[test]
fn json_file_source_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlist.json");
    std::fs::write(&path, PLAYLIST_JSON).unwrap();

    let playlist = JsonFile { path }.load().unwrap();
    assert_eq!(playlist.id, "37i9dQZF1DXcBWIGoYBM5M");
}

#[test]
fn json_file_source_reports_malformed_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"name\": ").unwrap();

    let err = JsonFile { path }.load().unwrap_err();
    assert!(matches!(err, CatalogError::Json(_)));
}

#[test]
fn local_dir_source_rejects_missing_directory() {
    let source = LocalDir {
        path: "/definitely/not/here".into(),
        settings: LibrarySettings::default(),
    };
    assert!(matches!(source.load(), Err(CatalogError::Io(_))));
}

#[test]
fn playlist_ref_parses_spotify_forms() {
    let id = "37i9dQZF1DXcBWIGoYBM5M";
    assert_eq!(
        PlaylistRef::parse(&format!("spotify:playlist:{id}")).unwrap(),
        PlaylistRef::Spotify(id.into())
    );
    assert_eq!(
        PlaylistRef::parse(&format!("https://open.spotify.com/playlist/{id}?si=abc")).unwrap(),
        PlaylistRef::Spotify(id.into())
    );
    assert_eq!(
        PlaylistRef::parse(&format!("https://open.spotify.com/intl-de/playlist/{id}")).unwrap(),
        PlaylistRef::Spotify(id.into())
    );
    assert_eq!(PlaylistRef::parse(id).unwrap(), PlaylistRef::Spotify(id.into()));
}

#[test]
fn playlist_ref_detects_local_paths_and_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("export.JSON");
    std::fs::write(&json, "{}").unwrap();

    assert_eq!(
        PlaylistRef::parse(dir.path().to_str().unwrap()).unwrap(),
        PlaylistRef::LocalDir(dir.path().to_path_buf())
    );
    assert_eq!(
        PlaylistRef::parse(json.to_str().unwrap()).unwrap(),
        PlaylistRef::JsonFile(json.clone())
    );
    assert!(matches!(
        PlaylistRef::parse("spotify:album:37i9dQZF1DXcBWIGoYBM5M"),
        Err(CatalogError::InvalidReference(_))
    ));
    assert!(matches!(
        PlaylistRef::parse("https://example.com/playlist/37i9dQZF1DXcBWIGoYBM5M"),
        Err(CatalogError::InvalidReference(_))
    ));
}

#[test]
fn spotify_api_requires_token_and_builds_market_url() {
    let mut api = ApiSettings::default();
    api.access_token = Some("  ".into());
    assert!(matches!(
        SpotifyApi::new("abc", &api, Duration::from_secs(1)),
        Err(CatalogError::MissingToken)
    ));

    api.access_token = Some("token".into());
    api.base_url = "https://api.example.test/v1/".into();
    api.market = Some("DE".into());
    let client = SpotifyApi::new("abc", &api, Duration::from_secs(1)).unwrap();
    assert_eq!(
        client.playlist_url(),
        "https://api.example.test/v1/playlists/abc?market=DE"
    );
}

#[test]
fn format_duration_rounds_on_the_total() {
    assert_eq!(format_duration(0), "0:00");
    assert_eq!(format_duration(59_500), "1:00");
    assert_eq!(format_duration(213_573), "3:34");
    assert_eq!(format_duration(3_600_000), "60:00");
}

#[test]
fn format_helpers_for_panel_and_table() {
    assert_eq!(format_mmss(Duration::from_millis(65_900)), "01:05");

    let playlist: Playlist = serde_json::from_str(PLAYLIST_JSON).unwrap();
    let added = playlist.tracks.items[0].added_at.as_ref();
    assert_eq!(format_added_at(added), "Mar 1, 2024");
    assert_eq!(format_added_at(None), "");
}
