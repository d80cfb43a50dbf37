use super::*;
use crate::catalog::{Album, Artist, CatalogError, Playlist, PlaylistItem, PlaylistTracks, Track};
use crate::session::{Action, PlaybackSession};

fn t(id: &str) -> Track {
    Track {
        id: id.into(),
        name: id.to_uppercase(),
        artists: vec![Artist {
            name: "Artist".into(),
        }],
        album: Album::default(),
        duration_ms: 1_000,
        preview_url: Some(format!("https://p.example/{id}")),
    }
}

fn playlist(ids: &[&str]) -> Playlist {
    let mut items: Vec<PlaylistItem> = ids
        .iter()
        .map(|id| PlaylistItem {
            added_at: None,
            track: Some(t(id)),
        })
        .collect();
    // Removed entries show up as null tracks.
    items.insert(
        1.min(items.len()),
        PlaylistItem {
            added_at: None,
            track: None,
        },
    );
    Playlist {
        id: "p".into(),
        name: "Mix".into(),
        owner: None,
        images: Vec::new(),
        tracks: PlaylistTracks { items, next: None },
    }
}

fn loaded(ids: &[&str]) -> (App, PlaybackSession) {
    let mut app = App::new("test", true);
    let mut session = PlaybackSession::new();
    app.finish_loading(Ok(playlist(ids)), &mut session);
    (app, session)
}

#[test]
fn finish_loading_sets_rows_and_session_playlist() {
    let (app, session) = loaded(&["a", "b", "c"]);
    assert_eq!(app.load_state, LoadState::Ready);
    assert_eq!(app.rows.len(), 3);
    let ids: Vec<&str> = session.active_playlist().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn failed_load_keeps_session_untouched() {
    let mut app = App::new("test", true);
    let mut session = PlaybackSession::new();
    app.finish_loading(Err(CatalogError::MissingToken), &mut session);
    assert!(matches!(app.load_state, LoadState::Failed(_)));
    assert!(session.active_playlist().is_empty());
    assert!(!app.has_tracks());
}

#[test]
fn selection_wraps_and_jumps() {
    let (mut app, _) = loaded(&["a", "b", "c"]);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.last();
    assert_eq!(app.selected, 2);
    app.first();
    assert_eq!(app.selected, 0);
}

#[test]
fn selection_on_empty_table_stays_put() {
    let (mut app, _) = loaded(&[]);
    app.next();
    app.prev();
    app.last();
    assert_eq!(app.selected, 0);
    assert!(app.selected_track().is_none());
    assert!(app.like_selected_action().is_none());
}

#[test]
fn active_row_requires_current_and_playing() {
    let (app, mut session) = loaded(&["a", "b"]);
    session.dispatch(Action::SetCurrentTrack(t("b")));
    assert!(!app.row_is_active(1, &session));
    session.dispatch(Action::SetIsPlaying(true));
    assert!(app.row_is_active(1, &session));
    assert!(!app.row_is_active(0, &session));
    assert!(!app.row_is_active(9, &session));
}

#[test]
fn play_intent_on_current_row_toggles() {
    let (app, mut session) = loaded(&["a", "b"]);
    session.dispatch(Action::SetCurrentTrack(t("a")));
    session.dispatch(Action::SetIsPlaying(true));
    assert_eq!(
        app.play_row_actions(0, &session),
        vec![Action::SetIsPlaying(false)]
    );
}

#[test]
fn play_intent_on_other_row_selects_and_plays() {
    let (app, mut session) = loaded(&["a", "b"]);
    session.dispatch(Action::SetCurrentTrack(t("a")));
    assert_eq!(
        app.play_row_actions(1, &session),
        vec![Action::SetCurrentTrack(t("b")), Action::SetIsPlaying(true)]
    );
    assert!(app.play_row_actions(5, &session).is_empty());
}

#[test]
fn follow_moves_cursor_only_on_track_change() {
    let (mut app, mut session) = loaded(&["a", "b", "c"]);
    session.dispatch(Action::SetCurrentTrack(t("c")));
    assert!(app.follow(&session));
    assert_eq!(app.selected, 2);

    // User moves away; same current track does not pull the cursor back.
    app.first();
    assert!(!app.follow(&session));
    assert_eq!(app.selected, 0);

    session.dispatch(Action::SetCurrentTrack(t("b")));
    assert!(app.follow(&session));
    assert_eq!(app.selected, 1);
}

#[test]
fn follow_disabled_leaves_cursor() {
    let (mut app, mut session) = loaded(&["a", "b"]);
    app.toggle_follow_playback();
    session.dispatch(Action::SetCurrentTrack(t("b")));
    assert!(!app.follow(&session));
    assert_eq!(app.selected, 0);
}
