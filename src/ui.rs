//! UI rendering helpers for the terminal user interface.
//!
//! The page is a playlist header, the track table and a control panel with
//! the now-playing track, progress and transport flags, rendered with
//! `ratatui`.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Padding, Paragraph, Row, Table, TableState, Wrap},
};

use crate::app::{App, LoadState};
use crate::catalog::{Playlist, Track, format_added_at, format_duration, format_mmss};
use crate::config::{TimeField, TrackDisplayField, UiSettings};
use crate::media::MediaElement;
use crate::session::PlaybackSession;
use crate::surface::{Surface, SurfaceState};

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Render the controls help text.
fn controls_text() -> String {
    [
        ("j/k", "up/down"),
        ("gg/G", "top/bottom"),
        ("enter", "play row"),
        ("space/p", "play/pause"),
        ("h/l", "prev/next"),
        ("s", "shuffle"),
        ("r", "repeat"),
        ("+/-", "volume"),
        ("f", "like"),
        ("F", "follow"),
        ("K", "details"),
        ("q", "quit"),
    ]
    .iter()
    .map(|(k, v)| format!("[{k}] {v}"))
    .collect::<Vec<String>>()
    .join(" | ")
}

/// "by owner • 12 songs, 41:07" for the playlist header.
fn header_summary(playlist: &Playlist) -> String {
    let count = playlist.len();
    let songs = if count == 1 { "song" } else { "songs" };
    let total = format_duration(playlist.total_duration_ms());
    match playlist.owner_name() {
        Some(owner) => format!("by {owner} • {count} {songs}, {total}"),
        None => format!("{count} {songs}, {total}"),
    }
}

/// Build the "now playing" track text according to `ui` settings.
fn now_playing_track_text(track: &Track, ui: &UiSettings) -> String {
    let parts: Vec<String> = ui
        .now_playing_track_fields
        .iter()
        .filter_map(|f| {
            let text = match f {
                TrackDisplayField::Name => track.name.clone(),
                TrackDisplayField::Artists => track.artist_names(),
                TrackDisplayField::Album => track.album.name.clone(),
            };
            Some(text).filter(|t| !t.trim().is_empty())
        })
        .collect();

    if parts.is_empty() {
        track.name.clone()
    } else {
        parts.join(&ui.now_playing_track_separator)
    }
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(elapsed: Duration, total: Option<Duration>, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }
    parts.join(&ui.now_playing_time_separator)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App, ui: &UiSettings) {
    let lines = match app.playlist.as_ref() {
        Some(p) => {
            let cover = if p.cover_url().is_some() { "▣" } else { "♫" };
            vec![
                Line::from(vec![
                    Span::raw(format!("{cover}  ")),
                    Span::styled(p.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(header_summary(p)).dim(),
            ]
        }
        None => vec![Line::from(app.source_label.clone()), Line::from("")],
    };

    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(ui.header_text.as_str())
            .title_alignment(Alignment::Center)
            .padding(LEFT_PAD),
    );
    frame.render_widget(header, area);
}

fn draw_tracks(frame: &mut Frame, area: Rect, app: &App, session: &PlaybackSession) {
    let block = Block::default().borders(Borders::ALL).title(" tracks ");

    let message = match &app.load_state {
        LoadState::Loading => Some(format!("Loading {} …", app.source_label)),
        LoadState::Failed(e) => Some(format!("Could not load playlist: {e}")),
        LoadState::Ready if !app.has_tracks() => Some("No tracks found.".to_string()),
        LoadState::Ready => None,
    };
    if let Some(message) = message {
        let p = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(p, area);
        return;
    }

    let header = Row::new(["#", "Title", "Album", "Date added", "", "⏱"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let active = app.row_is_active(i, session);
            let marker = if active {
                "♪".to_string()
            } else {
                (i + 1).to_string()
            };
            let title = Line::from(vec![
                Span::raw(row.track.name.clone()),
                Span::raw("  "),
                Span::styled(row.track.artist_names(), Style::default().add_modifier(Modifier::DIM)),
            ]);
            let liked = if session.is_liked(&row.track) { "♥" } else { "" };
            let mut style = Style::default();
            if active {
                style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
            } else if !row.track.is_playable() {
                style = style.add_modifier(Modifier::DIM);
            }
            Row::new(vec![
                Cell::from(marker),
                Cell::from(title),
                Cell::from(row.track.album.name.clone()),
                Cell::from(format_added_at(row.added_at.as_ref())),
                Cell::from(liked),
                Cell::from(format_duration(row.track.duration_ms)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(45),
        Constraint::Percentage(30),
        Constraint::Length(13),
        Constraint::Length(2),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_control_panel<M: MediaElement>(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    session: &PlaybackSession,
    surface: &Surface<M>,
    ui: &UiSettings,
) {
    let block = Block::bordered().padding(LEFT_PAD).title(" now playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let track_line = match session.current_track() {
        Some(track) => {
            let state = if session.is_playing() { "▶" } else { "⏸" };
            let liked = if session.is_liked(track) { " ♥" } else { "" };
            Line::from(vec![
                Span::raw(format!("{state} ")),
                Span::styled(
                    now_playing_track_text(track, ui),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(liked),
            ])
        }
        None => Line::from("Nothing playing").dim(),
    };
    frame.render_widget(Paragraph::new(track_line), rows[0]);

    let (elapsed, total) = surface.timing();
    let label = if surface.state() == SurfaceState::Unplayable {
        "preview unavailable".to_string()
    } else {
        now_playing_time_text(elapsed, total, ui)
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((session.progress() / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, rows[1]);

    let mut status = vec![Span::raw(format!(
        "Shuffle: {} • Repeat: {} • Volume: {}% • Cursor: {}",
        on_off(session.shuffle()),
        on_off(session.repeat()),
        session.volume(),
        if app.follow_playback { "Follow" } else { "Free-roam" },
    ))];
    if let Some(notice) = surface.notice() {
        status.push(Span::raw(" • "));
        status.push(Span::styled(notice.to_string(), Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(Line::from(status)), rows[2]);
}

fn draw_details(frame: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect_sized(72, 10, area);
    frame.render_widget(Clear, popup_area);

    let text = match app.rows.get(app.selected) {
        Some(row) => {
            let t = &row.track;
            format!(
                "Title: {}\nArtists: {}\nAlbum: {}\nDuration: {}\nAdded: {}\nPreview: {}\nCover: {}",
                t.name,
                t.artist_names(),
                t.album.name,
                format_duration(t.duration_ms),
                Some(format_added_at(row.added_at.as_ref()))
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "-".to_string()),
                t.preview_url.as_deref().unwrap_or("none"),
                t.cover_url().unwrap_or("-"),
            )
        }
        None => "No track selected".to_string(),
    };
    let details = Paragraph::new(text)
        .block(
            Block::default()
                .padding(LEFT_PAD)
                .borders(Borders::ALL)
                .title(" details (K closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(details, popup_area);
}

/// Render the entire UI into `frame`.
pub fn draw<M: MediaElement>(
    frame: &mut Frame,
    app: &App,
    session: &PlaybackSession,
    surface: &Surface<M>,
    ui_settings: &UiSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app, ui_settings);
    draw_tracks(frame, chunks[1], app, session);
    if app.details_window {
        draw_details(frame, chunks[1], app);
    }
    draw_control_panel(frame, chunks[2], app, session, surface, ui_settings);

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
