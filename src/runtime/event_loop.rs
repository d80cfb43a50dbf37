use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::catalog::{CatalogError, Playlist};
use crate::config;
use crate::media::MediaElement;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{MprisSnapshot, sync_mpris};
use crate::session::{Action, Direction, PlaybackSession};
use crate::surface::Surface;
use crate::ui;

/// Whether the loop keeps going after handling an input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// What was last published over MPRIS.
    pub mpris: MprisSnapshot,
}

/// Main terminal event loop: handles input, drawing, element events and
/// MPRIS. Returns `Ok(())` when shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run<M: MediaElement>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlaybackSession,
    surface: &mut Surface<M>,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    playlist_rx: &mpsc::Receiver<Result<Playlist, CatalogError>>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if let Ok(result) = playlist_rx.try_recv() {
            app.finish_loading(result, session);
            surface.reconcile(session);
        }

        // Time updates, auto-advance and start outcomes from the element.
        surface.pump(session);
        app.follow(session);

        // Keep MPRIS in sync even when changes come from media keys or auto-advance.
        sync_mpris(mpris, session, &mut state.mpris);

        terminal.draw(|f| ui::draw(f, app, session, surface, &settings.ui))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, session, surface) == Flow::Quit {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, session, surface, control_tx, state)
                    == Flow::Quit
                {
                    return Ok(());
                }
            }
        }
    }
}

/// Start the selected row when nothing is current yet.
fn play_selected(app: &App, session: &mut PlaybackSession) {
    for action in app.play_row_actions(app.selected, session) {
        session.dispatch(action);
    }
}

/// Apply a transport command from the keyboard or MPRIS.
pub fn handle_control_cmd<M: MediaElement>(
    cmd: ControlCmd,
    app: &App,
    session: &mut PlaybackSession,
    surface: &mut Surface<M>,
) -> Flow {
    tracing::debug!(?cmd, "control");
    match cmd {
        ControlCmd::Quit => return Flow::Quit,
        ControlCmd::Play | ControlCmd::PlayPause if session.current_track().is_none() => {
            play_selected(app, session);
        }
        ControlCmd::Play => session.dispatch(Action::SetIsPlaying(true)),
        ControlCmd::PlayPause => session.dispatch(Action::SetIsPlaying(!session.is_playing())),
        ControlCmd::Pause | ControlCmd::Stop => session.dispatch(Action::SetIsPlaying(false)),
        ControlCmd::Next => surface.skip(Direction::Next, session),
        ControlCmd::Prev => surface.skip(Direction::Previous, session),
    }
    surface.reconcile(session);
    Flow::Continue
}

/// Apply one key press.
pub fn handle_key_event<M: MediaElement>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlaybackSession,
    surface: &mut Surface<M>,
    control_tx: &mpsc::Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> Flow {
    let step = i32::from(settings.controls.volume_step);

    // g pending should clear on any other key.
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.last(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            for action in app.play_row_actions(app.selected, session) {
                session.dispatch(action);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('s') => session.dispatch(Action::ToggleShuffle),
        KeyCode::Char('r') => session.dispatch(Action::ToggleRepeat),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            session.dispatch(Action::SetVolume(i32::from(session.volume()) + step));
        }
        KeyCode::Char('-') => {
            session.dispatch(Action::SetVolume(i32::from(session.volume()) - step));
        }
        KeyCode::Char('f') => {
            if let Some(action) = app.like_selected_action() {
                session.dispatch(action);
            }
        }
        KeyCode::Char('F') => app.toggle_follow_playback(),
        KeyCode::Char('K') => app.toggle_details_window(),
        KeyCode::Esc => {
            app.details_window = false;
            surface.clear_notice();
        }
        _ => {}
    }

    surface.reconcile(session);
    Flow::Continue
}
