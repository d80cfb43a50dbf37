use std::env;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::catalog::{CatalogError, Playlist, PlaylistRef, source_for};
use crate::config::Settings;
use crate::media::RodioElement;
use crate::mpris::ControlCmd;
use crate::session::PlaybackSession;
use crate::surface::Surface;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;


/// Fetch the playlist off the UI thread; the result arrives on the channel.
fn spawn_fetch(
    reference: PlaylistRef,
    settings: &Settings,
) -> mpsc::Receiver<Result<Playlist, CatalogError>> {
    let (tx, rx) = mpsc::channel();
    let api = settings.api.clone();
    let library = settings.library.clone();
    let timeout = Duration::from_secs(settings.audio.fetch_timeout_secs);
    thread::spawn(move || {
        let result = source_for(&reference, &api, &library, timeout).and_then(|s| s.load());
        let _ = tx.send(result);
    });
    rx
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();
    let log_path = logging::init_logging(&settings.log);
    if let Some(problem) = settings_problem {
        tracing::warn!("{problem}");
    }
    tracing::info!(log = ?log_path, "playdeck starting");

    let arg = env::args().nth(1).unwrap_or_else(|| {
        env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string())
    });
    let reference = PlaylistRef::parse(&arg)?;
    let playlist_rx = spawn_fetch(reference.clone(), &settings);

    let mut session = PlaybackSession::new();
    startup::apply_playback_defaults(&mut session, &settings);

    let element = RodioElement::new(settings.audio.clone());
    let mut surface = Surface::mount(element, &mut session);
    let mut app = App::new(reference.label(), settings.ui.follow_playback);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut session,
        &mut surface,
        &mpris,
        &control_tx,
        &control_rx,
        &playlist_rx,
        &mut state,
    );

    surface
        .element_mut()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        tracing::error!(error = %e, "event loop failed");
    }
    run_result
}
