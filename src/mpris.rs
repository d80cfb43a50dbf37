//! MPRIS service so desktop media keys and `playerctl` can drive playdeck.
//!
//! Method calls are forwarded as [`ControlCmd`]s over the same channel the
//! runtime polls; properties are served from a shared snapshot the runtime
//! keeps current through [`MprisHandle`].

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::catalog::Track;
use crate::session::PlaybackStatus;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.playdeck";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackStatus,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    art_url: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    shuffle: bool,
    repeat: bool,
    volume: f64,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

/// URL for `xesam:url`: remote sources as-is, local paths as `file://`.
fn source_url(source: &str) -> String {
    if source.starts_with("http://") || source.starts_with("https://") || source.starts_with("file://")
    {
        source.to_string()
    } else {
        format!("file://{source}")
    }
}

impl MprisHandle {
    fn changed(&self) {
        let _ = self.notify.send(());
    }

    pub fn set_playback(&self, playback: PlaybackStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
        self.changed();
    }

    /// Publish metadata for the current track; `index` is its position in
    /// the playlist and becomes the MPRIS track id.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>) {
        if let Ok(mut s) = self.state.lock() {
            match track {
                Some(t) => {
                    s.title = Some(t.name.clone());
                    s.artist = t.artists.iter().map(|a| a.name.clone()).collect();
                    s.album = Some(t.album.name.clone()).filter(|a| !a.is_empty());
                    s.art_url = t.cover_url().map(str::to_string);
                    s.url = t
                        .preview_url
                        .as_deref()
                        .filter(|u| !u.trim().is_empty())
                        .map(source_url);
                    s.length_micros = Some(t.duration().as_micros() as i64).filter(|l| *l > 0);
                    s.track_id = index.and_then(|i| {
                        ObjectPath::try_from(format!("{OBJECT_PATH}/track/{i}"))
                            .ok()
                            .map(OwnedObjectPath::from)
                    });
                }
                None => {
                    s.title = None;
                    s.artist.clear();
                    s.album = None;
                    s.art_url = None;
                    s.url = None;
                    s.length_micros = None;
                    s.track_id = None;
                }
            }
        }
        self.changed();
    }

    /// Shuffle/repeat flags and volume as a percentage.
    pub fn set_flags(&self, shuffle: bool, repeat: bool, volume: u8) {
        if let Ok(mut s) = self.state.lock() {
            s.shuffle = shuffle;
            s.repeat = repeat;
            s.volume = f64::from(volume.min(100)) / 100.0;
        }
        self.changed();
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "playdeck"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn insert_value<'a>(map: &mut HashMap<String, OwnedValue>, key: &str, value: impl Into<Value<'a>>) {
    match OwnedValue::try_from(value.into()) {
        Ok(v) => {
            map.insert(key.to_string(), v);
        }
        Err(e) => tracing::debug!(key, error = %e, "skipping metadata entry"),
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn loop_status(&self) -> &str {
        match self.state.lock() {
            Ok(s) if s.repeat => "Track",
            _ => "None",
        }
    }

    #[zbus(property)]
    fn shuffle(&self) -> bool {
        self.state.lock().map(|s| s.shuffle).unwrap_or(false)
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume).unwrap_or(0.0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(id) = s.track_id.as_ref() {
            insert_value(&mut map, "mpris:trackid", ObjectPath::from(id.clone()));
        }
        if let Some(title) = s.title.as_ref() {
            insert_value(&mut map, "xesam:title", title.clone());
        }
        if !s.artist.is_empty() {
            insert_value(&mut map, "xesam:artist", s.artist.clone());
        }
        if let Some(album) = s.album.as_ref() {
            insert_value(&mut map, "xesam:album", album.clone());
        }
        if let Some(art) = s.art_url.as_ref() {
            insert_value(&mut map, "mpris:artUrl", art.clone());
        }
        if let Some(url) = s.url.as_ref() {
            insert_value(&mut map, "xesam:url", url.clone());
        }
        if let Some(len) = s.length_micros {
            insert_value(&mut map, "mpris:length", len);
        }
        map
    }
}

async fn emit_changes(player: &InterfaceRef<PlayerIface>) -> zbus::Result<()> {
    let emitter = player.signal_emitter();
    let iface = player.get().await;
    iface.playback_status_changed(emitter).await?;
    iface.metadata_changed(emitter).await?;
    iface.shuffle_changed(emitter).await?;
    iface.loop_status_changed(emitter).await?;
    iface.volume_changed(emitter).await?;
    Ok(())
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let player = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    tracing::info!(name = BUS_NAME, "MPRIS service registered");

    loop {
        Timer::after(Duration::from_millis(200)).await;

        let mut dirty = false;
        loop {
            match notify.try_recv() {
                Ok(()) => dirty = true,
                Err(TryRecvError::Empty) => break,
                // The runtime is gone.
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if dirty {
            if let Err(e) = emit_changes(&player).await {
                tracing::debug!(error = %e, "MPRIS: PropertiesChanged failed");
            }
        }
    }
}

/// Start the MPRIS service on its own thread. Bus failures are logged and
/// otherwise ignored; the returned handle keeps working either way.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState {
        volume: 1.0,
        ..SharedState::default()
    }));
    let (notify, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
            tracing::warn!(error = %e, "MPRIS unavailable");
        }
    });

    MprisHandle { state, notify }
}
