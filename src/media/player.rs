use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;

use super::element::MediaElement;
use super::thread::spawn_media_thread;
use super::types::{ElementInfo, InfoHandle, MediaCmd, MediaEvent, StartTicket};

/// rodio-backed media element. Commands go to a worker thread; events come
/// back over a channel.
pub struct RodioElement {
    tx: Sender<MediaCmd>,
    events: Receiver<MediaEvent>,
    info: InfoHandle,
    generation: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl RodioElement {
    pub fn new(audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<MediaCmd>();
        let (event_tx, events) = mpsc::channel::<MediaEvent>();
        let info: InfoHandle = Arc::new(Mutex::new(ElementInfo::default()));
        let generation = Arc::new(AtomicU64::new(0));

        let join = spawn_media_thread(
            rx,
            event_tx,
            info.clone(),
            generation.clone(),
            audio_settings,
        );

        Self {
            tx,
            events,
            info,
            generation,
            join: Some(join),
        }
    }

    fn send(&self, cmd: MediaCmd) {
        if self.tx.send(cmd).is_err() {
            tracing::warn!("media worker is gone; command dropped");
        }
    }

    /// Fade out, stop the worker and wait for it.
    pub fn quit_softly(&mut self, fade_out: Duration) {
        self.send(MediaCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }

    /// Info only counts when it belongs to the most recent bind.
    fn current_info(&self) -> Option<ElementInfo> {
        let generation = self.generation.load(Ordering::SeqCst);
        self.info
            .lock()
            .ok()
            .filter(|i| i.generation == generation)
            .map(|i| (*i).clone())
    }
}

impl Drop for RodioElement {
    fn drop(&mut self) {
        if self.join.is_some() {
            let _ = self.tx.send(MediaCmd::Quit { fade_out_ms: 0 });
        }
    }
}

impl MediaElement for RodioElement {
    fn bind_source(&mut self, source: Option<&str>) {
        // Bumped here, synchronously, so a start still loading in the worker
        // can tell it has been superseded.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(MediaCmd::Bind {
            source: source.map(str::to_string),
            generation,
        });
    }

    fn start(&mut self, ticket: StartTicket) {
        self.send(MediaCmd::Start(ticket));
    }

    fn stop(&mut self) {
        self.send(MediaCmd::Stop);
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(MediaCmd::SetVolume(volume.clamp(0.0, 1.0)));
    }

    fn position(&self) -> Duration {
        self.current_info().map(|i| i.position).unwrap_or_default()
    }

    fn duration(&self) -> Option<Duration> {
        self.current_info().and_then(|i| i.duration)
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        self.events.try_recv().ok()
    }
}
