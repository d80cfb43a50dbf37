use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;

use super::sink::{ClipData, create_sink, http_client, load_source, probe_duration};
use super::types::{InfoHandle, MediaCmd, MediaError, MediaEvent, StartTicket};

/// State owned by the media worker thread.
pub(super) struct Worker {
    stream: Option<OutputStream>,
    client: Option<Client>,
    events: Sender<MediaEvent>,
    info: InfoHandle,
    /// Latest generation handed out by the element (may be ahead of `bound`).
    generation: Arc<AtomicU64>,
    /// Generation of the source this worker currently holds.
    bound: u64,
    source: Option<String>,
    data: Option<ClipData>,
    duration: Option<Duration>,
    sink: Option<Sink>,
    /// Start that set the current sink going; reported back with `Ended`.
    ticket: Option<StartTicket>,
    paused: bool,
    volume: f32,
}

impl Worker {
    pub(super) fn new(
        stream: Option<OutputStream>,
        client: Option<Client>,
        events: Sender<MediaEvent>,
        info: InfoHandle,
        generation: Arc<AtomicU64>,
    ) -> Self {
        Self {
            stream,
            client,
            events,
            info,
            generation,
            bound: 0,
            source: None,
            data: None,
            duration: None,
            sink: None,
            ticket: None,
            paused: true,
            volume: 1.0,
        }
    }

    fn emit(&self, event: MediaEvent) {
        // The receiver only goes away during shutdown.
        let _ = self.events.send(event);
    }

    fn publish(&self, position: Duration) {
        if let Ok(mut info) = self.info.lock() {
            info.generation = self.bound;
            info.position = position;
            info.duration = self.duration;
        }
    }

    fn superseded(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.bound
    }

    pub(super) fn bind(&mut self, source: Option<String>, generation: u64) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.source = source.filter(|s| !s.trim().is_empty());
        self.bound = generation;
        self.data = None;
        self.duration = None;
        self.ticket = None;
        self.paused = true;
        self.publish(Duration::ZERO);
    }

    pub(super) fn start(&mut self, ticket: StartTicket) -> Result<(), MediaError> {
        let Some(source) = self.source.clone() else {
            return Err(MediaError::NoSource);
        };

        let data = match &self.data {
            Some(d) => d.clone(),
            None => {
                let d = load_source(&source, self.client.as_ref())?;
                self.duration = probe_duration(&d);
                self.data = Some(d.clone());
                d
            }
        };

        // Loading can take a while; the user may have moved on meanwhile.
        if self.superseded() {
            return Err(MediaError::Superseded);
        }

        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| MediaError::Output("no default output device".to_string()))?;

        // A finished sink replays from the beginning.
        let needs_sink = self.sink.as_ref().map(Sink::empty).unwrap_or(true);
        if needs_sink {
            let (sink, decoded) = create_sink(stream, data)?;
            if decoded.is_some() {
                self.duration = decoded;
            }
            self.sink = Some(sink);
        }

        if let Some(s) = self.sink.as_ref() {
            s.set_volume(self.volume);
            s.play();
        }
        self.ticket = Some(ticket);
        self.paused = false;
        self.publish(self.position());
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        self.paused = true;
        self.publish(self.position());
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map(Sink::get_pos).unwrap_or_default()
    }

    /// Periodic work: report position and detect the end of the clip.
    fn tick(&mut self) {
        if self.paused {
            return;
        }
        let Some((finished, pos)) = self.sink.as_ref().map(|s| (s.empty(), s.get_pos())) else {
            return;
        };

        if finished {
            self.paused = true;
            // Pin the position to the end so the last progress reads 100%.
            self.publish(self.duration.unwrap_or(pos));
            self.emit(MediaEvent::TimeUpdate);
            if let Some(ticket) = self.ticket.take() {
                self.emit(MediaEvent::Ended(ticket));
            }
        } else {
            self.publish(pos);
            self.emit(MediaEvent::TimeUpdate);
        }
    }

    fn fade_out(&self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if fade_out_ms > 0 && !self.paused {
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                sink.set_volume(self.volume * (1.0 - t));
                thread::sleep(Duration::from_millis(step_ms));
            }
        }
        sink.stop();
    }
}

pub(super) fn spawn_media_thread(
    rx: Receiver<MediaCmd>,
    events: Sender<MediaEvent>,
    info: InfoHandle,
    generation: Arc<AtomicU64>,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut s) => {
                // rodio logs to stderr when OutputStream is dropped, which
                // would scribble over the TUI.
                s.log_on_drop(false);
                Some(s)
            }
            Err(e) => {
                tracing::error!(error = %e, "no audio output device; playback disabled");
                None
            }
        };

        let client = http_client(Duration::from_secs(audio_settings.fetch_timeout_secs));
        let mut worker = Worker::new(stream, client, events, info, generation);

        let tick = Duration::from_millis(audio_settings.tick_ms.max(1));

        loop {
            match rx.recv_timeout(tick) {
                Ok(MediaCmd::Bind { source, generation }) => {
                    tracing::debug!(?source, generation, "bind source");
                    worker.bind(source, generation);
                }
                Ok(MediaCmd::Start(ticket)) => {
                    let result = worker.start(ticket);
                    if let Err(e) = &result {
                        tracing::warn!(ticket = ticket.0, error = %e, "start failed");
                    }
                    worker.emit(MediaEvent::StartSettled { ticket, result });
                }
                Ok(MediaCmd::Stop) => worker.stop(),
                Ok(MediaCmd::SetVolume(v)) => worker.set_volume(v),
                Ok(MediaCmd::Quit { fade_out_ms }) => {
                    worker.fade_out(fade_out_ms);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => worker.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
