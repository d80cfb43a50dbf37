use std::time::Duration;

use crate::catalog::Track;
use crate::media::{MediaElement, MediaError, MediaEvent, StartTicket};
use crate::session::{Action, Direction, PlaybackSession};

/// What the element currently holds, from the surface's point of view.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SurfaceState {
    /// Nothing is current.
    #[default]
    Idle,
    LoadedPaused,
    LoadedPlaying,
    /// A track is current but has no audio to bind.
    Unplayable,
}

/// Percentage elapsed. Zero when the duration is unknown or zero.
pub fn progress_percent(position: Duration, duration: Option<Duration>) -> f64 {
    match duration.filter(|d| !d.is_zero()) {
        Some(d) => (position.as_secs_f64() / d.as_secs_f64() * 100.0).clamp(0.0, 100.0),
        None => 0.0,
    }
}

/// Owns exactly one media element and drives it from session changes.
pub struct Surface<M: MediaElement> {
    element: M,
    state: SurfaceState,
    pending: Option<StartTicket>,
    /// Start behind the audio currently in motion; only its end counts.
    playing: Option<StartTicket>,
    next_ticket: u64,
    notice: Option<String>,
}

impl<M: MediaElement> Surface<M> {
    /// Take ownership of `element` and bring it in line with `session`.
    pub fn mount(element: M, session: &mut PlaybackSession) -> Self {
        let mut surface = Self {
            element,
            state: SurfaceState::Idle,
            pending: None,
            playing: None,
            next_ticket: 0,
            notice: None,
        };
        // Everything recorded so far is covered by the full sync below.
        let _ = session.take_changes();
        surface.apply_volume(session.volume());
        surface.sync_track(session);
        surface.reconcile(session);
        surface
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    #[cfg(test)]
    pub fn element(&self) -> &M {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut M {
        &mut self.element
    }

    /// Last problem worth showing to the user, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// The start whose outcome is still awaited.
    #[cfg(test)]
    pub fn pending(&self) -> Option<StartTicket> {
        self.pending
    }

    /// Elapsed time and, when known, total length of the loaded clip.
    pub fn timing(&self) -> (Duration, Option<Duration>) {
        match self.state {
            SurfaceState::LoadedPaused | SurfaceState::LoadedPlaying => {
                (self.element.position(), self.element.duration())
            }
            SurfaceState::Idle | SurfaceState::Unplayable => (Duration::ZERO, None),
        }
    }

    /// Apply whatever changed in `session` since the last call.
    pub fn reconcile(&mut self, session: &mut PlaybackSession) {
        // Reverting an unplayable start records a new change; loop until
        // the session is quiet.
        loop {
            let changes = session.take_changes();
            if changes.is_empty() {
                return;
            }
            if changes.volume {
                self.apply_volume(session.volume());
            }
            if changes.track {
                self.sync_track(session);
            } else if changes.playing {
                self.sync_playing(session);
            }
        }
    }

    /// Feed one element event back into the session.
    pub fn handle_event(&mut self, event: MediaEvent, session: &mut PlaybackSession) {
        match event {
            MediaEvent::TimeUpdate => {
                let pct = progress_percent(self.element.position(), self.element.duration());
                session.dispatch(Action::SetProgress(pct));
            }
            MediaEvent::Ended(ticket) => self.on_ended(ticket, session),
            MediaEvent::StartSettled { ticket, result } => {
                self.on_start_settled(ticket, result, session)
            }
        }
        self.reconcile(session);
    }

    /// Drain all pending element events.
    pub fn pump(&mut self, session: &mut PlaybackSession) {
        while let Some(event) = self.element.poll_event() {
            self.handle_event(event, session);
        }
    }

    /// User-requested previous/next.
    pub fn skip(&mut self, direction: Direction, session: &mut PlaybackSession) {
        if let Some(track) = session.neighbour(direction).cloned() {
            session.dispatch(Action::SetCurrentTrack(track));
        }
        self.reconcile(session);
    }

    /// Bind `track`'s audio. Never starts playback by itself.
    pub fn load(&mut self, track: &Track) {
        self.pending = None;
        self.playing = None;
        match track.preview_url.as_deref().filter(|_| track.is_playable()) {
            Some(url) => {
                self.element.bind_source(Some(url.trim()));
                self.state = SurfaceState::LoadedPaused;
                self.notice = None;
            }
            None => {
                tracing::info!(id = %track.id, "track has no preview");
                self.element.bind_source(None);
                self.state = SurfaceState::Unplayable;
            }
        }
    }

    pub fn unload(&mut self) {
        self.pending = None;
        self.playing = None;
        self.element.bind_source(None);
        self.state = SurfaceState::Idle;
    }

    pub fn resume(&mut self) {
        if self.state == SurfaceState::LoadedPaused {
            self.issue_start();
        }
    }

    pub fn pause(&mut self) {
        if self.state == SurfaceState::LoadedPlaying {
            self.element.stop();
            self.pending = None;
            self.playing = None;
            self.state = SurfaceState::LoadedPaused;
        }
    }

    /// Play the loaded source again from the beginning.
    pub fn restart(&mut self) {
        if matches!(
            self.state,
            SurfaceState::LoadedPaused | SurfaceState::LoadedPlaying
        ) {
            self.issue_start();
        }
    }

    /// `volume` is a percentage.
    pub fn apply_volume(&mut self, volume: u8) {
        self.element.set_volume(f32::from(volume.min(100)) / 100.0);
    }

    fn issue_start(&mut self) {
        self.next_ticket += 1;
        let ticket = StartTicket(self.next_ticket);
        self.element.start(ticket);
        self.pending = Some(ticket);
        self.playing = Some(ticket);
        self.state = SurfaceState::LoadedPlaying;
    }

    fn sync_track(&mut self, session: &mut PlaybackSession) {
        match session.current_track() {
            Some(track) => self.load(track),
            None => self.unload(),
        }
        if session.is_playing() {
            self.sync_playing(session);
        }
    }

    fn sync_playing(&mut self, session: &mut PlaybackSession) {
        if !session.is_playing() {
            self.pause();
            return;
        }
        match self.state {
            SurfaceState::LoadedPaused => self.resume(),
            SurfaceState::LoadedPlaying => {}
            SurfaceState::Unplayable => {
                self.notice = Some(MediaError::NoSource.to_string());
                session.dispatch(Action::SetIsPlaying(false));
            }
            SurfaceState::Idle => session.dispatch(Action::SetIsPlaying(false)),
        }
    }

    fn on_ended(&mut self, ticket: StartTicket, session: &mut PlaybackSession) {
        if self.state != SurfaceState::LoadedPlaying || self.playing != Some(ticket) {
            tracing::debug!(ticket = ticket.0, "ignoring end of a clip no longer playing");
            return;
        }
        self.state = SurfaceState::LoadedPaused;
        self.pending = None;
        self.playing = None;

        if session.repeat() {
            self.restart();
            return;
        }
        match session.neighbour(Direction::Next).cloned() {
            Some(next) => {
                session.dispatch(Action::SetCurrentTrack(next));
                session.dispatch(Action::SetIsPlaying(true));
            }
            None => session.dispatch(Action::SetIsPlaying(false)),
        }
    }

    fn on_start_settled(
        &mut self,
        ticket: StartTicket,
        result: Result<(), MediaError>,
        session: &mut PlaybackSession,
    ) {
        if self.pending != Some(ticket) {
            tracing::debug!(ticket = ticket.0, "ignoring stale start");
            return;
        }
        self.pending = None;
        match result {
            Ok(()) => {}
            Err(MediaError::Superseded) => {}
            Err(e) => {
                tracing::warn!(error = %e, "playback could not start");
                self.playing = None;
                self.state = SurfaceState::LoadedPaused;
                self.notice = Some(e.to_string());
                session.dispatch(Action::SetIsPlaying(false));
            }
        }
    }
}
