//! Media-related small types and handles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// Identifies one start request so its outcome can be matched later.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StartTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("no playable audio for this track")]
    NoSource,
    #[error("could not download audio: {0}")]
    Fetch(String),
    #[error("could not read audio file: {0}")]
    Io(String),
    #[error("unsupported or corrupt audio: {0}")]
    Decode(String),
    #[error("audio output unavailable: {0}")]
    Output(String),
    /// A newer source was bound while this start was still loading.
    #[error("superseded by a newer source")]
    Superseded,
}

/// Events emitted by a media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Playback position moved; read it with `MediaElement::position`.
    TimeUpdate,
    /// The clip put in motion by this start played to its end.
    Ended(StartTicket),
    /// Outcome of a start request.
    StartSettled {
        ticket: StartTicket,
        result: Result<(), MediaError>,
    },
}

#[derive(Debug)]
pub(super) enum MediaCmd {
    Bind {
        source: Option<String>,
        generation: u64,
    },
    Start(StartTicket),
    Stop,
    SetVolume(f32),
    Quit {
        fade_out_ms: u64,
    },
}

/// Position/duration published by the worker, tagged with the bind
/// generation they belong to.
#[derive(Debug, Clone, Default)]
pub(super) struct ElementInfo {
    pub generation: u64,
    pub position: Duration,
    pub duration: Option<Duration>,
}

pub(super) type InfoHandle = Arc<Mutex<ElementInfo>>;
