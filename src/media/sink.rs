//! Loading clips and turning them into `rodio` sinks.
//!
//! A source is read fully into memory (previews are short) so that repeat
//! can replay it without fetching again.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::MediaError;

pub(super) type ClipData = Arc<[u8]>;

#[derive(Debug, PartialEq, Eq)]
pub(super) enum SourceLocation<'a> {
    Remote(&'a str),
    Local(PathBuf),
}

/// Classify a bound source string as an HTTP(S) URL or a local path.
pub(super) fn locate(source: &str) -> SourceLocation<'_> {
    let source = source.trim();
    if source.starts_with("http://") || source.starts_with("https://") {
        SourceLocation::Remote(source)
    } else if let Some(path) = source.strip_prefix("file://") {
        SourceLocation::Local(PathBuf::from(path))
    } else {
        SourceLocation::Local(PathBuf::from(source))
    }
}

pub(super) fn http_client(timeout: Duration) -> Option<Client> {
    match Client::builder().timeout(timeout).build() {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::error!(error = %e, "could not build http client; remote previews disabled");
            None
        }
    }
}

fn read_local(path: &Path) -> Result<ClipData, MediaError> {
    std::fs::read(path)
        .map(ClipData::from)
        .map_err(|e| MediaError::Io(format!("{}: {e}", path.display())))
}

fn fetch_remote(url: &str, client: Option<&Client>) -> Result<ClipData, MediaError> {
    let client = client.ok_or_else(|| MediaError::Fetch("no http client".to_string()))?;
    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| MediaError::Fetch(e.to_string()))?;
    Ok(ClipData::from(bytes.as_ref()))
}

/// Read the whole clip behind `source`. Blocks while downloading.
pub(super) fn load_source(source: &str, client: Option<&Client>) -> Result<ClipData, MediaError> {
    if source.trim().is_empty() {
        return Err(MediaError::NoSource);
    }
    match locate(source) {
        SourceLocation::Remote(url) => fetch_remote(url, client),
        SourceLocation::Local(path) => read_local(&path),
    }
}

/// Duration from container metadata; used when the decoder cannot tell
/// (common for MP3 previews).
pub(super) fn probe_duration(data: &ClipData) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(data.clone()))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    Some(tagged.properties().duration()).filter(|d| !d.is_zero())
}

pub(super) fn decoder_for(data: ClipData) -> Result<Decoder<Cursor<ClipData>>, MediaError> {
    Decoder::new(Cursor::new(data)).map_err(|e| MediaError::Decode(e.to_string()))
}

/// Create a paused `Sink` playing `data` from the beginning, plus the
/// duration the decoder reports (if any).
pub(super) fn create_sink(
    stream: &OutputStream,
    data: ClipData,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let source = decoder_for(data)?;
    let duration = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, duration))
}
