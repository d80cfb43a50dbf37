use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::sink::{ClipData, SourceLocation, decoder_for, load_source, locate, probe_duration};
use super::thread::Worker;
use super::types::{ElementInfo, InfoHandle};
use super::*;

/// Worker without an output device or HTTP client, plus the handles an
/// element would hold.
fn offline_worker() -> (Worker, Arc<AtomicU64>, InfoHandle, Receiver<MediaEvent>) {
    let (events, rx) = mpsc::channel();
    let info: InfoHandle = Arc::new(Mutex::new(ElementInfo::default()));
    let generation = Arc::new(AtomicU64::new(0));
    let worker = Worker::new(None, None, events, info.clone(), generation.clone());
    (worker, generation, info, rx)
}

/// Mirror `RodioElement::bind_source`: bump first, then hand over.
fn bind(worker: &mut Worker, generation: &AtomicU64, source: Option<&Path>) -> u64 {
    let g = generation.fetch_add(1, Ordering::SeqCst) + 1;
    worker.bind(source.map(|p| p.to_string_lossy().into_owned()), g);
    g
}

fn write_clip(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"bytes that stand in for a clip").unwrap();
    path
}

#[test]
fn locate_classifies_urls_and_paths() {
    assert_eq!(
        locate("https://p.scdn.co/mp3-preview/abc"),
        SourceLocation::Remote("https://p.scdn.co/mp3-preview/abc")
    );
    assert_eq!(
        locate("  http://example.com/a.mp3 "),
        SourceLocation::Remote("http://example.com/a.mp3")
    );
    assert_eq!(
        locate("file:///music/a.flac"),
        SourceLocation::Local(PathBuf::from("/music/a.flac"))
    );
    assert_eq!(
        locate("/music/b.ogg"),
        SourceLocation::Local(PathBuf::from("/music/b.ogg"))
    );
}

#[test]
fn blank_source_is_no_source() {
    assert_eq!(load_source("", None), Err(MediaError::NoSource));
    assert_eq!(load_source("   ", None), Err(MediaError::NoSource));
}

#[test]
fn missing_local_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.mp3");
    let err = load_source(path.to_str().unwrap(), None).unwrap_err();
    assert!(matches!(err, MediaError::Io(_)), "{err:?}");
}

#[test]
fn remote_without_client_is_fetch_error() {
    let err = load_source("https://example.invalid/a.mp3", None).unwrap_err();
    assert!(matches!(err, MediaError::Fetch(_)), "{err:?}");
}

#[test]
fn local_file_is_read_fully() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp3");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b"not really audio").unwrap();
    drop(f);

    let data = load_source(path.to_str().unwrap(), None).unwrap();
    assert_eq!(&data[..], b"not really audio");
}

#[test]
fn garbage_does_not_decode_or_probe() {
    let data: ClipData = ClipData::from(&b"definitely not a media container"[..]);
    assert!(matches!(decoder_for(data.clone()), Err(MediaError::Decode(_))));
    assert_eq!(probe_duration(&data), None);
}

#[test]
fn errors_read_as_notices() {
    assert_eq!(
        MediaError::NoSource.to_string(),
        "no playable audio for this track"
    );
    assert!(MediaError::Fetch("timeout".into()).to_string().contains("timeout"));
}

#[test]
fn start_tickets_compare_by_value() {
    assert_eq!(StartTicket(3), StartTicket(3));
    assert_ne!(StartTicket(3), StartTicket(4));
}

#[test]
fn start_overtaken_by_newer_bind_is_superseded() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(dir.path(), "a.mp3");
    let (mut worker, generation, _info, _events) = offline_worker();

    bind(&mut worker, &generation, Some(&clip));
    // The element has already handed out a newer bind that the worker has
    // not processed yet.
    generation.fetch_add(1, Ordering::SeqCst);

    // Without the generation check this would reach the missing output
    // device and fail with `Output` instead.
    assert_eq!(worker.start(StartTicket(1)), Err(MediaError::Superseded));
}

#[test]
fn start_for_current_bind_gets_past_the_generation_check() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(dir.path(), "a.mp3");
    let (mut worker, generation, _info, _events) = offline_worker();

    bind(&mut worker, &generation, Some(&clip));
    let err = worker.start(StartTicket(1)).unwrap_err();
    assert!(matches!(err, MediaError::Output(_)), "{err:?}");
}

#[test]
fn start_without_source_is_no_source() {
    let (mut worker, generation, _info, _events) = offline_worker();
    bind(&mut worker, &generation, None);
    assert_eq!(worker.start(StartTicket(1)), Err(MediaError::NoSource));
}

#[test]
fn rebind_drops_loaded_clip_and_publishes_fresh_info() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_clip(dir.path(), "a.mp3");
    let (mut worker, generation, info, _events) = offline_worker();

    bind(&mut worker, &generation, Some(&first));
    // Loads and caches the clip, then stops at the missing device.
    assert!(matches!(worker.start(StartTicket(1)), Err(MediaError::Output(_))));

    // The new source does not exist; a cached clip from the first bind would
    // mask that.
    let second = dir.path().join("gone.mp3");
    let g = bind(&mut worker, &generation, Some(&second));
    let err = worker.start(StartTicket(2)).unwrap_err();
    assert!(matches!(err, MediaError::Io(_)), "{err:?}");

    let published = info.lock().unwrap().clone();
    assert_eq!(published.generation, g);
    assert_eq!(published.position, Duration::ZERO);
    assert_eq!(published.duration, None);
}

#[test]
fn info_from_an_older_bind_is_stale() {
    let (mut worker, generation, info, _events) = offline_worker();
    let g = bind(&mut worker, &generation, None);
    generation.fetch_add(1, Ordering::SeqCst);

    // `RodioElement` only trusts info whose generation matches its own.
    let published = info.lock().unwrap().clone();
    assert_eq!(published.generation, g);
    assert_ne!(published.generation, generation.load(Ordering::SeqCst));
}
