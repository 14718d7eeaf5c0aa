use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, atomic::AtomicBool},
};

use rand::Rng;

use super::*;
use crate::{
    config::settings::CatalogOrder,
    encode::sink::{InMemorySink, SinkConfig},
    foundation::core::{Fps, FrameIndex, Resolution},
    pipeline::progress::RunState,
    render::frame::Frame,
};

/// Decoder serving solid stills keyed by file name; anything else is corrupt.
#[derive(Default)]
struct StillDecoder {
    stills: HashMap<String, [u8; 3]>,
}

impl StillDecoder {
    fn with(mut self, name: &str, rgb: [u8; 3]) -> Self {
        self.stills.insert(name.to_string(), rgb);
        self
    }
}

impl MediaDecoder for StillDecoder {
    fn image_frame(&self, path: &Path, res: Resolution) -> SlideResult<Frame> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.stills
            .get(&name)
            .map(|rgb| Frame::solid(res, *rgb))
            .ok_or_else(|| SlideError::decode(path, "corrupt"))
    }

    fn video_frames(&self, path: &Path, _res: Resolution, _fps: Fps) -> SlideResult<Vec<Frame>> {
        Err(SlideError::decode(path, "no video support in tests"))
    }
}

struct PanickingSink;

impl FrameSink for PanickingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> SlideResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &Frame) -> SlideResult<()> {
        panic!("encoder exploded");
    }

    fn end(&mut self) -> SlideResult<()> {
        Ok(())
    }
}

fn media_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        std::fs::write(dir.path().join(name), b"placeholder").unwrap();
    }
    dir
}

fn request(media: &Path, out: &Path) -> RunRequest {
    RunRequest {
        media_dir: media.to_path_buf(),
        music_file: None,
        output_dir: out.to_path_buf(),
        output_filename: "show.mp4".to_string(),
        resolution: "8x6".to_string(),
        image_duration: 2.0,
        transition_duration: 1.0,
        audio_volume: 1.0,
        shuffle: false,
        enabled_transitions: vec!["Fade".to_string()],
        order: CatalogOrder::Sorted,
        tail_hold: Default::default(),
        seed: Some(3),
    }
}

fn decoder() -> Box<dyn MediaDecoder> {
    Box::new(
        StillDecoder::default()
            .with("a.png", [10, 20, 30])
            .with("b.png", [200, 100, 50]),
    )
}

#[test]
fn empty_directory_fails_before_any_work() {
    let media = media_dir(&["notes.txt"]);
    let out = tempfile::tempdir().unwrap();
    let err = prepare_run_with_decoder(&request(media.path(), out.path()), decoder())
        .err()
        .unwrap();
    assert!(matches!(err, SlideError::EmptyCatalog { .. }));
}

#[test]
fn bad_resolution_fails_before_any_work() {
    let media = media_dir(&["a.png"]);
    let out = tempfile::tempdir().unwrap();
    let mut req = request(media.path(), out.path());
    req.resolution = "wide".to_string();
    let err = prepare_run_with_decoder(&req, decoder()).err().unwrap();
    assert!(matches!(err, SlideError::InvalidSettings(_)));
}

#[test]
fn blocking_run_reports_monotonic_progress_then_done() {
    let media = media_dir(&["a.png", "b.png"]);
    let out = tempfile::tempdir().unwrap();
    let mut ctx = prepare_run_with_decoder(&request(media.path(), out.path()), decoder()).unwrap();
    let (mut reporter, events) = ProgressReporter::channel();
    let mut sink = InMemorySink::new();

    let summary = run_blocking(&mut ctx, &mut sink, &mut reporter).unwrap();
    assert_eq!(summary.frames, 150);
    assert_eq!(summary.transitions, 1);
    assert_eq!(summary.substituted, 0);
    assert!((summary.duration_secs - 5.0).abs() < 1e-9);
    assert_eq!(summary.output_path, out.path().join("show.mp4"));
    assert_eq!(sink.frames().len(), 150);
    assert!(sink.is_finished());

    let events: Vec<ProgressEvent> = events.try_iter().collect();
    let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
    assert_eq!(events[0].message, "Processed 1/2: a.png");

    let last = events.last().unwrap();
    assert_eq!(last.state, RunState::Done);
    assert_eq!(last.percent, 100);
    assert!(last.message.starts_with("Video saved to "));
    let terminal = events.iter().filter(|e| e.state.is_terminal()).count();
    assert_eq!(terminal, 1);
}

#[test]
fn corrupt_items_are_counted_not_fatal() {
    let media = media_dir(&["a.png", "broken.png", "b.png"]);
    let out = tempfile::tempdir().unwrap();
    let mut ctx = prepare_run_with_decoder(&request(media.path(), out.path()), decoder()).unwrap();
    let (mut reporter, _events) = ProgressReporter::channel();
    let mut sink = InMemorySink::new();

    let summary = run_blocking(&mut ctx, &mut sink, &mut reporter).unwrap();
    assert_eq!(summary.substituted, 1);
    assert_eq!(summary.transitions, 2);
}

#[test]
fn cancelled_run_ends_with_error_event() {
    let media = media_dir(&["a.png", "b.png"]);
    let out = tempfile::tempdir().unwrap();
    let mut ctx = prepare_run_with_decoder(&request(media.path(), out.path()), decoder())
        .unwrap()
        .with_cancel_flag(Arc::new(AtomicBool::new(true)));
    let (mut reporter, events) = ProgressReporter::channel();
    let mut sink = InMemorySink::new();

    let err = run_blocking(&mut ctx, &mut sink, &mut reporter).unwrap_err();
    assert!(matches!(err, SlideError::Cancelled));
    assert!(sink.config().is_none());

    let last = events.try_iter().last().unwrap();
    assert_eq!(last.state, RunState::Error);
    assert_eq!(last.message, "render cancelled");
}

#[test]
fn panic_in_sink_becomes_render_error() {
    let media = media_dir(&["a.png"]);
    let out = tempfile::tempdir().unwrap();
    let mut ctx = prepare_run_with_decoder(&request(media.path(), out.path()), decoder()).unwrap();
    let (mut reporter, events) = ProgressReporter::channel();

    let err = run_blocking(&mut ctx, &mut PanickingSink, &mut reporter).unwrap_err();
    match err {
        SlideError::Render(msg) => assert!(msg.contains("encoder exploded"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
    let last = events.try_iter().last().unwrap();
    assert_eq!(last.state, RunState::Error);
}

#[test]
fn spawned_run_streams_events_and_joins() {
    let media = media_dir(&["a.png", "b.png"]);
    let out = tempfile::tempdir().unwrap();
    let ctx = prepare_run_with_decoder(&request(media.path(), out.path()), decoder()).unwrap();

    let handle = spawn_run(ctx, Box::new(InMemorySink::new())).unwrap();
    let mut terminal = None;
    for event in handle.events().iter() {
        if event.state.is_terminal() {
            terminal = Some(event);
            break;
        }
    }
    assert_eq!(terminal.unwrap().state, RunState::Done);
    let summary = handle.wait().unwrap();
    assert_eq!(summary.frames, 150);
}

#[test]
fn seeded_rng_is_reproducible() {
    let mut a = seeded_rng(Some(42));
    let mut b = seeded_rng(Some(42));
    for _ in 0..4 {
        assert_eq!(a.r#gen::<u32>(), b.r#gen::<u32>());
    }
}
