#![forbid(unsafe_code)]
//! Transition-based slideshow compositor.
//!
//! A run scans a media directory, turns every image and video into RGB frames at one output
//! resolution, joins consecutive items with a randomly drawn transition, and encodes the result
//! to MP4 (H.264 video, optional AAC music track) through the system `ffmpeg`.
//!
//! The stages are exposed separately:
//! - [`catalog::scan`] builds the ordered [`MediaCatalog`].
//! - [`effects::transitions`] holds the blend functions.
//! - [`render::assemble`] produces the in-memory [`FrameSequence`].
//! - [`pipeline::output`] fits the music and feeds a [`FrameSink`].
//! - [`pipeline::worker`] runs all of it on a worker thread with progress events.

pub mod assets;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod pipeline;
pub mod render;

pub use assets::decode::{FileDecoder, MediaDecoder};
pub use catalog::scan::{MediaCatalog, MediaItem, MediaKind};
pub use config::settings::{CatalogOrder, RunRequest, Settings, TailHold};
pub use effects::transitions::{TransitionFn, TransitionName, TransitionSet};
pub use encode::{
    ffmpeg::{FfmpegSink, FfmpegSinkOpts},
    sink::{FrameSink, InMemorySink, SinkConfig},
};
pub use foundation::{
    core::{Fps, FrameIndex, Resolution},
    error::{SlideError, SlideResult},
};
pub use pipeline::{
    progress::{ProgressEvent, ProgressReporter, RunState},
    worker::{RunHandle, RunSummary, prepare_run, run_blocking, spawn_run, start_run},
};
pub use render::{
    assemble::{Assembly, RunContext, assemble},
    frame::{Frame, FrameSequence},
};
