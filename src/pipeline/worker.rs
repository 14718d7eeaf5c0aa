use std::{
    panic::AssertUnwindSafe,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
};

use crossbeam_channel::Receiver;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    assets::decode::{FileDecoder, MediaDecoder},
    catalog::scan::scan,
    config::settings::{RunRequest, Settings},
    encode::{
        ffmpeg::{FfmpegSink, FfmpegSinkOpts},
        sink::FrameSink,
    },
    foundation::error::{SlideError, SlideResult},
    pipeline::{
        output::render_with_sink,
        progress::{ProgressEvent, ProgressReporter},
    },
    render::assemble::{RunContext, assemble},
};

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub frames: usize,
    pub duration_secs: f64,
    pub transitions: usize,
    /// Items that failed to decode and were replaced by black frames.
    pub substituted: usize,
}

/// RNG for one run: seeded when `seed` is set, from OS entropy otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Validate `req` and scan its media directory.
///
/// Everything that can fail before frame work starts fails here: `InvalidSettings` and
/// `EmptyCatalog` are returned to the caller, not reported through a worker.
pub fn prepare_run(req: &RunRequest) -> SlideResult<RunContext> {
    prepare_run_with_decoder(req, Box::new(FileDecoder))
}

/// [`prepare_run`] with a custom decoder.
pub fn prepare_run_with_decoder(
    req: &RunRequest,
    decoder: Box<dyn MediaDecoder>,
) -> SlideResult<RunContext> {
    let settings = Settings::from_request(req)?;
    let mut rng = seeded_rng(settings.seed);
    let catalog = scan(&settings.media_dir, settings.shuffle, settings.order, &mut rng)?;
    tracing::info!(
        items = catalog.len(),
        resolution = %settings.resolution,
        transitions = ?settings.enabled_transitions.names(),
        "run prepared"
    );
    Ok(RunContext::new(settings, catalog, rng, decoder))
}

/// Handle to a run executing on its worker thread.
pub struct RunHandle {
    events: Receiver<ProgressEvent>,
    cancel: Arc<AtomicBool>,
    join: JoinHandle<SlideResult<RunSummary>>,
}

impl RunHandle {
    /// Progress events, ending with exactly one `Done` or `Error` event.
    pub fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    /// Ask the worker to stop before its next item.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Block until the worker exits.
    pub fn wait(self) -> SlideResult<RunSummary> {
        self.join
            .join()
            .map_err(|_| SlideError::render("worker thread panicked"))?
    }
}

/// Validate, scan, and start rendering to MP4 on a dedicated worker thread.
pub fn start_run(req: &RunRequest) -> SlideResult<RunHandle> {
    let ctx = prepare_run(req)?;
    let sink = FfmpegSink::new(FfmpegSinkOpts::new(&ctx.settings().output_path));
    spawn_run(ctx, Box::new(sink))
}

/// Run a prepared context on a new worker thread, writing through `sink`.
pub fn spawn_run(ctx: RunContext, mut sink: Box<dyn FrameSink>) -> SlideResult<RunHandle> {
    let (mut reporter, events) = ProgressReporter::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let mut ctx = ctx.with_cancel_flag(cancel.clone());

    let join = std::thread::Builder::new()
        .name("slidereel-worker".to_string())
        .spawn(move || run_blocking(&mut ctx, sink.as_mut(), &mut reporter))
        .map_err(|e| SlideError::render(format!("failed to spawn worker thread: {e}")))?;

    Ok(RunHandle {
        events,
        cancel,
        join,
    })
}

/// Assemble and encode on the calling thread.
///
/// Exactly one terminal event is sent through `reporter`. Panics inside the pipeline are
/// converted to [`SlideError::Render`].
pub fn run_blocking(
    ctx: &mut RunContext,
    sink: &mut dyn FrameSink,
    reporter: &mut ProgressReporter,
) -> SlideResult<RunSummary> {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| execute(ctx, sink, reporter)))
        .unwrap_or_else(|payload| {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(SlideError::render(format!("unexpected failure: {msg}")))
        });

    match &result {
        Ok(summary) => {
            tracing::info!(out = %summary.output_path.display(), frames = summary.frames, "run finished");
            reporter.done(format!(
                "Video saved to {}",
                summary.output_path.display()
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            reporter.error(e.to_string());
        }
    }
    result
}

fn execute(
    ctx: &mut RunContext,
    sink: &mut dyn FrameSink,
    reporter: &mut ProgressReporter,
) -> SlideResult<RunSummary> {
    let assembly = assemble(ctx, &mut |p| reporter.progress(p.percent, p.message))?;

    let summary = RunSummary {
        output_path: ctx.settings().output_path.clone(),
        frames: assembly.sequence.len(),
        duration_secs: assembly.sequence.duration_secs(),
        transitions: assembly.boundaries.len(),
        substituted: assembly.substituted.len(),
    };

    reporter.status("Encoding video...");
    render_with_sink(assembly.sequence, ctx.settings(), sink)?;
    Ok(summary)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/worker.rs"]
mod tests;
