use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use rand::rngs::StdRng;

use crate::{
    assets::decode::MediaDecoder,
    catalog::scan::{MediaCatalog, MediaItem, MediaKind},
    config::settings::{Settings, TailHold},
    effects::transitions::TransitionName,
    foundation::error::{SlideError, SlideResult},
    render::frame::{Frame, FrameSequence},
};

/// Everything one run needs, owned by the thread that assembles it.
pub struct RunContext {
    settings: Settings,
    catalog: MediaCatalog,
    rng: StdRng,
    decoder: Box<dyn MediaDecoder>,
    cancel: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new(
        settings: Settings,
        catalog: MediaCatalog,
        rng: StdRng,
        decoder: Box<dyn MediaDecoder>,
    ) -> Self {
        Self {
            settings,
            catalog,
            rng,
            decoder,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an external cancellation flag. It is polled between items only.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &MediaCatalog {
        &self.catalog
    }
}

/// Per-item progress notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemProgress {
    /// 0-based index of the finished item.
    pub index: usize,
    /// Catalog size.
    pub total: usize,
    /// `100 * index / total`.
    pub percent: u8,
    pub message: String,
}

/// Where a transition segment landed in the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Boundary {
    /// Index of the incoming item.
    pub item: usize,
    /// Effect drawn for this boundary.
    pub transition: TransitionName,
    /// First output frame of the segment.
    pub start_frame: usize,
    /// Segment length in frames.
    pub frames: usize,
}

/// Result of [`assemble`].
#[derive(Clone, Debug)]
pub struct Assembly {
    pub sequence: FrameSequence,
    /// One entry per rendered transition segment, in order.
    pub boundaries: Vec<Boundary>,
    /// Items replaced by a black placeholder because they failed to decode.
    pub substituted: Vec<MediaItem>,
}

enum ItemContent {
    Still(Frame),
    Clip(Vec<Frame>),
}

impl ItemContent {
    fn first_frame(&self) -> Option<&Frame> {
        match self {
            ItemContent::Still(f) => Some(f),
            ItemContent::Clip(frames) => frames.first(),
        }
    }
}

/// Build the full output frame stream for the catalog in `ctx`.
///
/// Layout per item `i`:
/// - the deferred static hold of item `i - 1` when that item was a still image,
/// - a transition segment from the previous item's last frame into this item's first frame
///   (skipped for `i == 0`),
/// - the item's own frames when it is a video; a still image's hold is deferred.
///
/// After the last item a final hold of `image_duration` repeats the last frame. With
/// [`TailHold::ImagesOnly`] that hold is dropped when the run ends on a video.
#[tracing::instrument(skip_all, fields(items = ctx.catalog.len()))]
pub fn assemble(
    ctx: &mut RunContext,
    on_progress: &mut dyn FnMut(ItemProgress),
) -> SlideResult<Assembly> {
    let settings = &ctx.settings;
    let res = settings.resolution;
    let hold_frames = settings.image_hold_frames();
    let transition_frames = settings.transition_frames();
    let total = ctx.catalog.len();

    let mut sequence = FrameSequence::new(res, settings.frame_rate);
    let mut boundaries = Vec::new();
    let mut substituted = Vec::new();
    let mut prev_last: Option<Frame> = None;
    let mut pending_hold: Option<Frame> = None;

    for (i, item) in ctx.catalog.items().iter().enumerate() {
        if ctx.cancel.load(Ordering::Relaxed) {
            tracing::info!(item = i, "assembly cancelled");
            return Err(SlideError::Cancelled);
        }

        let content = match load_item(ctx.decoder.as_ref(), settings, item) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %item.path.display(), error = %e, "substituting black frame");
                substituted.push(item.clone());
                ItemContent::Still(Frame::black(res))
            }
        };

        if let Some(frame) = pending_hold.take() {
            sequence.push_hold(&frame, hold_frames)?;
        }

        if let (Some(prev), Some(next)) = (prev_last.as_ref(), content.first_frame())
            && transition_frames > 0
        {
            let name = settings.enabled_transitions.choose(&mut ctx.rng);
            let blend = name.function();
            let start_frame = sequence.len();
            for k in 0..transition_frames {
                let progress = (k + 1) as f32 / transition_frames as f32;
                sequence.push(blend(prev, next, progress))?;
            }
            boundaries.push(Boundary {
                item: i,
                transition: name,
                start_frame,
                frames: transition_frames as usize,
            });
        }

        match content {
            ItemContent::Still(frame) => {
                prev_last = Some(frame.clone());
                pending_hold = Some(frame);
            }
            ItemContent::Clip(frames) => {
                prev_last = frames.last().cloned();
                for frame in frames {
                    sequence.push(frame)?;
                }
            }
        }

        let percent = (100 * i / total) as u8;
        let name = item
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        on_progress(ItemProgress {
            index: i,
            total,
            percent,
            message: format!("Processed {}/{total}: {name}", i + 1),
        });
    }

    match (pending_hold, prev_last, settings.tail_hold) {
        (Some(frame), _, _) => sequence.push_hold(&frame, hold_frames)?,
        (None, Some(frame), TailHold::Always) => sequence.push_hold(&frame, hold_frames)?,
        _ => {}
    }

    tracing::info!(
        frames = sequence.len(),
        duration_sec = sequence.duration_secs(),
        transitions = boundaries.len(),
        substituted = substituted.len(),
        "frame sequence assembled"
    );

    Ok(Assembly {
        sequence,
        boundaries,
        substituted,
    })
}

fn load_item(
    decoder: &dyn MediaDecoder,
    settings: &Settings,
    item: &MediaItem,
) -> SlideResult<ItemContent> {
    let res = settings.resolution;
    let content = match item.kind {
        MediaKind::Image => ItemContent::Still(decoder.image_frame(&item.path, res)?),
        MediaKind::Video => {
            let frames = decoder.video_frames(&item.path, res, settings.frame_rate)?;
            if frames.is_empty() {
                return Err(SlideError::decode(&item.path, "video produced no frames"));
            }
            ItemContent::Clip(frames)
        }
    };

    let wrong_size = match &content {
        ItemContent::Still(f) => f.resolution() != res,
        ItemContent::Clip(frames) => frames.iter().any(|f| f.resolution() != res),
    };
    if wrong_size {
        return Err(SlideError::decode(
            &item.path,
            format!("decoder returned frames that are not {res}"),
        ));
    }
    Ok(content)
}

#[cfg(test)]
#[path = "../../tests/unit/render/assemble.rs"]
mod tests;
