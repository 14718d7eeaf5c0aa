use std::path::Path;

use anyhow::Context as _;
use image::imageops::FilterType;

use crate::{
    assets::media::{decode_video_frames_rgb, probe_video},
    foundation::{
        core::{Fps, Resolution},
        error::{SlideError, SlideResult},
    },
    render::frame::Frame,
};

/// Source of decoded, size-normalized frames for catalog items.
///
/// Every returned frame must have exactly the requested resolution.
pub trait MediaDecoder: Send {
    /// Decode a still image and resize it to `res`.
    fn image_frame(&self, path: &Path, res: Resolution) -> SlideResult<Frame>;

    /// Decode all frames of a video at `fps`, resized to `res`. Must return at least one frame.
    fn video_frames(&self, path: &Path, res: Resolution, fps: Fps) -> SlideResult<Vec<Frame>>;
}

/// Decoder backed by the `image` crate for stills and system `ffmpeg` for video.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileDecoder;

impl MediaDecoder for FileDecoder {
    fn image_frame(&self, path: &Path, res: Resolution) -> SlideResult<Frame> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read image '{}'", path.display()))
            .map_err(|e| SlideError::decode(path, format!("{e:#}")))?;
        decode_image(&bytes, res).map_err(|e| SlideError::decode(path, format!("{e:#}")))
    }

    fn video_frames(&self, path: &Path, res: Resolution, fps: Fps) -> SlideResult<Vec<Frame>> {
        let info = probe_video(path)?;
        tracing::debug!(
            path = %path.display(),
            source_fps = info.source_fps(),
            duration_sec = info.duration_sec,
            expected_frames = info.resampled_frame_estimate(fps),
            "decoding video"
        );
        decode_video_frames_rgb(&info, res, fps)
    }
}

/// Decode encoded image bytes and stretch them to exactly `res`.
pub fn decode_image(bytes: &[u8], res: Resolution) -> anyhow::Result<Frame> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let resized = dyn_img.resize_exact(res.width, res.height, FilterType::Triangle);
    Ok(Frame::from(resized.to_rgb8()))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
