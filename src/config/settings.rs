use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    effects::transitions::TransitionSet,
    foundation::{
        core::{Fps, Resolution},
        error::{SlideError, SlideResult},
    },
};

/// Order in which catalog items are played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrder {
    /// Filesystem traversal order. Not stable across platforms.
    #[default]
    Traversal,
    /// Paths sorted lexicographically.
    Sorted,
}

/// Whether the last item gets a trailing static hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailHold {
    /// Always hold the final frame, even after a video has played out.
    #[default]
    Always,
    /// Hold the final frame only when the last item is a still image.
    ImagesOnly,
}

/// Raw run request as collected by the configuration front-end.
///
/// This is the JSON shape accepted by `slidereel render --config`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunRequest {
    /// Directory scanned recursively for media.
    pub media_dir: PathBuf,
    /// Optional background music.
    #[serde(default)]
    pub music_file: Option<PathBuf>,
    /// Directory that receives the output file.
    pub output_dir: PathBuf,
    /// Output file name inside `output_dir`.
    pub output_filename: String,
    /// Output size as `"{width}x{height}"`.
    pub resolution: String,
    /// Seconds each still image is shown.
    pub image_duration: f64,
    /// Seconds spent blending between two items.
    pub transition_duration: f64,
    /// Music gain in `[0, 1]`.
    #[serde(default = "default_volume")]
    pub audio_volume: f32,
    /// Randomize catalog order.
    #[serde(default)]
    pub shuffle: bool,
    /// Display names of enabled transitions.
    #[serde(default)]
    pub enabled_transitions: Vec<String>,
    /// Catalog ordering when not shuffled.
    #[serde(default)]
    pub order: CatalogOrder,
    /// Final-hold policy.
    #[serde(default)]
    pub tail_hold: TailHold,
    /// Seed for shuffle and transition draws. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_volume() -> f32 {
    1.0
}

impl RunRequest {
    /// Read a request from a JSON file.
    pub fn from_json_path(path: &Path) -> SlideResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read run config '{}'", path.display()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            SlideError::invalid_settings(format!("parse run config '{}': {e}", path.display()))
        })
    }
}

/// Validated, immutable configuration for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Directory scanned recursively for media.
    pub media_dir: PathBuf,
    /// Optional background music.
    pub music_file: Option<PathBuf>,
    /// Output raster size for every frame.
    pub resolution: Resolution,
    /// Seconds each still image is shown.
    pub image_duration: f64,
    /// Seconds spent blending between two items.
    pub transition_duration: f64,
    /// Music gain in `[0, 1]`.
    pub audio_volume: f32,
    /// Randomize catalog order.
    pub shuffle: bool,
    /// Transitions drawn from at each boundary.
    pub enabled_transitions: TransitionSet,
    /// Final output file.
    pub output_path: PathBuf,
    /// Output frame rate, fixed at 30.
    pub frame_rate: Fps,
    /// Catalog ordering when not shuffled.
    pub order: CatalogOrder,
    /// Final-hold policy.
    pub tail_hold: TailHold,
    /// Seed for shuffle and transition draws.
    pub seed: Option<u64>,
}

impl Settings {
    /// Validate a raw request.
    pub fn from_request(req: &RunRequest) -> SlideResult<Self> {
        let resolution: Resolution = req.resolution.parse()?;

        if !req.image_duration.is_finite() || req.image_duration <= 0.0 {
            return Err(SlideError::invalid_settings(format!(
                "image_duration must be a positive number of seconds, got {}",
                req.image_duration
            )));
        }
        if !req.transition_duration.is_finite() || req.transition_duration < 0.0 {
            return Err(SlideError::invalid_settings(format!(
                "transition_duration must be a non-negative number of seconds, got {}",
                req.transition_duration
            )));
        }
        if !(0.0..=1.0).contains(&req.audio_volume) {
            return Err(SlideError::invalid_settings(format!(
                "audio_volume must be within [0, 1], got {}",
                req.audio_volume
            )));
        }

        if !req.media_dir.is_dir() {
            return Err(SlideError::invalid_settings(format!(
                "media directory '{}' does not exist",
                req.media_dir.display()
            )));
        }
        if let Some(music) = &req.music_file
            && !music.is_file()
        {
            return Err(SlideError::invalid_settings(format!(
                "music file '{}' does not exist",
                music.display()
            )));
        }

        let filename = req.output_filename.trim();
        if filename.is_empty() {
            return Err(SlideError::invalid_settings(
                "output_filename must be non-empty",
            ));
        }
        if Path::new(filename).file_name().map(|f| f.len()) != Some(filename.len()) {
            return Err(SlideError::invalid_settings(format!(
                "output_filename '{filename}' must be a plain file name"
            )));
        }
        std::fs::create_dir_all(&req.output_dir).map_err(|e| {
            SlideError::invalid_settings(format!(
                "output directory '{}' is not usable: {e}",
                req.output_dir.display()
            ))
        })?;

        Ok(Self {
            media_dir: req.media_dir.clone(),
            music_file: req.music_file.clone(),
            resolution,
            image_duration: req.image_duration,
            transition_duration: req.transition_duration,
            audio_volume: req.audio_volume,
            shuffle: req.shuffle,
            enabled_transitions: TransitionSet::from_names(&req.enabled_transitions),
            output_path: req.output_dir.join(filename),
            frame_rate: Fps::SLIDESHOW,
            order: req.order,
            tail_hold: req.tail_hold,
            seed: req.seed,
        })
    }

    /// Frames in one still-image hold.
    pub fn image_hold_frames(&self) -> u64 {
        self.frame_rate.secs_to_frames_round(self.image_duration)
    }

    /// Frames in one transition segment.
    pub fn transition_frames(&self) -> u64 {
        self.frame_rate
            .secs_to_frames_round(self.transition_duration)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
