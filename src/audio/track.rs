use std::path::Path;

use crate::{
    assets::media::AudioPcm,
    foundation::{
        core::Fps,
        error::{SlideError, SlideResult},
    },
};

/// Convert a frame count to the nearest sample-frame count at `sample_rate`.
pub fn frame_to_sample(frame_delta: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frame_delta) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

/// Scale `pcm` by `volume` and fit it to exactly `total_frames` sample frames.
///
/// Longer input is trimmed. Shorter input is padded with silence, never looped, so the
/// music simply stops and the rest of the video is quiet.
pub fn fit_music_track(pcm: &AudioPcm, volume: f32, total_frames: u64) -> Vec<f32> {
    let channels = usize::from(pcm.channels.max(1));
    let wanted = total_frames as usize * channels;
    let gain = volume.clamp(0.0, 1.0);

    let mut out: Vec<f32> = pcm
        .interleaved_f32
        .iter()
        .take(wanted)
        .map(|s| (s * gain).clamp(-1.0, 1.0))
        .collect();
    if out.len() < wanted {
        tracing::debug!(
            music_secs = pcm.frames() as f64 / f64::from(pcm.sample_rate.max(1)),
            "music shorter than video, padding with silence"
        );
        out.resize(wanted, 0.0);
    }
    out
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> SlideResult<()> {
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        SlideError::render(format!(
            "failed to write audio track '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/track.rs"]
mod tests;
