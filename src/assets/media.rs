use std::path::{Path, PathBuf};

use crate::{
    foundation::{
        core::{Fps, Resolution},
        error::{SlideError, SlideResult},
    },
    render::frame::Frame,
};

/// Sample rate used for the music track handed to the encoder.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Stream facts reported by `ffprobe`.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
    pub has_audio: bool,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    /// Expected frame count after resampling to `fps`.
    pub fn resampled_frame_estimate(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_round(self.duration_sec)
    }
}

/// Interleaved `f32` PCM.
#[derive(Clone, Debug)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }
}

pub fn probe_video(source_path: &Path) -> SlideResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let decode_err = |msg: String| SlideError::decode(source_path, msg);

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| decode_err(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(decode_err(format!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| decode_err(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| decode_err("no video stream found".to_string()))?;
    let width = video_stream
        .width
        .ok_or_else(|| decode_err("missing video width from ffprobe".to_string()))?;
    let height = video_stream
        .height
        .ok_or_else(|| decode_err("missing video height from ffprobe".to_string()))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| decode_err("invalid video r_frame_rate".to_string()))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
        has_audio,
    })
}

/// Decode every frame of a video, resampled to `fps` and resized (non-aspect-preserving)
/// to `res`.
pub fn decode_video_frames_rgb(
    source: &VideoSourceInfo,
    res: Resolution,
    fps: Fps,
) -> SlideResult<Vec<Frame>> {
    let filter = format!(
        "fps={}/{},scale={}:{}:flags=bilinear",
        fps.num, fps.den, res.width, res.height
    );
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&source.source_path)
        .args([
            "-an",
            "-vf",
            &filter,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            SlideError::decode(
                &source.source_path,
                format!("failed to run ffmpeg for video decode: {e}"),
            )
        })?;

    if !out.status.success() {
        return Err(SlideError::decode(
            &source.source_path,
            format!(
                "ffmpeg video decode failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let frame_len = res.rgb_len();
    if out.stdout.is_empty() || !out.stdout.len().is_multiple_of(frame_len) {
        return Err(SlideError::decode(
            &source.source_path,
            format!(
                "decoded video has invalid size: got {} bytes, expected a non-zero multiple of {frame_len}",
                out.stdout.len()
            ),
        ));
    }

    out.stdout
        .chunks_exact(frame_len)
        .map(|chunk| Frame::from_rgb(res.width, res.height, chunk.to_vec()))
        .collect()
}

/// Decode an audio file to interleaved stereo `f32` at `sample_rate`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> SlideResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| SlideError::decode(path, format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(SlideError::decode(
            path,
            format!(
                "ffmpeg audio decode failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(SlideError::decode(
            path,
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn media_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}
