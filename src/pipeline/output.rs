use crate::{
    assets::media::{MIX_SAMPLE_RATE, decode_audio_f32_stereo},
    audio::track::{fit_music_track, frame_to_sample, write_f32le_file},
    config::settings::Settings,
    encode::{
        ffmpeg::{FfmpegSink, FfmpegSinkOpts},
        sink::{AudioInputConfig, FrameSink, SinkConfig},
    },
    foundation::{
        core::FrameIndex,
        error::{SlideError, SlideResult},
    },
    render::frame::FrameSequence,
};

/// Encode `sequence` to `settings.output_path` as MP4, muxing the music track if configured.
///
/// An existing file at the output path is replaced.
pub fn render(sequence: FrameSequence, settings: &Settings) -> SlideResult<()> {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&settings.output_path));
    render_with_sink(sequence, settings, &mut sink)
}

/// Encode `sequence` through an arbitrary sink.
#[tracing::instrument(skip_all, fields(frames = sequence.len(), out = %settings.output_path.display()))]
pub fn render_with_sink(
    sequence: FrameSequence,
    settings: &Settings,
    sink: &mut dyn FrameSink,
) -> SlideResult<()> {
    if sequence.is_empty() {
        return Err(SlideError::render("frame sequence is empty"));
    }

    // Held until `sink.end()` returns so ffmpeg can read it.
    let music = match settings.music_file.as_ref() {
        Some(path) => Some(prepare_music(path, &sequence, settings.audio_volume)?),
        None => None,
    };

    let res = sequence.resolution();
    sink.begin(SinkConfig {
        width: res.width,
        height: res.height,
        fps: sequence.fps(),
        audio: music.as_ref().map(|tmp| AudioInputConfig {
            path: tmp.path().to_path_buf(),
            sample_rate: MIX_SAMPLE_RATE,
            channels: 2,
        }),
    })?;

    for (i, frame) in sequence.iter().enumerate() {
        sink.push_frame(FrameIndex(i as u64), frame)?;
    }
    sink.end()?;

    tracing::info!(
        duration_sec = sequence.duration_secs(),
        with_music = music.is_some(),
        "video written"
    );
    Ok(())
}

fn prepare_music(
    path: &std::path::Path,
    sequence: &FrameSequence,
    volume: f32,
) -> SlideResult<tempfile::NamedTempFile> {
    let pcm = decode_audio_f32_stereo(path, MIX_SAMPLE_RATE).map_err(|e| match e {
        SlideError::MediaDecode { path, message } => SlideError::render(format!(
            "cannot decode music '{}': {message}",
            path.display()
        )),
        other => other,
    })?;

    let total_samples = frame_to_sample(sequence.len() as u64, sequence.fps(), MIX_SAMPLE_RATE);
    let samples = fit_music_track(&pcm, volume, total_samples);

    let tmp = tempfile::Builder::new()
        .prefix("slidereel-music-")
        .suffix(".f32le")
        .tempfile()
        .map_err(|e| SlideError::render(format!("failed to create audio temp file: {e}")))?;
    write_f32le_file(&samples, tmp.path())?;
    Ok(tmp)
}
