use std::sync::Arc;

use crate::foundation::{
    core::{Fps, Resolution},
    error::{SlideError, SlideResult},
};

/// One RGB24 raster of the output video.
///
/// Pixel bytes are shared behind an `Arc`, so static holds that repeat a frame do not copy it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    data: Arc<[u8]>,
}

impl Frame {
    /// Wrap tightly packed RGB24 bytes (`height * width * 3`, row-major).
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> SlideResult<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(SlideError::render(format!(
                "frame data size mismatch: got {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: data.into(),
        })
    }

    /// Uniform frame filled with `rgb`.
    pub fn solid(res: Resolution, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(res.rgb_len());
        for _ in 0..res.pixel_count() {
            data.extend_from_slice(&rgb);
        }
        Self {
            width: res.width,
            height: res.height,
            data: data.into(),
        }
    }

    /// All-black frame, used as the stand-in for media that fails to decode.
    pub fn black(res: Resolution) -> Self {
        Self {
            width: res.width,
            height: res.height,
            data: vec![0u8; res.rgb_len()].into(),
        }
    }

    /// Frame size.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Raw RGB24 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGB value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Return `true` when both frames hold the same pixel buffer.
    pub fn shares_pixels_with(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Convert into an [`image::RgbImage`] (copies the pixels).
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_raw(self.width, self.height, self.data.to_vec())
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }
}

impl From<image::RgbImage> for Frame {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw().into(),
        }
    }
}

/// The ordered, fully buffered frame stream of one run.
///
/// Memory is bounded by `unique_frames * width * height * 3` bytes; holds share buffers but
/// transition and video frames are all distinct.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    resolution: Resolution,
    fps: Fps,
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Create an empty sequence.
    pub fn new(resolution: Resolution, fps: Fps) -> Self {
        Self {
            resolution,
            fps,
            frames: Vec::new(),
        }
    }

    /// Append one frame. Frames of any other size are rejected.
    pub fn push(&mut self, frame: Frame) -> SlideResult<()> {
        if frame.resolution() != self.resolution {
            return Err(SlideError::render(format!(
                "frame size mismatch: got {}, expected {}",
                frame.resolution(),
                self.resolution
            )));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Append `count` repeats of `frame`.
    pub fn push_hold(&mut self, frame: &Frame, count: u64) -> SlideResult<()> {
        if count == 0 {
            return Ok(());
        }
        self.push(frame.clone())?;
        self.frames
            .extend(std::iter::repeat_n(frame.clone(), (count - 1) as usize));
        Ok(())
    }

    /// Output raster size.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when no frames were produced.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total play length, `len / fps`.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frames.len() as u64)
    }

    /// Most recently appended frame.
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Borrow all frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iterate frames in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}
