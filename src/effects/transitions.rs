use std::{collections::BTreeSet, fmt};

use rand::Rng;

use crate::{foundation::math::lerp_u8, render::frame::Frame};

/// Pure blending function `(a, b, progress) -> frame`.
///
/// `a` and `b` must have the same size; the output has that size as well.
pub type TransitionFn = fn(&Frame, &Frame, f32) -> Frame;

/// Closed set of transition effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum TransitionName {
    /// Linear cross-fade.
    #[serde(rename = "Fade")]
    Fade,
    /// Incoming frame slides in from the right edge.
    #[serde(rename = "Slide Left")]
    SlideLeft,
    /// Incoming frame overwrites the outgoing one from the top down.
    #[serde(rename = "Wipe Down")]
    WipeDown,
    /// Outgoing frame zooms in while cross-fading.
    #[serde(rename = "Zoom In")]
    ZoomIn,
}

impl TransitionName {
    /// Every registered transition, in registry order.
    pub const ALL: [TransitionName; 4] = [
        TransitionName::Fade,
        TransitionName::SlideLeft,
        TransitionName::WipeDown,
        TransitionName::ZoomIn,
    ];

    /// Display name as shown to users.
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionName::Fade => "Fade",
            TransitionName::SlideLeft => "Slide Left",
            TransitionName::WipeDown => "Wipe Down",
            TransitionName::ZoomIn => "Zoom In",
        }
    }

    /// Look up a transition by name.
    ///
    /// Matching ignores case and treats spaces, `-` and `_` alike, so `"slide_left"` and
    /// `"Slide Left"` are the same transition.
    pub fn lookup(name: &str) -> Option<Self> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "fade" => Some(TransitionName::Fade),
            "slideleft" => Some(TransitionName::SlideLeft),
            "wipedown" => Some(TransitionName::WipeDown),
            "zoomin" => Some(TransitionName::ZoomIn),
            _ => None,
        }
    }

    /// Blending function registered under this name.
    pub fn function(self) -> TransitionFn {
        match self {
            TransitionName::Fade => fade,
            TransitionName::SlideLeft => slide_left,
            TransitionName::WipeDown => wipe_down,
            TransitionName::ZoomIn => zoom_in,
        }
    }
}

impl fmt::Display for TransitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a transition function by name, falling back to [`fade`] for unknown names.
pub fn resolve(name: &str) -> TransitionFn {
    TransitionName::lookup(name)
        .unwrap_or(TransitionName::Fade)
        .function()
}

/// Non-empty set of transitions a run may draw from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionSet {
    names: Vec<TransitionName>,
}

impl TransitionSet {
    /// Build a set; an empty input yields `{Fade}`.
    pub fn new(names: impl IntoIterator<Item = TransitionName>) -> Self {
        let unique: BTreeSet<TransitionName> = names.into_iter().collect();
        let mut names: Vec<TransitionName> = unique.into_iter().collect();
        if names.is_empty() {
            names.push(TransitionName::Fade);
        }
        Self { names }
    }

    /// Build a set from display names. Unknown names resolve to `Fade`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::new(names.iter().map(|n| {
            let n = n.as_ref();
            TransitionName::lookup(n).unwrap_or_else(|| {
                tracing::warn!(name = n, "unknown transition, using Fade");
                TransitionName::Fade
            })
        }))
    }

    /// Transitions in the set, sorted in registry order.
    pub fn names(&self) -> &[TransitionName] {
        &self.names
    }

    /// Return `true` when `name` is enabled.
    pub fn contains(&self, name: TransitionName) -> bool {
        self.names.contains(&name)
    }

    /// Draw one transition uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> TransitionName {
        self.names[rng.gen_range(0..self.names.len())]
    }
}

impl Default for TransitionSet {
    fn default() -> Self {
        Self::new([TransitionName::Fade])
    }
}

/// `out = a * (1 - p) + b * p`, per channel.
pub fn fade(a: &Frame, b: &Frame, progress: f32) -> Frame {
    if a.resolution() != b.resolution() {
        return b.clone();
    }
    let p = progress.clamp(0.0, 1.0);
    let data = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .map(|(&x, &y)| lerp_u8(x, y, p))
        .collect();
    rebuild(b, data)
}

/// Horizontal slide: the left `1 - p` of the output is `a` shifted left by
/// `round(width * p)` columns, the right `p` is the leading columns of `b`.
pub fn slide_left(a: &Frame, b: &Frame, progress: f32) -> Frame {
    if a.resolution() != b.resolution() {
        return b.clone();
    }
    let w = a.width as usize;
    let offset = split_point(a.width, progress);
    let row_len = w * 3;
    let mut data = Vec::with_capacity(a.as_bytes().len());
    for (row_a, row_b) in a
        .as_bytes()
        .chunks_exact(row_len)
        .zip(b.as_bytes().chunks_exact(row_len))
    {
        data.extend_from_slice(&row_a[offset * 3..]);
        data.extend_from_slice(&row_b[..offset * 3]);
    }
    rebuild(b, data)
}

/// Vertical wipe: rows above `round(height * p)` come from `b`, the rest from `a`.
pub fn wipe_down(a: &Frame, b: &Frame, progress: f32) -> Frame {
    if a.resolution() != b.resolution() {
        return b.clone();
    }
    let row_len = a.width as usize * 3;
    let split = split_point(a.height, progress) * row_len;
    let mut data = Vec::with_capacity(a.as_bytes().len());
    data.extend_from_slice(&b.as_bytes()[..split]);
    data.extend_from_slice(&a.as_bytes()[split..]);
    rebuild(b, data)
}

/// Push-in: `a` is scaled by `1 + 0.5p` around its center, cropped back to size, then
/// blended toward `b` with weight `p`.
pub fn zoom_in(a: &Frame, b: &Frame, progress: f32) -> Frame {
    if a.resolution() != b.resolution() {
        return b.clone();
    }
    let p = progress.clamp(0.0, 1.0);
    let scale = 1.0 + 0.5 * p;
    let (w, h) = (a.width, a.height);
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;

    let mut data = Vec::with_capacity(a.as_bytes().len());
    for y in 0..h {
        let sy = (y as f32 + 0.5 - cy) / scale + cy - 0.5;
        for x in 0..w {
            let sx = (x as f32 + 0.5 - cx) / scale + cx - 0.5;
            let zoomed = sample_bilinear(a, sx, sy);
            let under = b.pixel(x, y);
            for c in 0..3 {
                data.push(lerp_u8(zoomed[c], under[c], p));
            }
        }
    }
    rebuild(b, data)
}

fn split_point(extent: u32, progress: f32) -> usize {
    let p = progress.clamp(0.0, 1.0);
    ((extent as f32 * p).round() as usize).min(extent as usize)
}

fn sample_bilinear(frame: &Frame, x: f32, y: f32) -> [u8; 3] {
    let max_x = (frame.width - 1) as f32;
    let max_y = (frame.height - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let x0 = x0 as u32;
    let y0 = y0 as u32;
    let x1 = (x0 + 1).min(frame.width - 1);
    let y1 = (y0 + 1).min(frame.height - 1);

    let p00 = frame.pixel(x0, y0);
    let p10 = frame.pixel(x1, y0);
    let p01 = frame.pixel(x0, y1);
    let p11 = frame.pixel(x1, y1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = f32::from(p00[c]) * (1.0 - fx) + f32::from(p10[c]) * fx;
        let bottom = f32::from(p01[c]) * (1.0 - fx) + f32::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn rebuild(like: &Frame, data: Vec<u8>) -> Frame {
    Frame::from_rgb(like.width, like.height, data).unwrap_or_else(|_| like.clone())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
