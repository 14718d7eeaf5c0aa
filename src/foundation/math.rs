/// Linear interpolation between two 8-bit channel values, `a * (1 - t) + b * t`.
///
/// `t` is clamped to `[0, 1]`; `t == 0` returns `a` and `t == 1` returns `b` exactly.
pub(crate) fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let t = t.clamp(0.0, 1.0);
    let v = f32::from(a) * (1.0 - t) + f32::from(b) * t;
    v.round().clamp(0.0, 255.0) as u8
}
