//! Small numeric helpers shared by the rendering paths.

/// Clamp a floating channel value into 0..=255 with rounding.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Linear interpolation between `a` and `b`.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    t.mul_add(b - a, a)
}
