//! Linear interpolation and range remapping helpers.

use crate::foundation::core::Vec2;

#[inline]
/// Linearly interpolate between two vectors with clamped parameter `t`.
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    let t = t.clamp(0.0, 1.0);
    Vec2::new(a.x + ((b.x - a.x) * t), a.y + ((b.y - a.y) * t))
}

#[inline]
/// Unclamped `from + (to - from) * t`.
pub fn map(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Remap `value` from `[from_in, to_in]` onto `[from_out, to_out]` without clamping.
pub fn remap(from_in: f64, to_in: f64, from_out: f64, to_out: f64, value: f64) -> f64 {
    if to_in == from_in {
        return to_out;
    }
    from_out + (value - from_in) * (to_out - from_out) / (to_in - from_in)
}

/// Like [`remap`], with the result clamped to the output range (either orientation).
pub fn clamp_remap(from_in: f64, to_in: f64, from_out: f64, to_out: f64, value: f64) -> f64 {
    let v = remap(from_in, to_in, from_out, to_out, value);
    if from_out < to_out {
        v.clamp(from_out, to_out)
    } else {
        v.clamp(to_out, from_out)
    }
}

#[inline]
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/linear.rs"]
mod tests;
