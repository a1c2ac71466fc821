//! Affine transform helpers.
//!
//! Angles are expressed in degrees at this boundary, matching node `rotation`/`skew` signals.

use crate::foundation::core::{Affine, Point, Vec2};

/// Build the local-to-parent matrix: `translate · rotate · scale · skewX · skewY`.
pub fn local_matrix(position: Vec2, rotation_deg: f64, scale: Vec2, skew_deg: Vec2) -> Affine {
    Affine::translate(position)
        * Affine::rotate(rotation_deg.to_radians())
        * Affine::scale_non_uniform(scale.x, scale.y)
        * Affine::skew(skew_deg.x.to_radians().tan(), 0.0)
        * Affine::skew(0.0, skew_deg.y.to_radians().tan())
}

/// Apply only the linear part of `m` to a direction vector.
#[inline]
pub fn transform_vector(m: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = m.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

#[inline]
pub fn transform_point(m: Affine, p: Vec2) -> Vec2 {
    (m * p.to_point()).to_vec2()
}

/// Rotation encoded in `m`, in degrees.
#[inline]
pub fn rotation_degrees(m: Affine) -> f64 {
    let [a, b, _, _, _, _] = m.as_coeffs();
    b.atan2(a).to_degrees()
}

/// Column magnitudes of the linear part of `m`.
#[inline]
pub fn scale_of(m: Affine) -> Vec2 {
    let [a, b, c, d, _, _] = m.as_coeffs();
    Vec2::new(a.hypot(b), c.hypot(d))
}

/// Map an angle (degrees) through the linear part of `m`.
pub fn transform_angle(angle_deg: f64, m: Affine) -> f64 {
    let dir = Vec2::from_angle(angle_deg.to_radians());
    let mapped = transform_vector(m, dir);
    mapped.y.atan2(mapped.x).to_degrees()
}

/// Scale a scalar length (blur radius, line width) by the x-axis magnitude of `m`.
#[inline]
pub fn transform_scalar(value: f64, m: Affine) -> f64 {
    let [a, b, _, _, _, _] = m.as_coeffs();
    a.hypot(b) * value
}

/// Position, rotation (degrees) and scale recovered from a matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    pub position: Vec2,
    pub rotation: f64,
    pub scale: Vec2,
}

/// Decompose `m`. A negative determinant is attributed to the axis with the smaller diagonal
/// entry, so mirrored SVG elements keep a sensible rotation.
pub fn decompose(m: Affine) -> Decomposed {
    let [a, b, c, d, e, f] = m.as_coeffs();
    let mut scale = scale_of(m);
    if a * d - b * c < 0.0 {
        if a < d {
            scale.x = -scale.x;
        } else {
            scale.y = -scale.y;
        }
    }
    Decomposed {
        position: Vec2::new(e, f),
        rotation: b.atan2(a).to_degrees(),
        scale,
    }
}

#[inline]
pub fn origin_of(m: Affine) -> Point {
    m * Point::ORIGIN
}

#[cfg(test)]
#[path = "../../tests/unit/transform/affine.rs"]
mod tests;
