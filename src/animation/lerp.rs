use crate::foundation::color::Color;
use crate::foundation::core::{BezPath, Point, Spacing, Vec2};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

/// Discrete switch at the halfway point, used by values that cannot be blended.
pub(crate) fn step<T: Clone>(a: &T, b: &T, t: f64) -> T {
    if t < 0.5 { a.clone() } else { b.clone() }
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }
}

impl Lerp for bool {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}

impl Lerp for String {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}

impl Lerp for BezPath {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}

impl Lerp for Spacing {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Spacing {
            top: f64::lerp(&a.top, &b.top, t),
            right: f64::lerp(&a.right, &b.right, t),
            bottom: f64::lerp(&a.bottom, &b.bottom, t),
            left: f64::lerp(&a.left, &b.left, t),
        }
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Color::rgba(
            f64::lerp(&a.r, &b.r, t),
            f64::lerp(&a.g, &b.g, t),
            f64::lerp(&a.b, &b.b, t),
            f64::lerp(&a.a, &b.a, t),
        )
    }
}

/// A missing paint fades as a transparent copy of the other side.
impl Lerp for Option<Color> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (None, None) => None,
            (Some(a), None) => Some(Color::lerp(a, &a.with_alpha(0.0), t)),
            (None, Some(b)) => Some(Color::lerp(&b.with_alpha(0.0), b, t)),
            (Some(a), Some(b)) => Some(Color::lerp(a, b, t)),
        }
    }
}

impl Lerp for Option<String> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}

impl Lerp for Option<f64> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Some(a), Some(b)) => Some(f64::lerp(a, b, t)),
            _ => step(a, b, t),
        }
    }
}

/// Same-length point lists are blended pairwise; anything else switches halfway.
impl Lerp for Option<Vec<Point>> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Some(a), Some(b)) if a.len() == b.len() => Some(
                a.iter()
                    .zip(b.iter())
                    .map(|(p, q)| p.lerp(*q, t))
                    .collect(),
            ),
            _ => step(a, b, t),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/lerp.rs"]
mod tests;
