use crate::foundation::error::{VignetteError, VignetteResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> VignetteResult<Self> {
        if den == 0 {
            return Err(VignetteError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VignetteError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        (secs * self.as_f64() - 1e-9).ceil().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

/// Per-edge spacing in CSS order (top, right, bottom, left).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Spacing {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Spacing {
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// Bounding-box helpers layered on top of [`Rect`].
///
/// Rects are treated as `(x, y, width, height)` boxes: an "empty" box is `Rect::ZERO`, which
/// still contributes the origin when its corners are unioned with other points.
pub trait BBox: Sized {
    fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Self;
    fn from_size_centered(size: Vec2) -> Self;
    fn corners(&self) -> [Point; 4];
    fn transform_corners(&self, m: Affine) -> [Point; 4];
    fn expand_by(&self, amount: f64) -> Self;
    fn add_spacing(&self, spacing: Spacing) -> Self;
    fn intersection(&self, other: &Self) -> Self;
    fn pixel_perfect(&self) -> Self;
    fn is_degenerate(&self) -> bool;
}

impl BBox for Rect {
    fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p))
    }

    fn from_size_centered(size: Vec2) -> Self {
        Rect::from_center_size(Point::ORIGIN, (size.x, size.y))
    }

    fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x1, self.y1),
            Point::new(self.x0, self.y1),
        ]
    }

    fn transform_corners(&self, m: Affine) -> [Point; 4] {
        self.corners().map(|p| m * p)
    }

    fn expand_by(&self, amount: f64) -> Self {
        self.add_spacing(Spacing::uniform(amount))
    }

    fn add_spacing(&self, spacing: Spacing) -> Self {
        Rect::new(
            self.x0 - spacing.left,
            self.y0 - spacing.top,
            self.x1 + spacing.right,
            self.y1 + spacing.bottom,
        )
    }

    fn intersection(&self, other: &Self) -> Self {
        let r = self.intersect(*other);
        if r.width() <= 0.0 || r.height() <= 0.0 {
            return Rect::ZERO;
        }
        r
    }

    fn pixel_perfect(&self) -> Self {
        let x = self.x0.floor();
        let y = self.y0.floor();
        Rect::new(
            x,
            y,
            x + (self.width() + 1.0).ceil(),
            y + (self.height() + 1.0).ceil(),
        )
    }

    fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
