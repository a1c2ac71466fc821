//! Parametric curve segments.
//!
//! Every segment is parameterized by arc-length fraction: `get_point(0.5)` is halfway along the
//! curve, not at parameter 0.5. Normals are the tangent rotated by -90° (`(ty, -tx)`) for
//! every segment type.

use std::f64::consts::TAU;

use kurbo::{Arc, CubicBez, ParamCurve, ParamCurveArclen, ParamCurveDeriv, QuadBez};

use crate::foundation::core::{BezPath, Point, Vec2};

const ARCLEN_ACCURACY: f64 = 1e-3;
const ARC_TOLERANCE: f64 = 0.1;

/// Position plus unit tangent and normal at a point of a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    pub position: Point,
    pub tangent: Vec2,
    pub normal: Vec2,
}

impl CurvePoint {
    pub(crate) fn new(position: Point, direction: Vec2) -> Self {
        let tangent = safe_normalize(direction);
        Self {
            position,
            tangent,
            normal: Vec2::new(tangent.y, -tangent.x),
        }
    }

    /// Stationary point at the origin used for degenerate profiles.
    pub fn origin() -> Self {
        Self::new(Point::ORIGIN, Vec2::new(0.0, 1.0))
    }
}

pub(crate) fn safe_normalize(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > f64::EPSILON && len.is_finite() {
        v / len
    } else {
        Vec2::new(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineSegment {
    pub from: Point,
    pub to: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CircleSegment {
    pub center: Point,
    pub radius: f64,
    /// Angle of the start point, in radians.
    pub start_angle: f64,
    /// Signed sweep, in radians. Positive sweeps run clockwise on screen (y down).
    pub sweep: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuadSegment {
    pub curve: QuadBez,
    pub length: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CubicSegment {
    pub curve: CubicBez,
    pub length: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Line(LineSegment),
    Circle(CircleSegment),
    Quad(QuadSegment),
    Cubic(CubicSegment),
}

impl Segment {
    pub fn line(from: Point, to: Point) -> Self {
        Self::Line(LineSegment { from, to })
    }

    pub fn circle(center: Point, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self::Circle(CircleSegment {
            center,
            radius,
            start_angle,
            sweep: sweep.clamp(-TAU, TAU),
        })
    }

    pub fn quad(p0: Point, p1: Point, p2: Point) -> Self {
        let curve = QuadBez::new(p0, p1, p2);
        Self::Quad(QuadSegment {
            length: curve.arclen(ARCLEN_ACCURACY),
            curve,
        })
    }

    pub fn cubic(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        let curve = CubicBez::new(p0, p1, p2, p3);
        Self::Cubic(CubicSegment {
            length: curve.arclen(ARCLEN_ACCURACY),
            curve,
        })
    }

    pub fn arc_length(&self) -> f64 {
        match self {
            Self::Line(s) => s.from.distance(s.to),
            Self::Circle(s) => (s.radius * s.sweep).abs(),
            Self::Quad(s) => s.length,
            Self::Cubic(s) => s.length,
        }
    }

    pub fn start(&self) -> Point {
        self.get_point(0.0).position
    }

    pub fn end(&self) -> Point {
        self.get_point(1.0).position
    }

    /// Control points (or the arc's center) describing this segment.
    pub fn points(&self) -> Vec<Point> {
        match self {
            Self::Line(s) => vec![s.from, s.to],
            Self::Circle(s) => vec![self.start(), s.center, self.end()],
            Self::Quad(s) => vec![s.curve.p0, s.curve.p1, s.curve.p2],
            Self::Cubic(s) => vec![s.curve.p0, s.curve.p1, s.curve.p2, s.curve.p3],
        }
    }

    /// Point at arc-length fraction `t` in `[0, 1]`.
    pub fn get_point(&self, t: f64) -> CurvePoint {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Line(s) => CurvePoint::new(s.from.lerp(s.to, t), s.to - s.from),
            Self::Circle(s) => {
                let angle = s.start_angle + s.sweep * t;
                let position = s.center + Vec2::from_angle(angle) * s.radius;
                let direction = Vec2::new(-angle.sin(), angle.cos()) * s.sweep.signum();
                CurvePoint::new(position, direction)
            }
            Self::Quad(s) => {
                let u = param_at(&s.curve, s.length, t);
                CurvePoint::new(s.curve.eval(u), s.curve.deriv().eval(u).to_vec2())
            }
            Self::Cubic(s) => {
                let u = param_at(&s.curve, s.length, t);
                let mut direction = s.curve.deriv().eval(u).to_vec2();
                if direction.hypot() <= f64::EPSILON {
                    // Coincident control points: fall back to the chord direction.
                    direction = s.curve.p3 - s.curve.p0;
                }
                CurvePoint::new(s.curve.eval(u), direction)
            }
        }
    }

    /// Split at arc-length fraction `t`.
    pub fn split(&self, t: f64) -> (Segment, Segment) {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Line(s) => {
                let mid = s.from.lerp(s.to, t);
                (Self::line(s.from, mid), Self::line(mid, s.to))
            }
            Self::Circle(s) => (
                Self::circle(s.center, s.radius, s.start_angle, s.sweep * t),
                Self::circle(
                    s.center,
                    s.radius,
                    s.start_angle + s.sweep * t,
                    s.sweep * (1.0 - t),
                ),
            ),
            Self::Quad(s) => {
                let u = param_at(&s.curve, s.length, t);
                let a = s.curve.subsegment(0.0..u);
                let b = s.curve.subsegment(u..1.0);
                (Self::quad(a.p0, a.p1, a.p2), Self::quad(b.p0, b.p1, b.p2))
            }
            Self::Cubic(s) => {
                let u = param_at(&s.curve, s.length, t);
                let a = s.curve.subsegment(0.0..u);
                let b = s.curve.subsegment(u..1.0);
                (
                    Self::cubic(a.p0, a.p1, a.p2, a.p3),
                    Self::cubic(b.p0, b.p1, b.p2, b.p3),
                )
            }
        }
    }

    /// Append the part of the segment between fractions `start` and `end` to `path`.
    ///
    /// With `move_to` the sub-path is started at the first point; otherwise the path is assumed
    /// to already end there. Returns the curve points at both ends of the drawn part.
    pub fn draw(
        &self,
        path: &mut BezPath,
        start: f64,
        end: f64,
        move_to: bool,
    ) -> (CurvePoint, CurvePoint) {
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(start, 1.0);
        let first = self.get_point(start);
        let last = self.get_point(end);
        if move_to {
            path.move_to(first.position);
        }
        match self {
            Self::Line(_) => path.line_to(last.position),
            Self::Circle(s) => {
                let arc = Arc::new(
                    s.center,
                    (s.radius, s.radius),
                    s.start_angle + s.sweep * start,
                    s.sweep * (end - start),
                    0.0,
                );
                for el in arc.append_iter(ARC_TOLERANCE) {
                    path.push(el);
                }
            }
            Self::Quad(s) => {
                let u0 = param_at(&s.curve, s.length, start);
                let u1 = param_at(&s.curve, s.length, end);
                let part = s.curve.subsegment(u0..u1);
                path.quad_to(part.p1, part.p2);
            }
            Self::Cubic(s) => {
                let u0 = param_at(&s.curve, s.length, start);
                let u1 = param_at(&s.curve, s.length, end);
                let part = s.curve.subsegment(u0..u1);
                path.curve_to(part.p1, part.p2, part.p3);
            }
        }
        (first, last)
    }
}

fn param_at<C: ParamCurveArclen>(curve: &C, length: f64, t: f64) -> f64 {
    if t <= 0.0 || length <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    curve.inv_arclen(t * length, ARCLEN_ACCURACY)
}

#[cfg(test)]
#[path = "../../tests/unit/curves/segment.rs"]
mod tests;
