//! Curve profiles: contiguous segment sequences with a total arc length.

use std::f64::consts::PI;

use kurbo::{PathEl, Shape};

use crate::curves::segment::{CurvePoint, Segment, safe_normalize};
use crate::foundation::core::{BezPath, Point, Rect, Vec2};

const SUBPATH_GAP: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct CurveProfile {
    pub segments: Vec<Segment>,
    pub arc_length: f64,
    /// Smallest `|sin(angle / 2)|` over the rounded corners; 1 when there are none.
    pub min_sin: f64,
    pub closed: bool,
}

impl Default for CurveProfile {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            arc_length: 0.0,
            min_sin: 1.0,
            closed: false,
        }
    }
}

impl CurveProfile {
    pub fn push(&mut self, segment: Segment) {
        self.arc_length += segment.arc_length();
        self.segments.push(segment);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Point at an absolute distance along the profile, clamped to `[0, arc_length]`.
    ///
    /// An empty profile yields a stationary point at the origin.
    pub fn get_point_at_distance(&self, distance: f64) -> CurvePoint {
        let Some(last) = self.segments.last() else {
            return CurvePoint::origin();
        };
        let distance = distance.clamp(0.0, self.arc_length);
        let mut walked = 0.0;
        for segment in &self.segments {
            let length = segment.arc_length();
            if walked + length >= distance {
                let local = if length > 0.0 {
                    (distance - walked) / length
                } else {
                    0.0
                };
                return segment.get_point(local);
            }
            walked += length;
        }
        last.get_point(1.0)
    }

    /// Point at an arc-length fraction of the whole profile.
    pub fn get_point_at_percentage(&self, t: f64) -> CurvePoint {
        self.get_point_at_distance(t * self.arc_length)
    }

    /// Path covering the fractions `start..end` of the profile.
    ///
    /// A full draw of a closed profile is closed; discontinuities between segments start new
    /// sub-paths.
    pub fn to_path(&self, start: f64, end: f64) -> BezPath {
        let mut path = BezPath::new();
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(start, 1.0);
        let from = start * self.arc_length;
        let to = end * self.arc_length;

        let mut walked = 0.0;
        let mut pen: Option<Point> = None;
        for segment in &self.segments {
            let length = segment.arc_length();
            let seg_start = walked;
            walked += length;
            if walked < from || seg_start > to {
                continue;
            }
            if length <= 0.0 {
                continue;
            }
            let local_from = ((from - seg_start) / length).clamp(0.0, 1.0);
            let local_to = ((to - seg_start) / length).clamp(0.0, 1.0);
            if local_to <= local_from && pen.is_some() {
                continue;
            }
            let first = segment.get_point(local_from).position;
            let move_to = pen.is_none_or(|p| p.distance(first) > SUBPATH_GAP);
            let (_, last) = segment.draw(&mut path, local_from, local_to, move_to);
            pen = Some(last.position);
        }
        if self.closed && start <= 0.0 && end >= 1.0 && pen.is_some() {
            path.close_path();
        }
        path
    }
}

/// Profile of a polyline with optionally rounded corners.
///
/// Closed polylines start and end in the middle of their closing edge so every vertex becomes
/// a corner. The corner radius is reduced so neighbouring roundings never overlap.
pub fn polyline_profile(points: &[Point], radius: f64, closed: bool) -> CurveProfile {
    let mut profile = CurveProfile {
        closed,
        ..CurveProfile::default()
    };
    if points.len() < 2 {
        return profile;
    }

    let mut points = points.to_vec();
    if closed {
        let middle = points[0].midpoint(points[points.len() - 1]);
        points.insert(0, middle);
        points.push(middle);
    }

    let mut last = points[0];
    for i in 2..points.len() {
        let start = points[i - 2];
        let center = points[i - 1];
        let end = points[i];

        let center_to_start = start - center;
        let center_to_end = end - center;
        let degenerate =
            center_to_start.hypot() <= f64::EPSILON || center_to_end.hypot() <= f64::EPSILON;
        let start_dir = safe_normalize(center_to_start);
        let end_dir = safe_normalize(center_to_end);
        let angle_between = start_dir.dot(end_dir).clamp(-1.0, 1.0).acos();
        let half = angle_between / 2.0;
        let tan = half.tan();
        let start_weight = if i == 2 { 1.0 } else { 0.5 };
        let end_weight = if i == points.len() - 1 { 1.0 } else { 0.5 };
        let safe_radius = radius
            .min(tan * center_to_start.hypot() * start_weight)
            .min(tan * center_to_end.hypot() * end_weight);

        let finite = !degenerate && safe_radius.is_finite() && safe_radius > 0.0;
        let circle_distance = if finite { safe_radius / half.sin() } else { 0.0 };
        let point_distance = if finite { safe_radius / tan } else { 0.0 };

        let circle_start = center + start_dir * point_distance;
        let circle_end = center + end_dir * point_distance;
        let bisector = safe_normalize(start_dir + end_dir);
        let circle_center = center + bisector * circle_distance;

        if !degenerate {
            profile.min_sin = profile.min_sin.min(half.sin().abs());
        }

        profile.push(Segment::line(last, circle_start));
        if finite {
            let cross = start_dir.cross(end_dir);
            let from = circle_start - circle_center;
            let to = circle_end - circle_center;
            let sweep = from.cross(to).atan2(from.dot(to));
            if cross.abs() > f64::EPSILON {
                profile.push(Segment::circle(
                    circle_center,
                    safe_radius,
                    from.atan2(),
                    sweep,
                ));
            }
        }
        last = circle_end;
    }
    profile.push(Segment::line(last, points[points.len() - 1]));
    profile
}

/// Rounded rectangle starting at the middle of the left edge.
pub fn rect_profile(rect: Rect, radius: f64) -> CurveProfile {
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    polyline_profile(&corners, radius, true)
}

/// Circle (or ellipse) inscribed in `rect`. Circles start at the top and run clockwise.
pub fn circle_profile(rect: Rect) -> CurveProfile {
    let radii = Vec2::new(rect.width().abs() / 2.0, rect.height().abs() / 2.0);
    if (radii.x - radii.y).abs() <= f64::EPSILON {
        let mut profile = CurveProfile {
            closed: true,
            ..CurveProfile::default()
        };
        if radii.x > 0.0 {
            profile.push(Segment::circle(rect.center(), radii.x, -PI / 2.0, 2.0 * PI));
        }
        return profile;
    }
    let mut profile = path_profile(&kurbo::Ellipse::from_rect(rect).to_path(0.1));
    profile.closed = true;
    profile
}

/// Profile of arbitrary path data. `ClosePath` adds the closing edge when it has length.
pub fn path_profile(path: &BezPath) -> CurveProfile {
    let mut profile = CurveProfile::default();
    let mut subpath_start = Point::ORIGIN;
    let mut pen = Point::ORIGIN;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                subpath_start = p;
                pen = p;
                profile.closed = false;
            }
            PathEl::LineTo(p) => {
                profile.push(Segment::line(pen, p));
                pen = p;
            }
            PathEl::QuadTo(p1, p2) => {
                profile.push(Segment::quad(pen, p1, p2));
                pen = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                profile.push(Segment::cubic(pen, p1, p2, p3));
                pen = p3;
            }
            PathEl::ClosePath => {
                if pen.distance(subpath_start) > SUBPATH_GAP {
                    profile.push(Segment::line(pen, subpath_start));
                }
                pen = subpath_start;
                profile.closed = true;
            }
        }
    }
    profile
}

#[cfg(test)]
#[path = "../../tests/unit/curves/profile.rs"]
mod tests;
