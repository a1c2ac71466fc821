//! Morphing between polylines and profiles with different point counts.
//!
//! The shorter polyline is densified with [`distribute_points`], the longer one is rotated
//! with [`rotate_points`] so its vertices line up with the reference, and the two are then
//! blended pairwise.

use crate::curves::profile::{CurveProfile, polyline_profile};
use crate::foundation::core::Point;

/// Spacing (in pixels) between samples when flattening a profile for morphing.
const SAMPLE_SPACING: f64 = 4.0;
const MIN_SAMPLES: usize = 16;
const MAX_SAMPLES: usize = 512;

pub fn polygon_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Sum of distances between `reference[i]` and `points[i + offset]`, with wrap-around.
pub fn calculate_lerp_distance(points: &[Point], reference: &[Point], offset: usize) -> f64 {
    let n = points.len();
    if n == 0 {
        return 0.0;
    }
    reference
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, r)| r.distance(points[(i + offset) % n]))
        .sum()
}

/// Pairwise blend. The endpoints return the inputs unchanged.
pub fn polygon_points_lerp(from: &[Point], to: &[Point], t: f64) -> Vec<Point> {
    if t <= 0.0 {
        return from.to_vec();
    }
    if t >= 1.0 {
        return to.to_vec();
    }
    from.iter().zip(to).map(|(a, b)| a.lerp(*b, t)).collect()
}

/// Insert exactly `count` points into `points`, spread proportionally to segment length.
///
/// Each pass walks the polyline handing out points at the current density; when the walk
/// ends short of the target the density is recomputed from what is still missing. A pass that
/// inserts nothing splits the longest edge instead, so the loop always terminates.
pub fn distribute_points(points: &mut Vec<Point>, count: usize) {
    if count == 0 {
        return;
    }
    if points.is_empty() {
        points.resize(count, Point::ORIGIN);
        return;
    }
    if points.len() == 1 {
        let p = points[0];
        points.resize(count + 1, p);
        return;
    }

    let desired = points.len() + count;
    let arc_length = polygon_length(points);
    if arc_length <= 0.0 || !arc_length.is_finite() {
        let p = points[points.len() - 1];
        points.resize(desired, p);
        return;
    }

    let mut density = count as f64 / arc_length;
    let mut i = 0;
    let mut inserted = false;
    while points.len() < desired {
        let left = desired - points.len();
        if i + 1 >= points.len() {
            if !inserted {
                split_longest_edge(points);
            }
            density = (desired - points.len()) as f64 / arc_length;
            i = 0;
            inserted = false;
            continue;
        }

        let a = points[i];
        let b = points[i + 1];
        let share = (a.distance(b) * density).round() as usize;
        let point_count = share.min(left) + 1;
        for j in 1..point_count {
            i += 1;
            points.insert(i, a.lerp(b, j as f64 / point_count as f64));
            inserted = true;
        }
        i += 1;
    }
}

fn split_longest_edge(points: &mut Vec<Point>) {
    let mut longest = 0;
    let mut longest_len = -1.0;
    for (i, w) in points.windows(2).enumerate() {
        let len = w[0].distance(w[1]);
        if len > longest_len {
            longest = i;
            longest_len = len;
        }
    }
    let mid = points[longest].midpoint(points[longest + 1]);
    points.insert(longest + 1, mid);
}

/// Reorder `points` so they line up with `reference` as closely as possible.
///
/// Closed polygons try every cyclic offset; open polylines are compared as-is and reversed.
pub fn rotate_points(points: &mut Vec<Point>, reference: &[Point], closed: bool) {
    let n = points.len();
    if n < 2 {
        return;
    }
    if closed {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for offset in 0..n {
            let distance = calculate_lerp_distance(points, reference, offset);
            if distance < best_distance {
                best = offset;
                best_distance = distance;
            }
        }
        points.rotate_left(best);
    } else {
        let forward = calculate_lerp_distance(points, reference, 0);
        let reversed: Vec<Point> = points.iter().rev().copied().collect();
        if calculate_lerp_distance(&reversed, reference, 0) < forward {
            *points = reversed;
        }
    }
}

/// Sample `count` points uniformly by arc length. Closed profiles do not repeat the start.
pub fn sample_profile(profile: &CurveProfile, count: usize) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let divisions = if profile.closed {
        count as f64
    } else {
        (count.max(2) - 1) as f64
    };
    (0..count)
        .map(|i| {
            profile
                .get_point_at_distance(profile.arc_length * i as f64 / divisions)
                .position
        })
        .collect()
}

fn sample_count(profile: &CurveProfile) -> usize {
    ((profile.arc_length / SAMPLE_SPACING).ceil() as usize).clamp(MIN_SAMPLES, MAX_SAMPLES)
}

/// Point-wise morph between two polylines of equal length.
#[derive(Clone, Debug, PartialEq)]
pub struct PolylineLerp {
    pub from: Vec<Point>,
    pub to: Vec<Point>,
    pub closed: bool,
}

impl PolylineLerp {
    /// Equalize point counts and align `to` with `from`.
    pub fn new(from: &[Point], to: &[Point], closed: bool) -> Self {
        let mut from = from.to_vec();
        let mut to = to.to_vec();
        if from.len() < to.len() {
            let missing = to.len() - from.len();
            distribute_points(&mut from, missing);
        } else if to.len() < from.len() {
            let missing = from.len() - to.len();
            distribute_points(&mut to, missing);
        }
        rotate_points(&mut to, &from, closed);
        Self { from, to, closed }
    }

    pub fn points_at(&self, t: f64) -> Vec<Point> {
        polygon_points_lerp(&self.from, &self.to, t)
    }

    pub fn profile_at(&self, t: f64) -> CurveProfile {
        polyline_profile(&self.points_at(t), 0.0, self.closed)
    }
}

/// Morph between two arbitrary profiles by sampling both into polylines.
///
/// The result is closed only when both inputs are closed.
pub fn create_curve_profile_lerp(from: &CurveProfile, to: &CurveProfile) -> PolylineLerp {
    let closed = from.closed && to.closed;
    let from_points = sample_profile(from, sample_count(from));
    let to_points = sample_profile(to, sample_count(to));
    PolylineLerp::new(&from_points, &to_points, closed)
}

#[cfg(test)]
#[path = "../../tests/unit/curves/interpolate.rs"]
mod tests;
