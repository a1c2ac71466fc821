use super::*;

fn triangle() -> Vec<Point> {
    vec![
        Point::new(0.0, -100.0),
        Point::new(87.0, 50.0),
        Point::new(-87.0, 50.0),
    ]
}

fn pentagon() -> Vec<Point> {
    (0..5)
        .map(|i| {
            let a = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::TAU / 5.0;
            Point::new(a.cos() * 100.0, a.sin() * 100.0)
        })
        .collect()
}

#[test]
fn distribute_hits_exact_count() {
    for count in [0, 1, 2, 5, 17, 100] {
        let mut points = triangle();
        distribute_points(&mut points, count);
        assert_eq!(points.len(), 3 + count);
    }
}

#[test]
fn distribute_handles_tiny_inputs() {
    let mut empty = Vec::new();
    distribute_points(&mut empty, 4);
    assert_eq!(empty, vec![Point::ORIGIN; 4]);

    let mut single = vec![Point::new(1.0, 2.0)];
    distribute_points(&mut single, 3);
    assert_eq!(single, vec![Point::new(1.0, 2.0); 4]);

    let mut stacked = vec![Point::new(5.0, 5.0); 2];
    distribute_points(&mut stacked, 3);
    assert_eq!(stacked.len(), 5);
}

#[test]
fn distribute_keeps_original_vertices() {
    let mut points = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
    distribute_points(&mut points, 3);
    assert_eq!(points.first(), Some(&Point::new(0.0, 0.0)));
    assert_eq!(points.last(), Some(&Point::new(100.0, 0.0)));
    assert!(points.windows(2).all(|w| w[0].x < w[1].x));
}

#[test]
fn distribute_survives_uneven_edges() {
    let mut points = vec![
        Point::new(0.0, 0.0),
        Point::new(0.1, 0.0),
        Point::new(0.2, 0.0),
        Point::new(0.3, 0.0),
        Point::new(1000.0, 0.0),
    ];
    distribute_points(&mut points, 1);
    assert_eq!(points.len(), 6);
}

#[test]
fn closed_rotation_picks_best_offset() {
    let reference = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let mut points = vec![reference[2], reference[3], reference[0], reference[1]];
    rotate_points(&mut points, &reference, true);
    assert_eq!(points, reference);
}

#[test]
fn open_rotation_only_reverses() {
    let reference = vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
    let mut points = vec![Point::new(10.0, 1.0), Point::new(5.0, 1.0), Point::new(0.0, 1.0)];
    rotate_points(&mut points, &reference, false);
    assert_eq!(points[0], Point::new(0.0, 1.0));
}

#[test]
fn triangle_to_pentagon_endpoints() {
    let lerp = PolylineLerp::new(&triangle(), &pentagon(), true);
    assert_eq!(lerp.from.len(), 5);
    assert_eq!(lerp.to.len(), 5);

    let start = lerp.points_at(0.0);
    assert_eq!(start, lerp.from);
    for p in triangle() {
        assert!(start.contains(&p));
    }

    let end = lerp.points_at(1.0);
    let target = pentagon();
    assert_eq!(end.len(), target.len());
    for p in &target {
        assert!(end.iter().any(|q| q.distance(*p) < 1e-9));
    }
}

#[test]
fn lerp_distance_wraps() {
    let a = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
    let b = vec![Point::new(1.0, 0.0), Point::new(0.0, 0.0)];
    assert_eq!(calculate_lerp_distance(&a, &b, 1), 0.0);
    assert_eq!(calculate_lerp_distance(&a, &b, 0), 2.0);
}

#[test]
fn profile_lerp_samples_both_sides() {
    let from = crate::curves::profile::rect_profile(
        crate::foundation::core::Rect::new(-50.0, -50.0, 50.0, 50.0),
        0.0,
    );
    let to = crate::curves::profile::circle_profile(crate::foundation::core::Rect::new(
        -50.0, -50.0, 50.0, 50.0,
    ));
    let lerp = create_curve_profile_lerp(&from, &to);
    assert!(lerp.closed);
    assert_eq!(lerp.from.len(), lerp.to.len());
    let mid = lerp.profile_at(0.5);
    assert!(mid.arc_length > 0.0);
}
