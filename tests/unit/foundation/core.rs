use super::*;

#[test]
fn fps_frame_math() {
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
    assert_eq!(fps.secs_to_frames_ceil(1.0), 30);
    assert_eq!(fps.secs_to_frames_ceil(1.01), 31);
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(0, 1).is_err());
}

#[test]
fn bbox_from_points_and_empty() {
    let r = Rect::bounding([
        Point::new(3.0, -1.0),
        Point::new(-2.0, 4.0),
        Point::new(0.0, 0.0),
    ]);
    assert_eq!(r, Rect::new(-2.0, -1.0, 3.0, 4.0));
    assert_eq!(Rect::bounding(std::iter::empty::<Point>()), Rect::ZERO);
}

#[test]
fn bbox_spacing_and_intersection() {
    let r = Rect::from_size_centered(Vec2::new(10.0, 20.0));
    assert_eq!(r, Rect::new(-5.0, -10.0, 5.0, 10.0));

    let padded = r.add_spacing(Spacing {
        top: 1.0,
        right: 2.0,
        bottom: 3.0,
        left: 4.0,
    });
    assert_eq!(padded, Rect::new(-9.0, -11.0, 7.0, 13.0));

    let other = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(r.intersection(&other), Rect::new(0.0, 0.0, 5.0, 10.0));
    assert_eq!(
        r.intersection(&Rect::new(50.0, 50.0, 60.0, 60.0)),
        Rect::ZERO
    );
}

#[test]
fn pixel_perfect_rounds_outwards() {
    let r = Rect::new(0.4, 1.6, 10.2, 3.0);
    let p = r.pixel_perfect();
    assert_eq!(p.x0, 0.0);
    assert_eq!(p.y0, 1.0);
    assert_eq!(p.width(), 11.0);
    assert_eq!(p.height(), 3.0);
}

#[test]
fn corners_follow_transform() {
    let r = Rect::new(0.0, 0.0, 2.0, 1.0);
    let moved = r.transform_corners(Affine::translate((10.0, 0.0)));
    assert_eq!(moved[0], Point::new(10.0, 0.0));
    assert_eq!(moved[2], Point::new(12.0, 1.0));
}
