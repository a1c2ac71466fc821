use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn local_matrix_composes_in_fixed_order() {
    let m = local_matrix(Vec2::new(10.0, 5.0), 90.0, Vec2::new(2.0, 1.0), Vec2::ZERO);
    let p = m * Point::new(1.0, 0.0);
    // scale x2, rotate 90°, then translate
    assert!(close(p.x, 10.0));
    assert!(close(p.y, 7.0));
}

#[test]
fn skew_x_shears_along_x() {
    let m = local_matrix(Vec2::ZERO, 0.0, Vec2::new(1.0, 1.0), Vec2::new(45.0, 0.0));
    let p = m * Point::new(0.0, 1.0);
    assert!(close(p.x, 1.0));
    assert!(close(p.y, 1.0));
}

#[test]
fn rotation_and_scale_extraction() {
    let m = local_matrix(Vec2::ZERO, 30.0, Vec2::new(3.0, 4.0), Vec2::ZERO);
    assert!(close(rotation_degrees(m), 30.0));
    let s = scale_of(m);
    assert!(close(s.x, 3.0));
    assert!(close(s.y, 4.0));
    assert!(close(transform_scalar(2.0, m), 6.0));
}

#[test]
fn transform_angle_respects_rotation() {
    let m = Affine::rotate(45f64.to_radians());
    assert!(close(transform_angle(10.0, m), 55.0));
}

#[test]
fn decompose_flips_one_axis_for_mirrors() {
    let m = Affine::new([-2.0, 0.0, 0.0, 3.0, 5.0, 6.0]);
    let d = decompose(m);
    assert_eq!(d.position, Vec2::new(5.0, 6.0));
    assert!(close(d.scale.x, -2.0));
    assert!(close(d.scale.y, 3.0));
}
