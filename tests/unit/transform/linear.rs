use super::*;

#[test]
fn remap_and_clamp_remap() {
    assert_eq!(remap(0.0, 1.0, 10.0, 20.0, 0.5), 15.0);
    assert_eq!(remap(0.0, 1.0, 10.0, 20.0, 2.0), 30.0);
    assert_eq!(clamp_remap(0.0, 1.0, 10.0, 20.0, 2.0), 20.0);
    // reversed output range
    assert_eq!(clamp_remap(0.0, 0.35, 1.0, 0.0, 0.0), 1.0);
    assert_eq!(clamp_remap(0.0, 0.35, 1.0, 0.0, 0.9), 0.0);
}

#[test]
fn lerp_vec2_clamps() {
    let a = Vec2::new(0.0, 0.0);
    let b = Vec2::new(10.0, -10.0);
    assert_eq!(lerp_vec2(a, b, 0.5), Vec2::new(5.0, -5.0));
    assert_eq!(lerp_vec2(a, b, 2.0), b);
    assert_eq!(map(2.0, 4.0, 0.25), 2.5);
}
