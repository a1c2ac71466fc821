use super::*;

#[test]
fn numeric_and_vector_lerp() {
    assert_eq!(f64::lerp(&2.0, &4.0, 0.5), 3.0);
    assert_eq!(
        <Vec2 as Lerp>::lerp(&Vec2::new(0.0, 0.0), &Vec2::new(2.0, -2.0), 0.25),
        Vec2::new(0.5, -0.5)
    );
}

#[test]
fn discrete_values_switch_halfway() {
    assert!(!bool::lerp(&false, &true, 0.49));
    assert!(bool::lerp(&false, &true, 0.5));
    assert_eq!(String::lerp(&"a".into(), &"b".into(), 0.2), "a");
}

#[test]
fn missing_paint_fades_in() {
    let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
    let mid = <Option<Color>>::lerp(&None, &Some(red), 0.5).unwrap();
    assert_eq!(mid.r, 1.0);
    assert_eq!(mid.a, 0.5);
}

#[test]
fn point_lists_blend_only_when_aligned() {
    let a = Some(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    let b = Some(vec![Point::new(0.0, 10.0), Point::new(10.0, 10.0)]);
    let mid = <Option<Vec<Point>>>::lerp(&a, &b, 0.5).unwrap();
    assert_eq!(mid[1], Point::new(10.0, 5.0));

    let c = Some(vec![Point::new(1.0, 1.0)]);
    assert_eq!(<Option<Vec<Point>>>::lerp(&a, &c, 0.2), a);
}
