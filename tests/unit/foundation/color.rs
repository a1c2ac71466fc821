use super::*;

#[test]
fn parses_css_forms() {
    assert_eq!(Color::parse("#ff0000").unwrap(), Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(Color::parse("white").unwrap(), Color::WHITE);
    let c = Color::parse("rgba(0, 0, 255, 0.5)").unwrap();
    assert_eq!(c.to_rgba8()[2], 255);
    assert!((c.a - 128.0 / 255.0).abs() < 0.01);
}

#[test]
fn rejects_garbage() {
    assert!(matches!(
        Color::parse("not a color"),
        Err(VignetteError::Parse(_))
    ));
}

#[test]
fn css_serialization_is_stable() {
    assert_eq!(
        Color::rgba(1.0, 0.5, 0.0, 1.0).serialize_css(),
        "rgba(255, 128, 0, 1)"
    );
}
