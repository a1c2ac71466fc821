use super::*;
use crate::animation::task::{Task, TaskStatus};
use crate::scene::registry::{Scene, SceneConfig};

fn keys(kind: NodeKind) -> Vec<&'static str> {
    properties_of(kind).map(|d| d.key).collect()
}

#[test]
fn node_properties_come_first() {
    let group = keys(NodeKind::Group);
    assert_eq!(group.len(), NODE_PROPERTIES.len());
    assert_eq!(group[0], "position");

    let rect = keys(NodeKind::Rect);
    assert_eq!(&rect[..group.len()], &group[..]);
    assert!(rect.contains(&"fill"));
    assert_eq!(rect.last(), Some(&"radius"));
    assert!(!keys(NodeKind::Circle).contains(&"radius"));
}

#[test]
fn lookup_by_key_respects_the_kind() {
    assert!(property_by_key(NodeKind::Line, "points").is_some());
    assert!(property_by_key(NodeKind::Rect, "points").is_none());
    assert!(property_by_key(NodeKind::Code, "fill").is_none());

    let hash = property_by_key(NodeKind::View, "asset_hash").unwrap();
    assert!(!hash.cloneable);
    assert!(property_by_key(NodeKind::View, "size").unwrap().cloneable);
}

#[test]
fn descriptors_reach_the_node_signals() {
    let scene = Scene::new(SceneConfig::default());
    let rect = Node::rect(&scene, Vec2::new(4.0, 2.0));
    let size = property_by_key(NodeKind::Rect, "size").unwrap();
    let signal = size.signal(&rect).unwrap();
    assert_eq!(signal.value(), PropValue::Vector(Vec2::new(4.0, 2.0)));

    assert!(signal.set_value(PropValue::Vector(Vec2::new(1.0, 1.0))));
    assert!(!signal.set_value(PropValue::Number(3.0)));
    let Element::Rect(data) = rect.element() else {
        panic!("expected a rect");
    };
    assert_eq!(data.style.size.get(), Vec2::new(1.0, 1.0));

    // A descriptor of another kind finds nothing on this node.
    let data_descriptor = property_by_key(NodeKind::Path, "data").unwrap();
    assert!(data_descriptor.signal(&rect).is_none());
}

#[test]
fn reactive_producers_are_converted() {
    let source = Signal::new(2.0);
    let target: Signal<f64> = Signal::new(0.0);
    let reader = source.clone();
    target.set_reactive(Rc::new(move || PropValue::Number(reader.get() * 10.0)));
    assert_eq!(target.get(), 20.0);
    source.set(3.0);
    assert_eq!(target.get(), 30.0);

    // A producer of the wrong variant falls back to the default value.
    target.set_reactive(Rc::new(|| PropValue::Flag(true)));
    assert_eq!(target.get(), 0.0);
}

#[test]
fn raw_values_copy_only_between_equal_types() {
    let source = Signal::new(Vec2::new(1.0, 2.0));
    let reader = source.clone();
    let mirrored: Signal<Vec2> = Signal::new(SignalValue::reactive(move || reader.get() * 2.0));
    let copy: Signal<Vec2> = Signal::new(Vec2::ZERO);
    assert!(copy.copy_raw_from(&mirrored));
    assert!(copy.is_reactive());
    source.set(Vec2::new(2.0, 2.0));
    assert_eq!(copy.get(), Vec2::new(4.0, 4.0));

    let number: Signal<f64> = Signal::new(0.0);
    assert!(!number.copy_raw_from(&copy));
}

#[test]
fn path_values_travel_as_svg_data() {
    let path = BezPath::from_svg("M0 0 L10 0").unwrap();
    let value = path.clone().into_prop();
    assert!(matches!(&value, PropValue::Path(data) if data.starts_with('M')));
    assert_eq!(BezPath::from_prop(value), Some(path));
    assert_eq!(BezPath::from_prop(PropValue::Path("not a path".to_owned())), None);
}

#[test]
fn code_values_resolve_the_scope() {
    let value = CodeScope::from("let a = 1;".to_owned()).into_prop();
    assert_eq!(value, PropValue::Code("let a = 1;".to_owned()));
    assert!(CodeScope::from_prop(PropValue::Text("x".to_owned())).is_none());
}

#[test]
fn prop_values_serialize_with_a_type_tag() {
    let json = serde_json::to_value(PropValue::Number(1.5)).unwrap();
    assert_eq!(json, serde_json::json!({"type": "number", "value": 1.5}));
    let back: PropValue =
        serde_json::from_value(serde_json::json!({"type": "flag", "value": true})).unwrap();
    assert_eq!(back, PropValue::Flag(true));
}

#[test]
fn tweens_are_typed_by_the_value() {
    let signal: Signal<f64> = Signal::new(0.0);
    assert!(signal.tween_to(PropValue::Flag(true), 1.0, Ease::Linear).is_none());

    let mut task = signal.tween_to(PropValue::Number(10.0), 1.0, Ease::Linear).unwrap();
    assert_eq!(task.advance(0.5), TaskStatus::Pending);
    assert_eq!(signal.get(), 5.0);
    assert_eq!(task.advance(0.5), TaskStatus::Done);
    assert_eq!(signal.get(), 10.0);
}

#[test]
fn descriptor_debug_omits_the_getter() {
    let text = format!("{:?}", NODE_PROPERTIES[0]);
    assert!(text.contains("position"));
    assert!(!text.contains("access"));
}
