use super::*;
use crate::animation::task::{Task, TaskStatus};
use crate::foundation::color::Color;
use crate::scene::registry::{Scene, SceneConfig};
use crate::signal::signal::{Signal, SignalValue};

fn scene() -> Scene {
    Scene::new(SceneConfig::default())
}

fn rect_data(node: &Node) -> &crate::scene::element::RectData {
    match node.element() {
        Element::Rect(rect) => rect,
        _ => panic!("expected a rect"),
    }
}

#[test]
fn instantiate_yields_a_blank_node_of_the_same_kind() {
    let scene = scene();
    let rect = Node::rect(&scene, Vec2::new(4.0, 4.0));
    rect.add(Node::group(&scene));
    let blank = rect.instantiate().unwrap();
    assert_eq!(blank.kind(), NodeKind::Rect);
    assert!(blank.children().is_empty());
    assert_eq!(rect_data(&blank).style.size.get(), Vec2::ZERO);
    assert!(blank.position().is_initial());

    let view = scene.get_view();
    assert!(matches!(view.instantiate(), Err(VignetteError::Validation(_))));
}

#[test]
fn clone_copies_explicit_values_and_children() {
    let scene = scene();
    let rect = Node::rect(&scene, Vec2::new(4.0, 2.0));
    rect.position().set(Vec2::new(3.0, 0.0));
    rect_data(&rect).radius.set(1.5);
    let child = Node::circle(&scene, Vec2::new(1.0, 1.0));
    child.opacity().set(0.5);
    rect.add(child);

    let copy = rect.clone_node().unwrap();
    assert_ne!(copy, rect);
    assert_ne!(copy.key(), rect.key());
    assert_eq!(copy.position().get(), Vec2::new(3.0, 0.0));
    assert!(copy.rotation().is_initial());
    assert_eq!(rect_data(&copy).radius.get(), 1.5);
    assert_eq!(rect_data(&copy).style.size.get(), Vec2::new(4.0, 2.0));

    let children = copy.children();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].kind(), NodeKind::Circle);
    assert_eq!(children[0].opacity().get(), 0.5);
    assert_eq!(children[0].parent(), Some(copy));
}

#[test]
fn clone_shares_reactive_producers() {
    let scene = scene();
    let source = Node::group(&scene);
    let driver = Signal::new(1.0);
    let reader = driver.clone();
    source.rotation().set(SignalValue::reactive(move || reader.get() * 10.0));

    let copy = source.clone_node().unwrap();
    assert_eq!(copy.rotation().get(), 10.0);
    driver.set(2.0);
    assert_eq!(copy.rotation().get(), 20.0);
}

#[test]
fn clone_with_overrides_takes_precedence() {
    let scene = scene();
    let node = Node::group(&scene);
    node.position().set(Vec2::new(1.0, 1.0));
    let mut overrides = NodeState::new();
    overrides.insert("position".to_owned(), PropValue::Vector(Vec2::new(9.0, 9.0)));
    let copy = node.clone_with(&overrides).unwrap();
    assert_eq!(copy.position().get(), Vec2::new(9.0, 9.0));
}

#[test]
fn snapshot_clone_freezes_reactive_values() {
    let scene = scene();
    let source = Node::group(&scene);
    let driver = Signal::new(1.0);
    let reader = driver.clone();
    source.opacity().set(SignalValue::reactive(move || reader.get() / 2.0));

    let copy = source.snapshot_clone().unwrap();
    driver.set(2.0);
    assert_eq!(source.opacity().get(), 1.0);
    assert_eq!(copy.opacity().get(), 0.5);
}

#[test]
fn reactive_clone_mirrors_the_source() {
    let scene = scene();
    let source = Node::rect(&scene, Vec2::new(2.0, 2.0));
    let copy = source.reactive_clone().unwrap();
    source.position().set(Vec2::new(7.0, 0.0));
    rect_data(&source).style.fill.set(Some(Color::WHITE));
    assert_eq!(copy.position().get(), Vec2::new(7.0, 0.0));
    assert_eq!(rect_data(&copy).style.fill.get(), Some(Color::WHITE));
    assert_eq!(rect_data(&copy).style.size.get(), Vec2::new(2.0, 2.0));
}

#[test]
fn state_round_trips_through_apply() {
    let scene = scene();
    let a = Node::rect(&scene, Vec2::new(5.0, 5.0));
    a.rotation().set(45.0);
    let state = a.get_state();
    assert_eq!(state.get("rotation"), Some(&PropValue::Number(45.0)));
    assert!(state.contains_key("radius"));

    let b = Node::rect(&scene, Vec2::ZERO);
    b.apply_state(&state);
    assert_eq!(b.get_state(), state);
}

#[test]
fn unknown_state_entries_are_skipped() {
    let scene = scene();
    let node = Node::group(&scene);
    let mut state = NodeState::new();
    state.insert("radius".to_owned(), PropValue::Number(3.0));
    state.insert("rotation".to_owned(), PropValue::Flag(true));
    state.insert("z_index".to_owned(), PropValue::Number(2.0));
    node.apply_state(&state);
    assert_eq!(node.z_index().get(), 2.0);
    assert_eq!(node.rotation().get(), 0.0);
}

#[test]
fn state_tween_only_touches_changed_properties() {
    let scene = scene();
    let node = Node::group(&scene);
    let mut state = node.get_state();
    state.insert("rotation".to_owned(), PropValue::Number(90.0));

    let mut task = node.apply_state_tween(&state, 1.0, Ease::Linear);
    assert_eq!(task.advance(0.5), TaskStatus::Pending);
    assert_eq!(node.rotation().get(), 45.0);
    assert!(node.position().is_initial());
    assert_eq!(task.advance(0.5), TaskStatus::Done);
    assert_eq!(node.rotation().get(), 90.0);
}

#[test]
fn save_and_restore_use_a_stack() {
    let scene = scene();
    let node = Node::group(&scene);
    node.save();
    node.position().set(Vec2::new(5.0, 0.0));
    node.save();
    node.position().set(Vec2::new(9.0, 0.0));

    node.restore();
    assert_eq!(node.position().get(), Vec2::new(5.0, 0.0));
    let mut task = node.restore_tween(1.0, Ease::Linear).unwrap();
    task.advance(0.5);
    assert_eq!(node.position().get(), Vec2::new(2.5, 0.0));
    task.advance(0.5);
    assert_eq!(node.position().get(), Vec2::ZERO);
    assert!(node.restore_tween(1.0, Ease::Linear).is_none());
    node.restore();
}

#[test]
fn state_serializes_to_json() {
    let scene = scene();
    let node = Node::group(&scene);
    node.opacity().set(0.25);
    let json: serde_json::Value = serde_json::from_str(&node.state_json().unwrap()).unwrap();
    assert_eq!(json["opacity"], serde_json::json!({"type": "number", "value": 0.25}));
}
