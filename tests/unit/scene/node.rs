use std::io::Cursor;

use super::*;
use crate::animation::task::{Task, TaskStatus};
use crate::assets::image_pool::ImagePool;
use crate::scene::registry::SceneConfig;

fn scene() -> Scene {
    Scene::new(SceneConfig::default())
}

fn close(a: Vec2, b: Vec2) -> bool {
    (a - b).hypot() < 1e-9
}

#[test]
fn constructors_pick_the_element() {
    let scene = scene();
    assert_eq!(Node::group(&scene).kind(), NodeKind::Group);
    assert_eq!(Node::circle(&scene, Vec2::new(1.0, 1.0)).kind(), NodeKind::Circle);
    assert_eq!(Node::path(&scene, BezPath::new()).kind(), NodeKind::Path);
    assert_eq!(Node::line(&scene, vec![Point::ORIGIN]).kind(), NodeKind::Line);
    assert_eq!(Node::img(&scene, "a.png").kind(), NodeKind::Img);
    assert_eq!(Node::code(&scene, "x".to_owned()).kind(), NodeKind::Code);
    assert_eq!(Node::svg(&scene, "").kind(), NodeKind::Svg);

    let rect = Node::rect(&scene, Vec2::new(3.0, 4.0));
    let Element::Rect(data) = rect.element() else {
        panic!("expected a rect");
    };
    assert_eq!(data.style.size.get(), Vec2::new(3.0, 4.0));
    assert!(!data.style.size.is_initial());
}

#[test]
fn equality_is_identity() {
    let scene = scene();
    let a = Node::group(&scene);
    let b = Node::group(&scene);
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert!(a.ptr_eq(&a.clone()));
    assert_eq!(a.downgrade().upgrade(), Some(a.clone()));
    assert_eq!(a.scene().map(|s| s.node_count()), Some(3));
}

#[test]
fn world_matrix_composes_parents() {
    let scene = scene();
    let parent = Node::group(&scene);
    let child = Node::group(&scene);
    parent.add(child.clone());
    parent.position().set(Vec2::new(10.0, 0.0));
    parent.scale().set(Vec2::new(2.0, 2.0));
    child.position().set(Vec2::new(5.0, 5.0));

    assert_eq!(child.parent(), Some(parent.clone()));
    assert!(close(child.absolute_position(), Vec2::new(20.0, 10.0)));
    assert_eq!(child.parent_to_world(), parent.local_to_world());

    parent.position().set(Vec2::new(0.0, 0.0));
    assert!(close(child.absolute_position(), Vec2::new(10.0, 10.0)));
    let back = child.world_to_local() * Point::new(10.0, 10.0);
    assert!((back - Point::ORIGIN).hypot() < 1e-9);
}

#[test]
fn absolute_setters_invert_the_parent() {
    let scene = scene();
    let parent = Node::group(&scene);
    let child = Node::group(&scene);
    parent.add(child.clone());
    parent.position().set(Vec2::new(100.0, 0.0));
    parent.rotation().set(90.0);
    parent.scale().set(Vec2::new(2.0, 2.0));

    child.set_absolute_position(Vec2::new(100.0, 20.0));
    assert!(close(child.absolute_position(), Vec2::new(100.0, 20.0)));

    child.set_absolute_rotation(45.0);
    assert!((child.absolute_rotation() - 45.0).abs() < 1e-9);
    assert!((child.rotation().get() + 45.0).abs() < 1e-9);

    child.set_absolute_scale(Vec2::new(1.0, 1.0));
    assert!(close(child.scale().get(), Vec2::new(0.5, 0.5)));
    assert!(close(child.absolute_scale(), Vec2::new(1.0, 1.0)));
}

#[test]
fn reactive_absolute_position_tracks_the_parent() {
    let scene = scene();
    let parent = Node::group(&scene);
    let child = Node::group(&scene);
    parent.add(child.clone());

    let target = Signal::new(Vec2::new(10.0, 10.0));
    let reader = target.clone();
    child.set_absolute_position(SignalValue::reactive(move || reader.get()));
    assert!(close(child.absolute_position(), Vec2::new(10.0, 10.0)));

    parent.position().set(Vec2::new(4.0, 0.0));
    assert!(close(child.absolute_position(), Vec2::new(10.0, 10.0)));
    assert!(close(child.position().get(), Vec2::new(6.0, 10.0)));

    target.set(Vec2::new(0.0, 0.0));
    assert!(close(child.absolute_position(), Vec2::ZERO));
}

#[test]
fn opacity_is_clamped_and_multiplied() {
    let scene = scene();
    let parent = Node::group(&scene);
    let child = Node::group(&scene);
    parent.add(child.clone());

    child.opacity().set(2.0);
    assert_eq!(child.opacity().get(), 1.0);
    parent.opacity().set(0.5);
    child.opacity().set(0.5);
    assert_eq!(child.absolute_opacity(), 0.25);
    child.opacity().set(-1.0);
    assert_eq!(child.absolute_opacity(), 0.0);
}

#[test]
fn composite_root_is_the_nearest_flagged_ancestor() {
    let scene = scene();
    let outer = Node::group(&scene);
    let inner = Node::group(&scene);
    let leaf = Node::group(&scene);
    outer.add(inner.clone());
    inner.add(leaf.clone());
    assert_eq!(leaf.composite_root(), None);
    assert_eq!(leaf.composite_to_world(), Affine::IDENTITY);

    outer.composite().set(true);
    assert_eq!(leaf.composite_root(), Some(outer.clone()));
    inner.composite().set(true);
    inner.position().set(Vec2::new(3.0, 0.0));
    assert_eq!(leaf.composite_root(), Some(inner.clone()));
    assert_eq!(leaf.composite_to_world(), inner.local_to_world());
}

#[test]
fn composite_operation_crossfades() {
    let scene = scene();
    let node = Node::group(&scene);

    let mut task = node.tween_composite_operation(CompositeOp::Multiply, 1.0, Ease::Linear);
    assert_eq!(task.advance(0.0), TaskStatus::Pending);
    assert_eq!(node.composite_operation().get(), CompositeOp::Multiply);
    assert_eq!(node.composite_override().get(), 1.0);
    assert_eq!(task.advance(1.0), TaskStatus::Done);
    assert_eq!(node.composite_override().get(), 0.0);

    let mut back = node.tween_composite_operation(CompositeOp::SourceOver, 1.0, Ease::Linear);
    back.advance(0.5);
    assert_eq!(node.composite_operation().get(), CompositeOp::Multiply);
    assert_eq!(node.composite_override().get(), 0.5);
    assert_eq!(back.advance(0.5), TaskStatus::Done);
    assert_eq!(node.composite_operation().get(), CompositeOp::SourceOver);
    assert_eq!(node.composite_override().get(), 0.0);
}

#[test]
fn dispose_is_idempotent_and_recursive() {
    let scene = scene();
    let parent = Node::group(&scene);
    let child = Node::rect(&scene, Vec2::new(1.0, 1.0));
    parent.add(child.clone());
    assert_eq!(scene.node_count(), 3);

    parent.dispose();
    assert!(parent.is_disposed());
    assert!(child.is_disposed());
    assert_eq!(scene.node_count(), 1);
    parent.dispose();
    assert_eq!(scene.node_count(), 1);
}

#[test]
fn disposed_nodes_keep_their_last_values() {
    let scene = scene();
    let node = Node::group(&scene);
    node.position().set(Vec2::new(1.0, 2.0));
    let matrix = node.local_to_parent();
    node.dispose();
    assert_eq!(node.position().get(), Vec2::new(1.0, 2.0));
    assert_eq!(node.local_to_parent(), matrix);
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 255, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn to_ready_loads_every_image_in_the_subtree() {
    let pool = ImagePool::with_loader(".", "", Box::new(|_key: &str| Ok(png(3, 2))));
    let scene = Scene::with_image_pool(SceneConfig::default(), pool);
    let group = Node::group(&scene);
    let a = Node::img(&scene, "a.png");
    let b = Node::img(&scene, "b.png");
    group.add_all([a.clone(), b]);

    assert_eq!(group.to_ready(), 2);
    assert!(!scene.image_pool().has_pending());
    let Element::Img(data) = a.element() else {
        panic!("expected an image");
    };
    assert_eq!(data.computed_size(&a), Vec2::new(3.0, 2.0));
    assert_eq!(group.to_ready(), 0);
}

#[test]
fn debug_shows_key_and_kind() {
    let scene = scene();
    let node = Node::create(&scene, Element::Group, Some("hello"));
    let text = format!("{node:?}");
    assert!(text.contains("hello"));
    assert!(text.contains("Group"));
}
