use super::*;
use crate::foundation::color::Color;
use crate::foundation::core::{Spacing, Vec2};
use crate::foundation::error::VignetteError;
use crate::render::effects::{Filter, Shader};
use crate::render::recording::{DrawCommand, RecordingContext};
use crate::scene::registry::{Scene, SceneConfig};

fn scene() -> Scene {
    Scene::new(SceneConfig::default())
}

fn filled_rect(scene: &Scene, size: f64) -> Node {
    let rect = Node::rect(scene, Vec2::new(size, size));
    rect.element().style().unwrap().fill.set(Some(Color::WHITE));
    rect
}

#[test]
fn cache_is_required_by_effects() {
    let scene = scene();
    let node = Node::group(&scene);
    assert!(!node.requires_cache());

    node.opacity().set(0.5);
    assert!(node.requires_cache());
    node.opacity().reset();
    assert!(!node.requires_cache());

    node.composite_operation().set(CompositeOp::Multiply);
    assert!(node.requires_cache());
    node.composite_operation().reset();

    node.filters().set(vec![Filter::brightness(1.0)]);
    assert!(!node.has_filters());
    node.filters().set(vec![Filter::blur(3.0)]);
    assert!(node.has_filters());
    assert!(node.requires_cache());
    node.filters().reset();

    node.shadow_blur().set(4.0);
    assert!(!node.has_shadow());
    node.shadow_color().set(Color::BLACK);
    assert!(node.has_shadow());
    assert!(node.requires_cache());
    node.shadow_color().reset();

    node.shaders().set(vec![Shader::new("void main() {}")]);
    assert!(node.requires_cache());
    node.shaders().reset();

    node.cache().set(true);
    assert!(node.requires_cache());
}

#[test]
fn cache_bbox_covers_children_and_padding() {
    let scene = scene();
    let parent = Node::rect(&scene, Vec2::new(10.0, 10.0));
    let child = Node::rect(&scene, Vec2::new(4.0, 4.0));
    child.position().set(Vec2::new(10.0, 0.0));
    parent.add(child);
    assert_eq!(parent.cache_bbox(), Rect::new(-5.0, -5.0, 12.0, 5.0));

    parent.cache_padding().set(Spacing::uniform(1.0));
    assert_eq!(parent.cache_bbox(), Rect::new(-6.0, -6.0, 13.0, 6.0));

    let lone = Node::group(&scene);
    lone.cache_padding().set(Spacing::uniform(2.0));
    assert_eq!(lone.cache_bbox(), Rect::new(-2.0, -2.0, 2.0, 2.0));
}

#[test]
fn full_cache_bbox_grows_with_blur_and_shadow() {
    let scene = scene();
    let rect = Node::rect(&scene, Vec2::new(10.0, 10.0));
    assert_eq!(rect.full_cache_bbox(), rect.cache_bbox());

    rect.shadow_color().set(Color::BLACK);
    rect.shadow_blur().set(10.0);
    let blurred = rect.full_cache_bbox();
    assert!(blurred.width() >= rect.cache_bbox().width() + 20.0);
    assert_eq!(blurred, Rect::new(-15.0, -15.0, 15.0, 15.0));

    rect.shadow_offset().set(Vec2::new(3.0, -4.0));
    rect.filters().set(vec![Filter::blur(2.0)]);
    assert_eq!(rect.full_cache_bbox(), Rect::new(-19.0, -23.0, 22.0, 19.0));
}

#[test]
fn world_space_cache_bbox_is_snapped_and_clipped_to_the_view() {
    let scene = scene();
    let view = scene.get_view();
    let inside = Node::rect(&scene, Vec2::new(10.0, 10.0));
    let corner = Node::rect(&scene, Vec2::new(10.0, 10.0));
    corner.position().set(Vec2::new(-960.0, -540.0));
    view.add_all([inside.clone(), corner.clone()]);

    assert_eq!(inside.world_space_cache_bbox(), Rect::new(953.0, 533.0, 968.0, 548.0));
    assert_eq!(corner.world_space_cache_bbox(), Rect::new(0.0, 0.0, 8.0, 8.0));

    corner.position().set(Vec2::new(-2000.0, 0.0));
    assert_eq!(corner.world_space_cache_bbox(), Rect::ZERO);
}

#[test]
fn children_are_sorted_by_z_index() {
    let scene = scene();
    let parent = Node::group(&scene);
    let kids: Vec<Node> = (0..3).map(|_| Node::group(&scene)).collect();
    parent.add_all(kids.clone());
    assert_eq!(parent.sorted_children(), kids);

    kids[0].z_index().set(1.0);
    kids[2].z_index().set(-1.0);
    assert_eq!(
        parent.sorted_children(),
        vec![kids[2].clone(), kids[1].clone(), kids[0].clone()]
    );
    assert_eq!(parent.children(), kids);
}

#[test]
fn transparent_subtrees_are_not_drawn() {
    let scene = scene();
    let view = scene.get_view();
    let group = Node::group(&scene);
    let rect = filled_rect(&scene, 10.0);
    group.add(rect.clone());
    view.add(group.clone());

    let mut ctx = RecordingContext::new(1920, 1080);
    scene.render(&mut ctx).unwrap();
    assert_eq!(ctx.draw_calls(), 1);

    group.opacity().set(0.0);
    let mut ctx = RecordingContext::new(1920, 1080);
    scene.render(&mut ctx).unwrap();
    assert_eq!(ctx.draw_calls(), 0);
    assert_eq!(ctx.save_depth(), 0);
}

#[test]
fn cached_nodes_are_drawn_through_a_layer() {
    let scene = scene();
    let rect = filled_rect(&scene, 10.0);
    rect.opacity().set(0.5);
    scene.get_view().add(rect);

    let mut ctx = RecordingContext::new(1920, 1080);
    scene.render(&mut ctx).unwrap();
    assert_eq!(ctx.draw_calls(), 1);
    let [DrawCommand::Layer { layer, origin, state, .. }] = ctx.commands() else {
        panic!("expected a single layer");
    };
    assert_eq!((layer.width, layer.height), (15, 15));
    assert_eq!(*origin, Point::new(953.0, 533.0));
    assert_eq!(state.alpha, 0.5);

    let [DrawCommand::FillPath { state: inner, .. }] = layer.commands.as_slice() else {
        panic!("expected the rect inside the layer");
    };
    assert_eq!(inner.transform, Affine::translate((7.0, 7.0)));
    assert_eq!(inner.alpha, 1.0);
}

#[test]
fn shadows_are_applied_when_compositing_the_layer() {
    let scene = scene();
    let rect = filled_rect(&scene, 10.0);
    rect.shadow_color().set(Color::BLACK);
    rect.shadow_offset().set(Vec2::new(2.0, 2.0));
    rect.scale().set(Vec2::new(2.0, 2.0));
    scene.get_view().add(rect);

    let mut ctx = RecordingContext::new(1920, 1080);
    scene.render(&mut ctx).unwrap();
    let [DrawCommand::Layer { state, .. }] = ctx.commands() else {
        panic!("expected a single layer");
    };
    // Without a composite root the shadow stays in world units.
    assert_eq!(state.shadow.offset, Vec2::new(2.0, 2.0));
    assert_eq!(state.shadow.color, Color::BLACK);
}

#[test]
fn failed_layer_allocation_is_reported() {
    let scene = scene();
    let rect = filled_rect(&scene, 10.0);
    rect.cache().set(true);
    scene.get_view().add(rect);

    let mut ctx = RecordingContext::new(1920, 1080).with_layer_limit(0);
    let result = scene.render(&mut ctx);
    assert!(matches!(result, Err(VignetteError::Resource(_))));
    assert_eq!(ctx.save_depth(), 0);
}

#[test]
fn hit_finds_the_topmost_node() {
    let scene = scene();
    let view = scene.get_view();
    let below = filled_rect(&scene, 10.0);
    let above = filled_rect(&scene, 10.0);
    below.position().set(Vec2::new(20.0, 0.0));
    above.position().set(Vec2::new(24.0, 0.0));
    view.add_all([below.clone(), above.clone()]);

    assert_eq!(view.hit(Point::new(982.0, 540.0)), Some(above));
    assert_eq!(view.hit(Point::new(976.0, 540.0)), Some(below));
    assert_eq!(view.hit(Point::new(0.0, 0.0)), None);
}

#[test]
fn filter_strings_scale_blur_into_composite_space() {
    let scene = scene();
    let root = Node::group(&scene);
    root.composite().set(true);
    root.scale().set(Vec2::new(2.0, 2.0));
    let node = Node::group(&scene);
    root.add(node.clone());

    assert_eq!(node.filter_string(), None);
    node.filters()
        .set(vec![Filter::blur(2.0), Filter::brightness(1.0), Filter::grayscale(0.5)]);
    assert_eq!(node.filter_string().as_deref(), Some("blur(4px) grayscale(0.5)"));

    root.composite().set(false);
    assert_eq!(node.filter_string().as_deref(), Some("blur(2px) grayscale(0.5)"));
}
