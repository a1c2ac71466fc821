use super::*;
use crate::animation::task::{Task, TaskStatus};
use crate::render::recording::{DrawCommand, RecordingContext};
use crate::scene::registry::{Scene, SceneConfig};

fn scene() -> Scene {
    Scene::new(SceneConfig::default())
}

fn within(a: Rect, b: Rect, tolerance: f64) -> bool {
    (a.x0 - b.x0).abs() < tolerance
        && (a.y0 - b.y0).abs() < tolerance
        && (a.x1 - b.x1).abs() < tolerance
        && (a.y1 - b.y1).abs() < tolerance
}

fn close(a: Rect, b: Rect) -> bool {
    within(a, b, 1e-6)
}

fn draw(node: &Node) -> RecordingContext {
    let mut ctx = RecordingContext::new(100, 100);
    if let Some(drawable) = node.element().drawable() {
        drawable.draw_content(node, &mut ctx).unwrap();
    }
    ctx
}

#[test]
fn class_names_feed_generated_keys() {
    assert_eq!(NodeKind::Group.class_name(), "Node");
    assert_eq!(NodeKind::View.class_name(), "View2D");
    assert_eq!(NodeKind::Svg.class_name(), "SVG");
    assert_eq!(Element::Group.kind(), NodeKind::Group);
    assert!(Element::Group.style().is_none());
    assert!(Element::Group.drawable().is_none());
}

#[test]
fn rect_bounds_include_half_the_stroke() {
    let scene = scene();
    let rect = Node::rect(&scene, Vec2::new(4.0, 2.0));
    assert!(close(rect.content_bbox(), Rect::new(-2.0, -1.0, 2.0, 1.0)));
    rect.element().style().unwrap().line_width.set(2.0);
    assert!(close(rect.content_bbox(), Rect::new(-3.0, -2.0, 3.0, 2.0)));
}

#[test]
fn circle_bounds_and_hits() {
    let scene = scene();
    let circle = Node::circle(&scene, Vec2::new(4.0, 4.0));
    assert!(within(circle.content_bbox(), Rect::new(-2.0, -2.0, 2.0, 2.0), 0.01));

    let drawable = circle.element().drawable().unwrap();
    let corner = Point::new(1.9, 1.9);
    assert!(drawable.contains(&circle, corner));
    circle.element().style().unwrap().fill.set(Some(Color::WHITE));
    assert!(!drawable.contains(&circle, corner));
    assert!(drawable.contains(&circle, Point::ORIGIN));
}

#[test]
fn unpainted_shapes_draw_nothing() {
    let scene = scene();
    let rect = Node::rect(&scene, Vec2::new(4.0, 4.0));
    assert_eq!(draw(&rect).draw_calls(), 0);

    let style = rect.element().style().unwrap();
    style.stroke.set(Some(Color::WHITE));
    assert_eq!(draw(&rect).draw_calls(), 0);
    style.fill.set(Some(Color::TRANSPARENT));
    assert_eq!(draw(&rect).draw_calls(), 0);
}

#[test]
fn fill_is_drawn_before_stroke() {
    let scene = scene();
    let rect = Node::rect(&scene, Vec2::new(4.0, 4.0));
    let style = rect.element().style().unwrap();
    style.fill.set(Some(Color::WHITE));
    style.stroke.set(Some(Color::BLACK));
    style.line_width.set(3.0);

    let ctx = draw(&rect);
    let commands = ctx.commands();
    assert_eq!(commands.len(), 2);
    assert!(matches!(commands[0], DrawCommand::FillPath { paint, .. } if paint == Color::WHITE));
    assert!(matches!(commands[1], DrawCommand::StrokePath { width, .. } if width == 3.0));
}

#[test]
fn line_runs_through_children_without_points() {
    let scene = scene();
    let a = Node::group(&scene);
    let b = Node::group(&scene);
    a.position().set(Vec2::new(0.0, 0.0));
    b.position().set(Vec2::new(10.0, 5.0));
    let line = Node::line_through(&scene, vec![a, b.clone()]);
    let Element::Line(data) = line.element() else {
        panic!("expected a line");
    };
    assert_eq!(
        data.parsed_points(&line),
        vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)]
    );

    b.position().set(Vec2::new(20.0, 5.0));
    assert!(close(line.content_bbox(), Rect::new(0.0, 0.0, 20.0, 5.0)));

    data.points.set(Some(vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]));
    assert_eq!(data.parsed_points(&line).len(), 2);
    assert_eq!(data.parsed_points(&line)[0], Point::new(1.0, 1.0));
}

#[test]
fn sharp_corners_widen_the_stroke_bounds() {
    let scene = scene();
    let line = Node::line(
        &scene,
        vec![Point::new(-10.0, 0.0), Point::new(0.0, 10.0), Point::new(10.0, 0.0)],
    );
    let Element::Line(data) = line.element() else {
        panic!("expected a line");
    };
    data.style.line_width.set(2.0);
    let sharp = line.content_bbox();
    assert!(sharp.y1 > 11.2);

    data.radius.set(1.0);
    let rounded = line.content_bbox();
    assert!(rounded.y1 <= 11.0 + 1e-9);
}

#[test]
fn polyline_tween_changes_the_point_count() {
    let scene = scene();
    let triangle = vec![Point::new(0.0, -10.0), Point::new(10.0, 10.0), Point::new(-10.0, 10.0)];
    let pentagon: Vec<Point> = (0..5)
        .map(|i| {
            let angle = f64::from(i) * std::f64::consts::TAU / 5.0;
            Point::new(angle.sin() * 10.0, -angle.cos() * 10.0)
        })
        .collect();
    let line = Node::line(&scene, triangle);
    let Element::Line(data) = line.element() else {
        panic!("expected a line");
    };
    data.closed.set(true);

    let mut task = data.tween_points(&line, pentagon.clone(), 1.0, Ease::Linear);
    assert_eq!(task.advance(0.5), TaskStatus::Pending);
    assert_eq!(data.tweened_points.get().map(|p| p.len()), Some(5));
    assert_eq!(task.advance(0.5), TaskStatus::Done);
    assert_eq!(data.tweened_points.get(), None);
    assert_eq!(data.points.get(), Some(pentagon));
}

#[test]
fn path_tween_settles_on_the_target_data() {
    let scene = scene();
    let from = BezPath::from_svg("M0 0 L10 0 L10 10 Z").unwrap();
    let to = BezPath::from_svg("M0 0 L20 0").unwrap();
    let path = Node::path(&scene, from);
    let Element::Path(data) = path.element() else {
        panic!("expected a path");
    };

    let mut task = data.tween_data(to.clone(), 1.0, Ease::Linear);
    task.advance(0.5);
    assert!(data.tweened.get().is_some());
    drop(task);
    assert!(data.tweened.get().is_none());
    assert_ne!(data.data.get(), to);

    let mut task = data.tween_data(to.clone(), 1.0, Ease::Linear);
    while task.advance(0.5) == TaskStatus::Pending {}
    assert_eq!(data.data.get(), to);
    assert!(close(path.content_bbox(), Rect::new(0.0, 0.0, 20.0, 0.0)));
}

#[test]
fn explicit_image_size_wins_over_the_natural_one() {
    let scene = scene();
    let img = Node::img(&scene, "missing.png");
    let Element::Img(data) = img.element() else {
        panic!("expected an image");
    };
    assert_eq!(data.computed_size(&img), Vec2::ZERO);
    data.style.size.set(Vec2::new(8.0, 6.0));
    assert_eq!(data.computed_size(&img), Vec2::new(8.0, 6.0));
    data.style.line_width.set(2.0);
    assert!(close(img.content_bbox(), Rect::new(-5.0, -4.0, 5.0, 4.0)));
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn images_are_drawn_once_loaded() {
    let scene = scene();
    let img = Node::img(&scene, "pixel.png");
    assert_eq!(draw(&img).draw_calls(), 0);
    assert!(scene.image_pool().has_pending());

    scene.image_pool().insert_bytes("pixel.png", &png(2, 2)).unwrap();

    let ctx = draw(&img);
    let [DrawCommand::Image { width, dest, state, .. }] = ctx.commands() else {
        panic!("expected a single image draw");
    };
    assert_eq!(*width, 2);
    assert_eq!(*dest, Rect::new(-1.0, -1.0, 1.0, 1.0));
    assert!(state.clipped);
}

#[test]
fn cached_bounds_follow_image_loads() {
    let pool = crate::assets::image_pool::ImagePool::with_loader(
        ".",
        "",
        Box::new(|_: &str| Ok(png(40, 20))),
    );
    let scene = Scene::with_image_pool(SceneConfig::default(), pool);
    let img = Node::img(&scene, "banner.png");
    img.opacity().set(0.5);
    scene.get_view().add(img.clone());
    assert_eq!(img.cache_bbox(), Rect::ZERO);

    assert_eq!(img.to_ready(), 1);
    assert_eq!(img.cache_bbox(), Rect::new(-20.0, -10.0, 20.0, 10.0));

    scene.image_pool().insert_bytes("banner.png", &png(4, 6)).unwrap();
    assert_eq!(img.cache_bbox(), Rect::new(-2.0, -3.0, 2.0, 3.0));

    scene.image_pool().set_asset_hash("v2");
    assert_eq!(img.cache_bbox(), Rect::ZERO);
}
