//! What a node draws on top of its children.
//!
//! Every node carries one [`Element`]. Shapes share the [`ShapeStyle`] signals; outline-based
//! shapes implement [`CurveLike`] and reuse [`draw_curve`] and [`curve_bbox`].

use kurbo::{Shape, Stroke};

use crate::animation::ease::Ease;
use crate::animation::task::{BoxTask, Tween};
use crate::assets::image_pool::ImageEntry;
use crate::curves::interpolate::{PolylineLerp, create_curve_profile_lerp};
use crate::curves::profile::{
    CurveProfile, circle_profile, path_profile, polyline_profile, rect_profile,
};
use crate::foundation::color::Color;
use crate::foundation::core::{BBox, BezPath, Point, Rect, Vec2};
use crate::foundation::error::VignetteResult;
use crate::render::context::Context2d;
use crate::scene::code_block::CodeData;
use crate::scene::node::Node;
use crate::signal::signal::Signal;
use crate::signal::tracker::untracked;
use crate::svg::tween::SvgData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    Group,
    View,
    Rect,
    Circle,
    Path,
    Line,
    Img,
    Code,
    Svg,
}

impl NodeKind {
    /// Name used in generated node keys.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Group => "Node",
            Self::View => "View2D",
            Self::Rect => "Rect",
            Self::Circle => "Circle",
            Self::Path => "Path",
            Self::Line => "Line",
            Self::Img => "Img",
            Self::Code => "Code",
            Self::Svg => "SVG",
        }
    }
}

/// Fill, stroke and outline trimming shared by all shapes.
pub struct ShapeStyle {
    pub fill: Signal<Option<Color>>,
    pub stroke: Signal<Option<Color>>,
    pub line_width: Signal<f64>,
    pub size: Signal<Vec2>,
    pub start: Signal<f64>,
    pub end: Signal<f64>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Signal::new(None),
            stroke: Signal::new(None),
            line_width: Signal::new(0.0),
            size: Signal::new(Vec2::ZERO),
            start: Signal::new(0.0),
            end: Signal::new(1.0),
        }
    }
}

impl ShapeStyle {
    /// Default style with `size` set explicitly.
    pub fn sized(size: Vec2) -> Self {
        let style = Self::default();
        style.size.set(size);
        style
    }
}

pub struct ViewData {
    pub size: Signal<Vec2>,
    pub asset_hash: Signal<String>,
}

pub struct RectData {
    pub style: ShapeStyle,
    pub radius: Signal<f64>,
}

pub struct CircleData {
    pub style: ShapeStyle,
}

pub struct PathData {
    pub style: ShapeStyle,
    pub data: Signal<BezPath>,
    pub(crate) tweened: Signal<Option<CurveProfile>>,
}

pub struct LineData {
    pub style: ShapeStyle,
    /// Explicit points; without them the line runs through its children's positions.
    pub points: Signal<Option<Vec<Point>>>,
    pub radius: Signal<f64>,
    pub closed: Signal<bool>,
    pub(crate) tweened_points: Signal<Option<Vec<Point>>>,
}

pub struct ImgData {
    pub style: ShapeStyle,
    pub src: Signal<Option<String>>,
    pub alpha: Signal<f64>,
    pub smoothing: Signal<bool>,
}

pub enum Element {
    Group,
    View(ViewData),
    Rect(RectData),
    Circle(CircleData),
    Path(PathData),
    Line(LineData),
    Img(ImgData),
    Code(Box<CodeData>),
    Svg(Box<SvgData>),
}

impl Element {
    // Constructor arguments are set explicitly so that `clone_node` copies them.

    pub fn rect(size: Vec2) -> Self {
        Self::Rect(RectData {
            style: ShapeStyle::sized(size),
            radius: Signal::new(0.0),
        })
    }

    pub fn circle(size: Vec2) -> Self {
        Self::Circle(CircleData {
            style: ShapeStyle::sized(size),
        })
    }

    pub fn path(data: BezPath) -> Self {
        let path = PathData {
            style: ShapeStyle::default(),
            data: Signal::new(BezPath::new()),
            tweened: Signal::new(None),
        };
        path.data.set(data);
        Self::Path(path)
    }

    pub fn line(points: Option<Vec<Point>>) -> Self {
        let line = LineData {
            style: ShapeStyle::default(),
            points: Signal::new(None),
            radius: Signal::new(0.0),
            closed: Signal::new(false),
            tweened_points: Signal::new(None),
        };
        if points.is_some() {
            line.points.set(points);
        }
        Self::Line(line)
    }

    pub fn img(src: Option<String>) -> Self {
        let img = ImgData {
            style: ShapeStyle::default(),
            src: Signal::new(None),
            alpha: Signal::new(1.0),
            smoothing: Signal::new(true),
        };
        if src.is_some() {
            img.src.set(src);
        }
        Self::Img(img)
    }

    pub(crate) fn view(size: Vec2, asset_hash: String) -> Self {
        Self::View(ViewData {
            size: Signal::new(size),
            asset_hash: Signal::new(asset_hash),
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Group => NodeKind::Group,
            Self::View(_) => NodeKind::View,
            Self::Rect(_) => NodeKind::Rect,
            Self::Circle(_) => NodeKind::Circle,
            Self::Path(_) => NodeKind::Path,
            Self::Line(_) => NodeKind::Line,
            Self::Img(_) => NodeKind::Img,
            Self::Code(_) => NodeKind::Code,
            Self::Svg(_) => NodeKind::Svg,
        }
    }

    pub fn style(&self) -> Option<&ShapeStyle> {
        match self {
            Self::Rect(rect) => Some(&rect.style),
            Self::Circle(circle) => Some(&circle.style),
            Self::Path(path) => Some(&path.style),
            Self::Line(line) => Some(&line.style),
            Self::Img(img) => Some(&img.style),
            Self::Svg(svg) => Some(&svg.style),
            Self::Group | Self::View(_) | Self::Code(_) => None,
        }
    }

    pub(crate) fn drawable(&self) -> Option<&dyn Drawable> {
        match self {
            Self::Rect(rect) => Some(rect),
            Self::Circle(circle) => Some(circle),
            Self::Path(path) => Some(path),
            Self::Line(line) => Some(line),
            Self::Img(img) => Some(img),
            Self::Code(code) => Some(code.as_ref()),
            Self::Svg(svg) => Some(svg.as_ref()),
            Self::Group | Self::View(_) => None,
        }
    }

    /// Signals owned by the element that are not listed in any property table.
    pub(crate) fn dispose_internal(&self) {
        match self {
            Self::Path(path) => path.tweened.dispose(),
            Self::Line(line) => line.tweened_points.dispose(),
            Self::Code(code) => code.dispose_internal(),
            Self::Svg(svg) => svg.dispose_internal(),
            _ => {}
        }
    }
}

/// A node element that draws its own content.
pub(crate) trait Drawable {
    /// Draw in the node's local space. Children are drawn afterwards by the node.
    fn draw_content(&self, node: &Node, ctx: &mut dyn Context2d) -> VignetteResult<()>;

    /// Local-space bounds of the content, excluding children and effects.
    fn content_bbox(&self, node: &Node) -> Rect;

    fn contains(&self, node: &Node, local: Point) -> bool {
        self.content_bbox(node).contains(local)
    }

    fn collect_async_resources(&self, _node: &Node) {}
}

/// A shape whose geometry is a curve profile.
pub(crate) trait CurveLike {
    fn style(&self) -> &ShapeStyle;

    fn profile(&self, node: &Node) -> CurveProfile;

    /// Multiplier applied to the line width when bounding the stroke.
    fn line_width_coefficient(&self, _profile: &CurveProfile) -> f64 {
        0.5
    }
}

fn visible(paint: Option<Color>) -> Option<Color> {
    paint.filter(|c| !c.is_transparent())
}

/// Fill then stroke the trimmed profile.
pub(crate) fn draw_curve(curve: &dyn CurveLike, node: &Node, ctx: &mut dyn Context2d) {
    let style = curve.style();
    let fill = visible(style.fill.get());
    let stroke = visible(style.stroke.get());
    let line_width = style.line_width.get();
    if fill.is_none() && (stroke.is_none() || line_width <= 0.0) {
        return;
    }
    let path = curve.profile(node).to_path(style.start.get(), style.end.get());
    if let Some(paint) = fill {
        ctx.fill_path(&path, paint);
    }
    if let Some(paint) = stroke
        && line_width > 0.0
    {
        ctx.stroke_path(&path, paint, &Stroke::new(line_width));
    }
}

pub(crate) fn curve_bbox(curve: &dyn CurveLike, node: &Node) -> Rect {
    let profile = curve.profile(node);
    let bounds = if profile.is_empty() {
        Rect::ZERO
    } else {
        profile.to_path(0.0, 1.0).bounding_box()
    };
    let line_width = curve.style().line_width.get();
    bounds.expand_by((line_width * curve.line_width_coefficient(&profile)).max(0.0))
}

fn curve_contains(curve: &dyn CurveLike, node: &Node, local: Point) -> bool {
    let profile = curve.profile(node);
    if profile.is_empty() {
        return false;
    }
    let path = profile.to_path(0.0, 1.0);
    if visible(curve.style().fill.get()).is_some() {
        path.contains(local)
    } else {
        path.bounding_box().contains(local)
    }
}

macro_rules! curve_drawable {
    ($($ty:ty),*) => {
        $(
            impl Drawable for $ty {
                fn draw_content(&self, node: &Node, ctx: &mut dyn Context2d) -> VignetteResult<()> {
                    draw_curve(self, node, ctx);
                    Ok(())
                }

                fn content_bbox(&self, node: &Node) -> Rect {
                    curve_bbox(self, node)
                }

                fn contains(&self, node: &Node, local: Point) -> bool {
                    curve_contains(self, node, local)
                }
            }
        )*
    };
}

curve_drawable!(RectData, CircleData, PathData, LineData);

impl CurveLike for RectData {
    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn profile(&self, _node: &Node) -> CurveProfile {
        rect_profile(Rect::from_size_centered(self.style.size.get()), self.radius.get())
    }
}

impl CurveLike for CircleData {
    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn profile(&self, _node: &Node) -> CurveProfile {
        circle_profile(Rect::from_size_centered(self.style.size.get()))
    }
}

impl CurveLike for PathData {
    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn profile(&self, _node: &Node) -> CurveProfile {
        match self.tweened.get() {
            Some(profile) => profile,
            None => path_profile(&self.data.get()),
        }
    }
}

impl PathData {
    /// Morph the outline into `to`, sampling both paths into polylines.
    pub fn tween_data(&self, to: BezPath, duration: f64, ease: Ease) -> BoxTask {
        let from = path_profile(&self.data.peek());
        let lerp = create_curve_profile_lerp(&from, &path_profile(&to));
        let tweened = self.tweened.clone();
        let data = self.data.clone();
        let cleared = self.tweened.clone();
        Tween::new(duration, ease, move |t| tweened.set(Some(lerp.profile_at(t))))
            .on_finish(move || data.set(to))
            .on_cleanup(move || cleared.set(None))
            .boxed()
    }
}

impl CurveLike for LineData {
    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn profile(&self, node: &Node) -> CurveProfile {
        let points = match self.tweened_points.get() {
            Some(points) => points,
            None => self.parsed_points(node),
        };
        polyline_profile(&points, self.radius.get(), self.closed.get())
    }

    fn line_width_coefficient(&self, profile: &CurveProfile) -> f64 {
        let coefficient: f64 = 0.5;
        if self.radius.get() == 0.0 && profile.min_sin > 0.0 {
            coefficient.max(0.5 / profile.min_sin)
        } else {
            coefficient
        }
    }
}

impl LineData {
    /// Explicit points, or the positions of the node's children.
    pub fn parsed_points(&self, node: &Node) -> Vec<Point> {
        match self.points.get() {
            Some(points) => points,
            None => node
                .children()
                .iter()
                .map(|child| child.position().get().to_point())
                .collect(),
        }
    }

    /// Morph into a polyline with a possibly different point count.
    pub fn tween_points(&self, node: &Node, to: Vec<Point>, duration: f64, ease: Ease) -> BoxTask {
        let from = untracked_points(self, node);
        let lerp = PolylineLerp::new(&from, &to, self.closed.peek());
        let tweened = self.tweened_points.clone();
        let points = self.points.clone();
        let cleared = self.tweened_points.clone();
        Tween::new(duration, ease, move |t| tweened.set(Some(lerp.points_at(t))))
            .on_finish(move || points.set(Some(to)))
            .on_cleanup(move || cleared.set(None))
            .boxed()
    }
}

fn untracked_points(line: &LineData, node: &Node) -> Vec<Point> {
    untracked(|| line.parsed_points(node))
}

impl ImgData {
    /// Explicit size, or the natural size of the loaded image.
    pub fn computed_size(&self, node: &Node) -> Vec2 {
        let size = self.style.size.get();
        if !self.style.size.is_initial() {
            return size;
        }
        let natural = self.src.get().and_then(|src| {
            let scene = node.scene()?;
            let pool = scene.image_pool();
            // Subscribe so the cached bounds follow loads and evictions.
            pool.version();
            pool.get(&src)
                .map(|image| Vec2::new(f64::from(image.width), f64::from(image.height)))
        });
        natural.unwrap_or(size)
    }
}

impl Drawable for ImgData {
    fn draw_content(&self, node: &Node, ctx: &mut dyn Context2d) -> VignetteResult<()> {
        let size = self.computed_size(node);
        let rect = Rect::from_size_centered(size);
        let outline = rect_profile(rect, 0.0).to_path(0.0, 1.0);
        if let Some(paint) = visible(self.style.fill.get()) {
            ctx.fill_path(&outline, paint);
        }

        let alpha = self.alpha.get();
        if alpha > 0.0
            && let Some(src) = self.src.get()
            && let Some(scene) = node.scene()
            && let ImageEntry::Ready(image) = scene.image_pool().request(&src)
        {
            ctx.save();
            ctx.clip(&outline);
            if alpha < 1.0 {
                ctx.set_global_alpha(ctx.global_alpha() * alpha);
            }
            ctx.draw_image(&image, rect, self.smoothing.get());
            ctx.restore();
        }

        let line_width = self.style.line_width.get();
        if let Some(paint) = visible(self.style.stroke.get())
            && line_width > 0.0
        {
            ctx.stroke_path(&outline, paint, &Stroke::new(line_width));
        }
        Ok(())
    }

    fn content_bbox(&self, node: &Node) -> Rect {
        Rect::from_size_centered(self.computed_size(node))
            .expand_by(self.style.line_width.get().max(0.0) / 2.0)
    }

    fn collect_async_resources(&self, node: &Node) {
        if let Some(src) = self.src.get()
            && let Some(scene) = node.scene()
        {
            scene.image_pool().request(&src);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/element.rs"]
mod tests;
