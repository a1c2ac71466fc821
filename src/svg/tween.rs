//! The SVG node: a wrapper group of shapes built from markup, and the morph between two
//! documents.

use std::cell::OnceCell;
use std::rc::{Rc, Weak};

use crate::animation::ease::Ease;
use crate::animation::task::{BoxTask, Tween, all, deferred, delay, run};
use crate::foundation::color::Color;
use crate::foundation::core::{BBox, Rect, Vec2};
use crate::foundation::error::VignetteResult;
use crate::render::context::Context2d;
use crate::scene::element::{Drawable, Element, ShapeStyle};
use crate::scene::node::{Node, WeakNode};
use crate::scene::props::NodeState;
use crate::scene::registry::{Scene, SceneInner};
use crate::signal::signal::{Computed, Signal, SignalValue};
use crate::signal::tracker::untracked;
use crate::svg::diff::{SvgDiff, SvgDocument, SvgShape, diff_svg};
use crate::svg::parse::{SvgPaint, SvgShapeData, SvgShapeKind};
use crate::transform::linear::clamp_remap;

/// Time windows of a morph, as fractions of its duration.
///
/// Shapes move between `beginning` and `ending`. Deleted shapes fade out before
/// `beginning + overlap`, inserted ones fade in after `ending - overlap`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SvgTweenConfig {
    pub beginning: f64,
    pub ending: f64,
    pub overlap: f64,
}

impl Default for SvgTweenConfig {
    fn default() -> Self {
        Self {
            beginning: 0.2,
            ending: 0.8,
            overlap: 0.15,
        }
    }
}

struct SvgRuntime {
    scene: Weak<SceneInner>,
    owner: WeakNode,
    wrapper: Node,
    document: Computed<Rc<SvgDocument<Node>>>,
}

impl SvgRuntime {
    fn document_children(&self) -> SignalValue<Vec<Node>> {
        let document = self.document.clone();
        SignalValue::reactive(move || {
            document
                .get()
                .nodes
                .iter()
                .map(|shape| shape.shape.clone())
                .collect()
        })
    }
}

pub struct SvgData {
    pub style: ShapeStyle,
    pub svg: Signal<String>,
    runtime: OnceCell<Rc<SvgRuntime>>,
}

impl Element {
    pub fn svg(svg: String) -> Self {
        let data = SvgData {
            style: ShapeStyle::default(),
            svg: Signal::new(String::new()),
            runtime: OnceCell::new(),
        };
        if !svg.is_empty() {
            data.svg.set(svg);
        }
        Self::Svg(Box::new(data))
    }
}

impl SvgData {
    /// Create the wrapper group holding the shapes of the current document.
    pub(crate) fn attach(&self, node: &Node) {
        let Some(scene) = node.scene() else {
            return;
        };
        let wrapper = Node::group(&scene);
        let document = {
            let svg = self.svg.clone();
            let scene = scene.downgrade();
            let owner = node.downgrade();
            Computed::new(move || {
                let source = svg.get();
                let built = untracked(|| match scene.upgrade() {
                    Some(inner) => build_document(&Scene::from_inner(inner), &owner, &source),
                    None => Ok(SvgDocument::default()),
                });
                match built {
                    Ok(document) => Rc::new(document),
                    Err(e) => {
                        let key = owner.upgrade().map(|n| n.key().to_owned()).unwrap_or_default();
                        tracing::error!(
                            inspect = %key,
                            error = %e,
                            remarks = "The node shows nothing until its svg is valid markup.",
                            "Failed to parse SVG"
                        );
                        Rc::new(SvgDocument::default())
                    }
                }
            })
        };
        let runtime = Rc::new(SvgRuntime {
            scene: scene.downgrade(),
            owner: node.downgrade(),
            wrapper: wrapper.clone(),
            document,
        });
        wrapper.set_children(runtime.document_children());
        node.add(wrapper);
        let _ = self.runtime.set(runtime);
    }

    pub(crate) fn dispose_internal(&self) {
        if let Some(runtime) = self.runtime.get() {
            runtime.document.dispose();
        }
    }

    /// The group the document's shapes live in.
    pub fn wrapper(&self) -> Option<Node> {
        self.runtime.get().map(|runtime| runtime.wrapper.clone())
    }

    pub fn document(&self) -> Option<Rc<SvgDocument<Node>>> {
        self.runtime.get().map(|runtime| runtime.document.get())
    }

    /// Explicit size, or the document size scaled by the wrapper.
    pub fn computed_size(&self) -> Vec2 {
        if !self.style.size.is_initial() {
            return self.style.size.get();
        }
        match self.runtime.get() {
            Some(runtime) => {
                let size = runtime.document.get().size;
                let scale = runtime.wrapper.scale().get();
                Vec2::new(size.x * scale.x, size.y * scale.y)
            }
            None => self.style.size.get(),
        }
    }

    pub fn tween_svg(&self, to: impl Into<String>, duration: f64, ease: Ease) -> BoxTask {
        self.tween_svg_with(to, duration, ease, SvgTweenConfig::default())
    }

    /// Morph into the document `to`: shapes sharing an id move onto their counterpart, the rest
    /// fade in or out.
    pub fn tween_svg_with(
        &self,
        to: impl Into<String>,
        duration: f64,
        ease: Ease,
        config: SvgTweenConfig,
    ) -> BoxTask {
        let to = to.into();
        let svg = self.svg.clone();
        let Some(runtime) = self.runtime.get().cloned() else {
            return Box::new(run(move || svg.set(to)));
        };
        let size = self.style.size.clone();
        Box::new(deferred(move || {
            let morph = Morph {
                runtime,
                svg: svg.clone(),
                size,
                duration,
                ease,
                config,
            };
            match morph.build(&to) {
                Ok(task) => task,
                Err(e) => {
                    tracing::error!(error = %e, "SVG morph failed, switching without animation");
                    Box::new(run(move || svg.set(to)))
                }
            }
        }))
    }
}

struct Morph {
    runtime: Rc<SvgRuntime>,
    svg: Signal<String>,
    size: Signal<Vec2>,
    duration: f64,
    ease: Ease,
    config: SvgTweenConfig,
}

impl Morph {
    fn build(self, to: &str) -> VignetteResult<BoxTask> {
        let Morph {
            runtime,
            svg,
            size,
            duration,
            ease,
            config,
        } = self;
        let Some(scene) = runtime.scene.upgrade().map(Scene::from_inner) else {
            let to = to.to_owned();
            return Ok(Box::new(run(move || svg.set(to))));
        };
        let target = build_document(&scene, &runtime.owner, to)?;
        let mut diff = diff_svg(&runtime.document.peek(), &target);

        for item in diff.transformed.iter_mut().filter(|item| item.insert) {
            item.from.node.shape = item.from.node.shape.clone_node()?;
        }
        let final_children = diff.final_order(target.nodes.len())?;
        let current = untracked(|| runtime.wrapper.children());
        runtime.wrapper.set_children(diff.initial_order(&current));

        let window = (config.ending - config.beginning).max(0.0) * duration;
        let mut transformator = Vec::new();
        for item in &diff.transformed {
            transform_tasks(
                &item.from.node.shape,
                &item.to.node.shape,
                window,
                ease,
                &mut transformator,
            );
        }

        let auto_size = size.is_initial();
        let base = base_tween(
            &runtime,
            &diff,
            final_children,
            auto_size.then(|| size.clone()),
            duration,
            ease,
            config,
        );
        let (sources, transient) = morph_nodes(&diff, &target);
        let snapshots = snapshot_states(&sources);
        let finish = {
            let to = to.to_owned();
            move || {
                svg.set(to);
                for node in sources {
                    node.dispose();
                }
            }
        };
        let cleanup = {
            let runtime = runtime.clone();
            move || {
                if auto_size {
                    size.reset();
                }
                runtime.wrapper.set_children(runtime.document_children());
                for node in transient {
                    node.dispose();
                }
                // A completed morph has already released its sources.
                for (node, state) in snapshots {
                    if !node.is_disposed() {
                        restore_state(&node, &state);
                    }
                }
            }
        };
        let base = base.on_finish(finish).on_cleanup(cleanup).boxed();
        let moves: BoxTask = Box::new(delay(
            config.beginning * duration,
            Box::new(all(transformator)),
        ));
        Ok(Box::new(all([base, moves])))
    }
}

/// Splits the nodes a morph touches into shapes of the current document, released once the new
/// markup is set, and nodes that exist only while the morph runs.
fn morph_nodes(diff: &SvgDiff<Node>, target: &SvgDocument<Node>) -> (Vec<Node>, Vec<Node>) {
    fn push_unique(nodes: &mut Vec<Node>, node: &Node) {
        if !nodes.contains(node) {
            nodes.push(node.clone());
        }
    }
    let mut sources = Vec::new();
    let mut transient = Vec::new();
    for shape in &diff.deleted {
        push_unique(&mut sources, &shape.node.shape);
    }
    for item in &diff.transformed {
        let list = if item.insert { &mut transient } else { &mut sources };
        push_unique(list, &item.from.node.shape);
    }
    for shape in &target.nodes {
        push_unique(&mut transient, &shape.shape);
    }
    (sources, transient)
}

/// State of every source shape and its descendants before the morph touches them.
fn snapshot_states(sources: &[Node]) -> Vec<(Node, NodeState)> {
    fn visit(node: &Node, out: &mut Vec<(Node, NodeState)>) {
        out.push((node.clone(), untracked(|| node.get_state())));
        for child in node.peek_children() {
            visit(&child, out);
        }
    }
    let mut out = Vec::new();
    for node in sources {
        visit(node, &mut out);
    }
    out
}

/// Reapply the entries of `state` the morph changed. Untouched entries keep their bindings.
fn restore_state(node: &Node, state: &NodeState) {
    let current = untracked(|| node.get_state());
    let changed: NodeState = state
        .iter()
        .filter(|(key, value)| current.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if !changed.is_empty() {
        node.apply_state(&changed);
    }
}

/// Reorders the wrapper at the midpoint, morphs the auto size (when given) and crossfades
/// inserted and deleted shapes.
fn base_tween(
    runtime: &Rc<SvgRuntime>,
    diff: &SvgDiff<Node>,
    final_children: Vec<Node>,
    auto_size: Option<Signal<Vec2>>,
    duration: f64,
    ease: Ease,
    config: SvgTweenConfig,
) -> Tween {
    let SvgTweenConfig {
        beginning,
        ending,
        overlap,
    } = config;
    let wrapper = runtime.wrapper.clone();
    let deleted: Vec<Node> = diff.deleted.iter().map(|s| s.node.shape.clone()).collect();
    let inserted: Vec<Node> = diff.inserted.iter().map(|s| s.node.shape.clone()).collect();
    let (from_size, to_size) = (diff.from_size, diff.to_size);
    let mut final_children = Some(final_children);

    Tween::new(duration, Ease::Linear, move |t| {
        let progress = ease.apply(t);
        let remapped = clamp_remap(beginning, ending, 0.0, 1.0, progress);
        if remapped >= 0.5
            && let Some(children) = final_children.take()
        {
            wrapper.set_children(children);
        }
        if let Some(size) = &auto_size {
            let scale = wrapper.scale().peek();
            size.set(Vec2::new(
                Ease::InOutSine.between(remapped, from_size.x, to_size.x) * scale.x,
                Ease::InOutSine.between(remapped, from_size.y, to_size.y) * scale.y,
            ));
        }
        let fade_out = clamp_remap(0.0, beginning + overlap, 1.0, 0.0, progress);
        for node in &deleted {
            node.opacity().set(fade_out);
        }
        let fade_in = clamp_remap(ending - overlap, 1.0, 0.0, 1.0, progress);
        for node in &inserted {
            node.opacity().set(fade_in);
        }
    })
}

/// Tweens moving `from` onto `to`, recursing into children pairwise.
fn transform_tasks(from: &Node, to: &Node, duration: f64, ease: Ease, out: &mut Vec<BoxTask>) {
    out.push(from.position().tween(to.position().raw(), duration, ease).boxed());
    out.push(from.scale().tween(to.scale().raw(), duration, ease).boxed());
    out.push(from.rotation().tween(to.rotation().raw(), duration, ease).boxed());
    if let (Element::Path(a), Element::Path(b)) = (from.element(), to.element()) {
        let data = b.data.peek();
        if a.data.peek() != data {
            out.push(a.tween_data(data, duration, ease));
        }
    }
    if let (Some(a), Some(b)) = (from.element().style(), to.element().style()) {
        out.push(a.size.tween(b.size.raw(), duration, ease).boxed());
        out.push(a.fill.tween(b.fill.raw(), duration, ease).boxed());
        out.push(a.stroke.tween(b.stroke.raw(), duration, ease).boxed());
        out.push(a.line_width.tween(b.line_width.raw(), duration, ease).boxed());
    }
    let from_children = from.peek_children();
    let to_children = to.peek_children();
    for (a, b) in from_children.iter().zip(&to_children) {
        transform_tasks(a, b, duration, ease, out);
    }
}

fn build_document(scene: &Scene, owner: &WeakNode, source: &str) -> VignetteResult<SvgDocument<Node>> {
    if source.trim().is_empty() {
        return Ok(SvgDocument::default());
    }
    let data = scene.svg_pool().get_or_parse(source)?;
    Ok(SvgDocument {
        size: data.size,
        nodes: data
            .nodes
            .iter()
            .map(|shape| SvgShape {
                id: shape.id.clone(),
                shape: build_shape(scene, owner, shape),
            })
            .collect(),
    })
}

fn build_shape(scene: &Scene, owner: &WeakNode, data: &SvgShapeData) -> Node {
    let element = match &data.kind {
        SvgShapeKind::Path { data } => Element::path(data.clone()),
        SvgShapeKind::Rect { size, .. } => Element::rect(*size),
        SvgShapeKind::Circle { size } => Element::circle(*size),
        SvgShapeKind::Line { points } => Element::line(Some(points.clone())),
        SvgShapeKind::Img { src, .. } => Element::img(Some(src.clone())),
    };
    let node = Node::create(scene, element, None);
    node.position().set(data.transform.position);
    node.rotation().set(data.transform.rotation);
    node.scale().set(data.transform.scale);

    match (node.element(), &data.kind) {
        (Element::Rect(rect), SvgShapeKind::Rect { radius, .. }) if *radius != Vec2::ZERO => {
            rect.radius.set(corner_radius(*radius));
        }
        (Element::Img(img), SvgShapeKind::Img { size, .. }) => img.style.size.set(*size),
        _ => {}
    }
    if let Some(style) = node.element().style() {
        apply_paint(&style.fill, data.style.fill, owner, |s| &s.fill);
        apply_paint(&style.stroke, data.style.stroke, owner, |s| &s.stroke);
        if let Some(width) = data.style.line_width {
            style.line_width.set(width);
        }
    }
    node
}

/// Rects round their corners with a single radius; a missing `rx` or `ry` takes the other.
fn corner_radius(radius: Vec2) -> f64 {
    if radius.x == 0.0 {
        radius.y
    } else if radius.y == 0.0 {
        radius.x
    } else {
        radius.x.min(radius.y)
    }
}

fn apply_paint(
    target: &Signal<Option<Color>>,
    paint: Option<SvgPaint>,
    owner: &WeakNode,
    pick: fn(&ShapeStyle) -> &Signal<Option<Color>>,
) {
    match paint {
        None => {}
        Some(SvgPaint::Color(color)) => target.set(Some(color)),
        Some(SvgPaint::CurrentColor) => {
            let owner = owner.clone();
            target.set(SignalValue::reactive(move || {
                owner
                    .upgrade()
                    .and_then(|node| node.element().style().and_then(|style| pick(style).get()))
            }));
        }
    }
}

impl Drawable for SvgData {
    fn draw_content(&self, _node: &Node, _ctx: &mut dyn Context2d) -> VignetteResult<()> {
        Ok(())
    }

    fn content_bbox(&self, _node: &Node) -> Rect {
        Rect::from_size_centered(self.computed_size())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/svg/tween.rs"]
mod tests;
