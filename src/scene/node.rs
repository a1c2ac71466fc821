//! Scene graph nodes.
//!
//! A [`Node`] is a cheap handle to shared node state. Parents own their children; children refer
//! back to their parent weakly. Transforms, opacity and cache bounds are memoized [`Computed`]
//! values that recompute only after one of their inputs changes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::animation::ease::Ease;
use crate::animation::task::{BoxTask, run, sequence};
use crate::code::scope::CodeScope;
use crate::foundation::color::Color;
use crate::foundation::core::{Affine, BezPath, Point, Rect, Spacing, Vec2};
use crate::render::effects::{CompositeOp, Filter, Shader};
use crate::scene::element::{Element, NodeKind};
use crate::scene::props::{NodeState, properties_of};
use crate::scene::registry::{Scene, SceneInner, Unregister};
use crate::signal::signal::{Computed, Signal, SignalValue};
use crate::transform::affine::{
    local_matrix, rotation_degrees, scale_of, transform_angle, transform_point,
};
use crate::transform::linear::clamp01;

/// Transform, compositing and effect signals every node has.
pub struct NodeProps {
    pub position: Signal<Vec2>,
    /// Degrees.
    pub rotation: Signal<f64>,
    pub scale: Signal<Vec2>,
    /// Degrees along each axis.
    pub skew: Signal<Vec2>,
    pub z_index: Signal<f64>,
    pub cache: Signal<bool>,
    pub cache_padding: Signal<Spacing>,
    /// Makes this node the composite root of its subtree.
    pub composite: Signal<bool>,
    pub composite_operation: Signal<CompositeOp>,
    /// Clamped to `[0, 1]`.
    pub opacity: Signal<f64>,
    pub filters: Signal<Vec<Filter>>,
    pub shadow_color: Signal<Color>,
    pub shadow_blur: Signal<f64>,
    pub shadow_offset: Signal<Vec2>,
    pub shaders: Signal<Vec<Shader>>,
}

impl NodeProps {
    fn new() -> Self {
        Self {
            position: Signal::new(Vec2::ZERO),
            rotation: Signal::new(0.0),
            scale: Signal::new(Vec2::new(1.0, 1.0)),
            skew: Signal::new(Vec2::ZERO),
            z_index: Signal::new(0.0),
            cache: Signal::new(false),
            cache_padding: Signal::new(Spacing::ZERO),
            composite: Signal::new(false),
            composite_operation: Signal::new(CompositeOp::SourceOver),
            opacity: Signal::with_parser(1.0, clamp01),
            filters: Signal::new(Vec::new()),
            shadow_color: Signal::new(Color::TRANSPARENT),
            shadow_blur: Signal::new(0.0),
            shadow_offset: Signal::new(Vec2::ZERO),
            shaders: Signal::new(Vec::new()),
        }
    }
}

pub(crate) struct Computeds {
    pub(crate) local_to_parent: Computed<Affine>,
    pub(crate) local_to_world: Computed<Affine>,
    pub(crate) world_to_local: Computed<Affine>,
    pub(crate) parent_to_world: Computed<Affine>,
    pub(crate) world_to_parent: Computed<Affine>,
    pub(crate) absolute_opacity: Computed<f64>,
    pub(crate) composite_root: Computed<Option<WeakNode>>,
    pub(crate) composite_to_world: Computed<Affine>,
    pub(crate) composite_to_local: Computed<Affine>,
    pub(crate) sorted_children: Computed<Vec<Node>>,
    pub(crate) has_filters: Computed<bool>,
    pub(crate) has_shadow: Computed<bool>,
    pub(crate) filter_string: Computed<Option<String>>,
    pub(crate) requires_cache: Computed<bool>,
    pub(crate) cache_bbox: Computed<Rect>,
    pub(crate) full_cache_bbox: Computed<Rect>,
    pub(crate) world_space_cache_bbox: Computed<Rect>,
}

fn derive<T: Clone + 'static>(
    weak: &Weak<NodeInner>,
    fallback: T,
    compute: fn(&Node) -> T,
) -> Computed<T> {
    let weak = weak.clone();
    Computed::new(move || match weak.upgrade() {
        Some(inner) => compute(&Node(inner)),
        None => fallback.clone(),
    })
}

impl Computeds {
    fn new(weak: &Weak<NodeInner>) -> Self {
        Self {
            local_to_parent: derive(weak, Affine::IDENTITY, |n| {
                local_matrix(
                    n.position().get(),
                    n.rotation().get(),
                    n.scale().get(),
                    n.skew().get(),
                )
            }),
            local_to_world: derive(weak, Affine::IDENTITY, |n| match n.parent() {
                Some(parent) => parent.local_to_world() * n.local_to_parent(),
                None => n.local_to_parent(),
            }),
            world_to_local: derive(weak, Affine::IDENTITY, |n| n.local_to_world().inverse()),
            parent_to_world: derive(weak, Affine::IDENTITY, |n| {
                n.parent()
                    .map_or(Affine::IDENTITY, |parent| parent.local_to_world())
            }),
            world_to_parent: derive(weak, Affine::IDENTITY, |n| {
                n.parent()
                    .map_or(Affine::IDENTITY, |parent| parent.world_to_local())
            }),
            absolute_opacity: derive(weak, 1.0, |n| {
                n.parent().map_or(1.0, |parent| parent.absolute_opacity()) * n.opacity().get()
            }),
            composite_root: derive(weak, None, |n| {
                if n.composite().get() {
                    Some(n.downgrade())
                } else {
                    n.parent()
                        .and_then(|parent| parent.composite_root())
                        .map(|root| root.downgrade())
                }
            }),
            composite_to_world: derive(weak, Affine::IDENTITY, |n| {
                n.composite_root()
                    .map_or(Affine::IDENTITY, |root| root.local_to_world())
            }),
            composite_to_local: derive(weak, Affine::IDENTITY, |n| match n.composite_root() {
                Some(root) => root.local_to_world() * n.world_to_local(),
                None => n.world_to_local(),
            }),
            sorted_children: derive(weak, Vec::new(), |n| {
                let mut children = n.children();
                children.sort_by(|a, b| a.z_index().get().total_cmp(&b.z_index().get()));
                children
            }),
            has_filters: derive(weak, false, Node::compute_has_filters),
            has_shadow: derive(weak, false, Node::compute_has_shadow),
            filter_string: derive(weak, None, Node::compute_filter_string),
            requires_cache: derive(weak, false, Node::compute_requires_cache),
            cache_bbox: derive(weak, Rect::ZERO, Node::compute_cache_bbox),
            full_cache_bbox: derive(weak, Rect::ZERO, Node::compute_full_cache_bbox),
            world_space_cache_bbox: derive(weak, Rect::ZERO, Node::compute_world_space_cache_bbox),
        }
    }

    fn dispose(&self) {
        self.local_to_parent.dispose();
        self.local_to_world.dispose();
        self.world_to_local.dispose();
        self.parent_to_world.dispose();
        self.world_to_parent.dispose();
        self.absolute_opacity.dispose();
        self.composite_root.dispose();
        self.composite_to_world.dispose();
        self.composite_to_local.dispose();
        self.sorted_children.dispose();
        self.has_filters.dispose();
        self.has_shadow.dispose();
        self.filter_string.dispose();
        self.requires_cache.dispose();
        self.cache_bbox.dispose();
        self.full_cache_bbox.dispose();
        self.world_space_cache_bbox.dispose();
    }
}

pub(crate) struct NodeInner {
    pub(crate) key: String,
    pub(crate) scene: Weak<SceneInner>,
    pub(crate) unregister: RefCell<Option<Unregister>>,
    pub(crate) props: NodeProps,
    pub(crate) element: Element,
    pub(crate) parent: Signal<Option<WeakNode>>,
    pub(crate) children: Signal<Vec<Node>>,
    pub(crate) real_children: RefCell<Vec<Node>>,
    pub(crate) has_spawned_children: Cell<bool>,
    pub(crate) composite_override: Signal<f64>,
    pub(crate) state_stack: RefCell<Vec<NodeState>>,
    pub(crate) computed: Computeds,
}

impl Drop for NodeInner {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.get_mut().take() {
            unregister();
        }
    }
}

/// Handle to a scene graph node. Equality is identity.
#[derive(Clone)]
pub struct Node(pub(crate) Rc<NodeInner>);

#[derive(Clone)]
pub struct WeakNode(Weak<NodeInner>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl PartialEq for WeakNode {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.0.key)
            .field("kind", &self.kind())
            .finish()
    }
}

macro_rules! prop_accessors {
    ($($name:ident: $ty:ty),* $(,)?) => {
        impl Node {
            $(
                pub fn $name(&self) -> &Signal<$ty> {
                    &self.0.props.$name
                }
            )*
        }
    };
}

prop_accessors! {
    position: Vec2,
    rotation: f64,
    scale: Vec2,
    skew: Vec2,
    z_index: f64,
    cache: bool,
    cache_padding: Spacing,
    composite: bool,
    composite_operation: CompositeOp,
    opacity: f64,
    filters: Vec<Filter>,
    shadow_color: Color,
    shadow_blur: f64,
    shadow_offset: Vec2,
    shaders: Vec<Shader>,
}

impl Node {
    /// Create a node, register it with `scene` and attach its initial children.
    ///
    /// A taken `key` is replaced by a generated one (the scene logs the collision).
    pub fn create(scene: &Scene, element: Element, key: Option<&str>) -> Node {
        Self::with_children(scene, element, key, Vec::new())
    }

    pub fn with_children(
        scene: &Scene,
        element: Element,
        key: Option<&str>,
        children: Vec<Node>,
    ) -> Node {
        Self::build(scene, element, key, children, true)
    }

    /// `validate` enables the warnings about missing line points and image sources.
    pub(crate) fn build(
        scene: &Scene,
        element: Element,
        key: Option<&str>,
        children: Vec<Node>,
        validate: bool,
    ) -> Node {
        let kind = element.kind();
        let node = Self::register(scene.downgrade(), element, |weak| {
            scene.register_node(weak, kind, key)
        });
        let has_children = !children.is_empty();
        if has_children {
            node.set_children(children);
        }
        node.attach(validate && !has_children, validate);
        node
    }

    /// Allocate the node state; `register` receives the node's weak handle and returns its key.
    pub(crate) fn register(
        scene: Weak<SceneInner>,
        element: Element,
        register: impl FnOnce(WeakNode) -> (String, Unregister),
    ) -> Node {
        Node(Rc::new_cyclic(|weak: &Weak<NodeInner>| {
            let (key, unregister) = register(WeakNode(weak.clone()));
            NodeInner {
                key,
                scene,
                unregister: RefCell::new(Some(unregister)),
                props: NodeProps::new(),
                element,
                parent: Signal::new(None),
                children: Signal::new(Vec::new()),
                real_children: RefCell::new(Vec::new()),
                has_spawned_children: Cell::new(false),
                composite_override: Signal::new(0.0),
                state_stack: RefCell::new(Vec::new()),
                computed: Computeds::new(weak),
            }
        }))
    }

    fn attach(&self, childless: bool, validate: bool) {
        match self.element() {
            Element::Line(line) if childless && line.points.peek().is_none() => {
                tracing::warn!(
                    inspect = %self.key(),
                    remarks = "Provide the points either through the points property or as children positions.",
                    "No points specified for the line"
                );
            }
            Element::Img(img) if validate && img.src.peek().is_none() => {
                tracing::warn!(
                    inspect = %self.key(),
                    remarks = "Set the src property to an image path or URL.",
                    "No source specified for the image"
                );
            }
            Element::Svg(svg) => svg.attach(self),
            _ => {}
        }
    }

    pub fn group(scene: &Scene) -> Node {
        Self::create(scene, Element::Group, None)
    }

    pub fn rect(scene: &Scene, size: Vec2) -> Node {
        Self::create(scene, Element::rect(size), None)
    }

    pub fn circle(scene: &Scene, size: Vec2) -> Node {
        Self::create(scene, Element::circle(size), None)
    }

    pub fn path(scene: &Scene, data: BezPath) -> Node {
        Self::create(scene, Element::path(data), None)
    }

    pub fn line(scene: &Scene, points: Vec<Point>) -> Node {
        Self::create(scene, Element::line(Some(points)), None)
    }

    /// A line running through the positions of `children`.
    pub fn line_through(scene: &Scene, children: Vec<Node>) -> Node {
        Self::with_children(scene, Element::line(None), None, children)
    }

    pub fn img(scene: &Scene, src: impl Into<String>) -> Node {
        Self::create(scene, Element::img(Some(src.into())), None)
    }

    pub fn code(scene: &Scene, code: impl Into<CodeScope>) -> Node {
        Self::create(scene, Element::code(code.into()), None)
    }

    pub fn svg(scene: &Scene, svg: impl Into<String>) -> Node {
        Self::create(scene, Element::svg(svg.into()), None)
    }

    pub fn key(&self) -> &str {
        &self.0.key
    }

    pub fn kind(&self) -> NodeKind {
        self.0.element.kind()
    }

    pub fn element(&self) -> &Element {
        &self.0.element
    }

    pub fn scene(&self) -> Option<Scene> {
        self.0.scene.upgrade().map(Scene::from_inner)
    }

    /// The view at the root of this node's scene.
    pub fn view(&self) -> Option<Node> {
        self.scene().map(|scene| scene.get_view())
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        self == other
    }

    /// Current parent, subscribing the running computation.
    pub fn parent(&self) -> Option<Node> {
        self.0.parent.get().and_then(|weak| weak.upgrade())
    }

    pub fn peek_parent(&self) -> Option<Node> {
        self.0.parent.peek().and_then(|weak| weak.upgrade())
    }

    pub(crate) fn set_parent(&self, parent: Option<&Node>) {
        self.0.parent.set(parent.map(Node::downgrade));
    }

    pub fn local_to_parent(&self) -> Affine {
        self.0.computed.local_to_parent.get()
    }

    pub fn local_to_world(&self) -> Affine {
        self.0.computed.local_to_world.get()
    }

    pub fn world_to_local(&self) -> Affine {
        self.0.computed.world_to_local.get()
    }

    pub fn parent_to_world(&self) -> Affine {
        self.0.computed.parent_to_world.get()
    }

    pub fn world_to_parent(&self) -> Affine {
        self.0.computed.world_to_parent.get()
    }

    pub fn absolute_opacity(&self) -> f64 {
        self.0.computed.absolute_opacity.get()
    }

    /// Nearest node (this one included) with `composite` set.
    pub fn composite_root(&self) -> Option<Node> {
        self.0
            .computed
            .composite_root
            .get()
            .and_then(|weak| weak.upgrade())
    }

    pub fn composite_to_world(&self) -> Affine {
        self.0.computed.composite_to_world.get()
    }

    pub fn composite_to_local(&self) -> Affine {
        self.0.computed.composite_to_local.get()
    }

    pub fn composite_override(&self) -> &Signal<f64> {
        &self.0.composite_override
    }

    pub fn absolute_position(&self) -> Vec2 {
        transform_point(self.parent_to_world(), self.position().get())
    }

    /// Set the world-space position. A reactive value keeps the node following it.
    pub fn set_absolute_position(&self, value: impl Into<SignalValue<Vec2>>) {
        match value.into() {
            SignalValue::Value(v) => self
                .position()
                .set(transform_point(self.world_to_parent(), v)),
            SignalValue::Reactive(producer) => {
                let this = self.downgrade();
                self.position().set(SignalValue::reactive(move || {
                    let v = producer();
                    this.upgrade()
                        .map_or(v, |node| transform_point(node.world_to_parent(), v))
                }));
            }
        }
    }

    /// World-space rotation in degrees.
    pub fn absolute_rotation(&self) -> f64 {
        rotation_degrees(self.local_to_world())
    }

    pub fn set_absolute_rotation(&self, value: impl Into<SignalValue<f64>>) {
        match value.into() {
            SignalValue::Value(v) => self
                .rotation()
                .set(transform_angle(v, self.world_to_parent())),
            SignalValue::Reactive(producer) => {
                let this = self.downgrade();
                self.rotation().set(SignalValue::reactive(move || {
                    let v = producer();
                    this.upgrade()
                        .map_or(v, |node| transform_angle(v, node.world_to_parent()))
                }));
            }
        }
    }

    pub fn absolute_scale(&self) -> Vec2 {
        scale_of(self.local_to_world())
    }

    pub fn set_absolute_scale(&self, value: impl Into<SignalValue<Vec2>>) {
        match value.into() {
            SignalValue::Value(v) => self.scale().set(self.relative_scale(v)),
            SignalValue::Reactive(producer) => {
                let this = self.downgrade();
                self.scale().set(SignalValue::reactive(move || {
                    let v = producer();
                    this.upgrade().map_or(v, |node| node.relative_scale(v))
                }));
            }
        }
    }

    fn relative_scale(&self, scale: Vec2) -> Vec2 {
        let parent = self
            .parent()
            .map_or(Vec2::new(1.0, 1.0), |parent| parent.absolute_scale());
        Vec2::new(scale.x / parent.x, scale.y / parent.y)
    }

    /// Crossfade to another composite operation.
    ///
    /// Switching back to `SourceOver` fades the override in before switching; any other operation
    /// is switched immediately while the override fades out.
    pub fn tween_composite_operation(&self, to: CompositeOp, duration: f64, ease: Ease) -> BoxTask {
        let overlay = self.0.composite_override.clone();
        let operation = self.composite_operation().clone();
        if to == CompositeOp::SourceOver {
            let fade = overlay.tween(1.0, duration, ease).boxed();
            let switch: BoxTask = Box::new(run(move || {
                overlay.set(0.0);
                operation.set(to);
            }));
            Box::new(sequence([fade, switch]))
        } else {
            let switch: BoxTask = {
                let overlay = overlay.clone();
                Box::new(run(move || {
                    operation.set(to);
                    overlay.set(1.0);
                }))
            };
            let fade = overlay.tween(0.0, duration, ease).boxed();
            Box::new(sequence([switch, fade]))
        }
    }

    /// Queue every image this subtree needs with the scene's image pool.
    pub fn collect_async_resources(&self) {
        if let Some(drawable) = self.element().drawable() {
            drawable.collect_async_resources(self);
        }
        for child in self.children() {
            child.collect_async_resources();
        }
    }

    /// Load every pending resource of this subtree. Returns the number of images loaded.
    pub fn to_ready(&self) -> usize {
        let Some(scene) = self.scene() else {
            return 0;
        };
        let mut loaded = 0;
        loop {
            loaded += scene.image_pool().drain_pending();
            self.collect_async_resources();
            if !scene.image_pool().has_pending() {
                break;
            }
        }
        loaded
    }

    /// Unregister the node, release its signals and dispose its children. Idempotent.
    pub fn dispose(&self) {
        let Some(unregister) = self.0.unregister.borrow_mut().take() else {
            return;
        };
        self.0.state_stack.borrow_mut().clear();
        unregister();
        for descriptor in properties_of(self.kind()) {
            if let Some(signal) = descriptor.signal(self) {
                signal.dispose();
            }
        }
        self.0.element.dispose_internal();
        self.0.composite_override.dispose();
        self.0.computed.dispose();
        self.0.children.dispose();
        let children = self.0.real_children.borrow().clone();
        for child in children {
            child.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.0.unregister.borrow().is_none()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
