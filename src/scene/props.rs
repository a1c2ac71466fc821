//! Static property registry.
//!
//! Every node kind exposes a fixed table of [`PropertyDescriptor`]s. Cloning, state snapshots and
//! state tweens iterate those tables instead of reflecting over the node.

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::animation::ease::Ease;
use crate::animation::lerp::Lerp;
use crate::animation::task::BoxTask;
use crate::code::range::CodeRange;
use crate::code::scope::{CodeScope, ScopeSide, resolve_scope};
use crate::foundation::color::Color;
use crate::foundation::core::{BezPath, Point, Spacing, Vec2};
use crate::render::effects::{CompositeOp, Filter, Shader};
use crate::scene::element::{Element, NodeKind};
use crate::scene::node::Node;
use crate::signal::signal::{Signal, SignalValue};

/// Type-erased value of a single node property.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropValue {
    Number(f64),
    Vector(Vec2),
    Flag(bool),
    Color(Color),
    Paint(Option<Color>),
    Text(String),
    OptionalText(Option<String>),
    Spacing(Spacing),
    Composite(CompositeOp),
    Filters(Vec<Filter>),
    Shaders(Vec<Shader>),
    Points(Option<Vec<Point>>),
    /// SVG path data.
    Path(String),
    Selection(Vec<CodeRange>),
    Code(String),
}

/// Snapshot of a node's cloneable properties, keyed by property name.
pub type NodeState = BTreeMap<String, PropValue>;

/// A value type that can be stored in a node property.
pub trait PropType: Clone + Default + Lerp + 'static {
    fn into_prop(self) -> PropValue;
    fn from_prop(value: PropValue) -> Option<Self>;
}

macro_rules! prop_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl PropType for $ty {
                fn into_prop(self) -> PropValue {
                    PropValue::$variant(self)
                }

                fn from_prop(value: PropValue) -> Option<Self> {
                    match value {
                        PropValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

prop_type! {
    f64 => Number,
    Vec2 => Vector,
    bool => Flag,
    Color => Color,
    Option<Color> => Paint,
    String => Text,
    Option<String> => OptionalText,
    Spacing => Spacing,
    CompositeOp => Composite,
    Vec<Filter> => Filters,
    Vec<Shader> => Shaders,
    Option<Vec<Point>> => Points,
    Vec<CodeRange> => Selection,
}

impl PropType for BezPath {
    fn into_prop(self) -> PropValue {
        PropValue::Path(self.to_svg())
    }

    fn from_prop(value: PropValue) -> Option<Self> {
        match value {
            PropValue::Path(data) => match BezPath::from_svg(&data) {
                Ok(path) => Some(path),
                Err(error) => {
                    tracing::warn!(data = %data, error = %error, "invalid path data in property value");
                    None
                }
            },
            _ => None,
        }
    }
}

impl PropType for CodeScope {
    fn into_prop(self) -> PropValue {
        PropValue::Code(resolve_scope(&self, ScopeSide::AtProgress))
    }

    fn from_prop(value: PropValue) -> Option<Self> {
        match value {
            PropValue::Code(code) => Some(CodeScope::from(code)),
            _ => None,
        }
    }
}

/// Uniform access to a property signal regardless of its value type.
pub trait PropertyAccess {
    /// Current value; reading subscribes the running computation.
    fn value(&self) -> PropValue;
    /// Returns `false` when `value` has the wrong variant.
    fn set_value(&self, value: PropValue) -> bool;
    fn set_reactive(&self, producer: Rc<dyn Fn() -> PropValue>);
    /// Copy the raw value (plain or reactive) of a signal of the same type.
    fn copy_raw_from(&self, other: &dyn PropertyAccess) -> bool;
    fn is_initial(&self) -> bool;
    fn tween_to(&self, value: PropValue, duration: f64, ease: Ease) -> Option<BoxTask>;
    fn dispose(&self);
    fn as_any(&self) -> &dyn Any;
}

impl<T: PropType> PropertyAccess for Signal<T> {
    fn value(&self) -> PropValue {
        self.get().into_prop()
    }

    fn set_value(&self, value: PropValue) -> bool {
        match T::from_prop(value) {
            Some(v) => {
                self.set(v);
                true
            }
            None => false,
        }
    }

    fn set_reactive(&self, producer: Rc<dyn Fn() -> PropValue>) {
        self.set(SignalValue::reactive(move || {
            T::from_prop(producer()).unwrap_or_default()
        }));
    }

    fn copy_raw_from(&self, other: &dyn PropertyAccess) -> bool {
        match other.as_any().downcast_ref::<Signal<T>>() {
            Some(source) => {
                self.set(source.raw());
                true
            }
            None => false,
        }
    }

    fn is_initial(&self) -> bool {
        Signal::is_initial(self)
    }

    fn tween_to(&self, value: PropValue, duration: f64, ease: Ease) -> Option<BoxTask> {
        let target = T::from_prop(value)?;
        Some(self.tween(target, duration, ease).boxed())
    }

    fn dispose(&self) {
        Signal::dispose(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type PropertyGetter = fn(&Node) -> Option<&dyn PropertyAccess>;

/// Metadata record for one property of a node kind.
#[derive(Clone, Copy)]
pub struct PropertyDescriptor {
    pub key: &'static str,
    /// Copied by `clone` and included in `get_state`.
    pub cloneable: bool,
    /// Shown by inspection tooling.
    pub inspectable: bool,
    pub access: PropertyGetter,
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("key", &self.key)
            .field("cloneable", &self.cloneable)
            .field("inspectable", &self.inspectable)
            .finish()
    }
}

impl PropertyDescriptor {
    pub fn signal<'a>(&self, node: &'a Node) -> Option<&'a dyn PropertyAccess> {
        (self.access)(node)
    }
}

macro_rules! descriptor {
    ($key:literal, |$node:ident| $body:expr) => {
        descriptor!($key, cloneable = true, |$node| $body)
    };
    ($key:literal, cloneable = $cloneable:expr, |$node:ident| $body:expr) => {{
        fn access($node: &Node) -> Option<&dyn PropertyAccess> {
            $body
        }
        PropertyDescriptor {
            key: $key,
            cloneable: $cloneable,
            inspectable: true,
            access,
        }
    }};
}

macro_rules! element_prop {
    ($node:ident, $variant:ident, |$data:ident| $field:expr) => {
        match $node.element() {
            Element::$variant($data) => Some(&$field as &dyn PropertyAccess),
            _ => None,
        }
    };
}

macro_rules! style_prop {
    ($node:ident, $field:ident) => {
        $node
            .element()
            .style()
            .map(|style| &style.$field as &dyn PropertyAccess)
    };
}

pub static NODE_PROPERTIES: &[PropertyDescriptor] = &[
    descriptor!("position", |node| Some(node.position() as &dyn PropertyAccess)),
    descriptor!("rotation", |node| Some(node.rotation() as &dyn PropertyAccess)),
    descriptor!("scale", |node| Some(node.scale() as &dyn PropertyAccess)),
    descriptor!("skew", |node| Some(node.skew() as &dyn PropertyAccess)),
    descriptor!("z_index", |node| Some(node.z_index() as &dyn PropertyAccess)),
    descriptor!("cache", |node| Some(node.cache() as &dyn PropertyAccess)),
    descriptor!("cache_padding", |node| Some(node.cache_padding() as &dyn PropertyAccess)),
    descriptor!("composite", |node| Some(node.composite() as &dyn PropertyAccess)),
    descriptor!("composite_operation", |node| Some(node.composite_operation() as &dyn PropertyAccess)),
    descriptor!("opacity", |node| Some(node.opacity() as &dyn PropertyAccess)),
    descriptor!("filters", |node| Some(node.filters() as &dyn PropertyAccess)),
    descriptor!("shadow_color", |node| Some(node.shadow_color() as &dyn PropertyAccess)),
    descriptor!("shadow_blur", |node| Some(node.shadow_blur() as &dyn PropertyAccess)),
    descriptor!("shadow_offset", |node| Some(node.shadow_offset() as &dyn PropertyAccess)),
    descriptor!("shaders", |node| Some(node.shaders() as &dyn PropertyAccess)),
];

pub static SHAPE_PROPERTIES: &[PropertyDescriptor] = &[
    descriptor!("fill", |node| style_prop!(node, fill)),
    descriptor!("stroke", |node| style_prop!(node, stroke)),
    descriptor!("line_width", |node| style_prop!(node, line_width)),
    descriptor!("size", |node| style_prop!(node, size)),
    descriptor!("start", |node| style_prop!(node, start)),
    descriptor!("end", |node| style_prop!(node, end)),
];

static VIEW_PROPERTIES: &[PropertyDescriptor] = &[
    descriptor!("size", |node| element_prop!(node, View, |view| view.size)),
    descriptor!("asset_hash", cloneable = false, |node| element_prop!(
        node,
        View,
        |view| view.asset_hash
    )),
];

static RECT_PROPERTIES: &[PropertyDescriptor] =
    &[descriptor!("radius", |node| element_prop!(node, Rect, |rect| rect.radius))];

static PATH_PROPERTIES: &[PropertyDescriptor] =
    &[descriptor!("data", |node| element_prop!(node, Path, |path| path.data))];

static LINE_PROPERTIES: &[PropertyDescriptor] = &[
    descriptor!("points", |node| element_prop!(node, Line, |line| line.points)),
    descriptor!("radius", |node| element_prop!(node, Line, |line| line.radius)),
    descriptor!("closed", |node| element_prop!(node, Line, |line| line.closed)),
];

static IMG_PROPERTIES: &[PropertyDescriptor] = &[
    descriptor!("src", |node| element_prop!(node, Img, |img| img.src)),
    descriptor!("alpha", |node| element_prop!(node, Img, |img| img.alpha)),
    descriptor!("smoothing", |node| element_prop!(node, Img, |img| img.smoothing)),
];

static CODE_PROPERTIES: &[PropertyDescriptor] = &[
    descriptor!("code", |node| element_prop!(node, Code, |code| code.code)),
    descriptor!("selection", |node| element_prop!(node, Code, |code| code.selection)),
];

static SVG_PROPERTIES: &[PropertyDescriptor] =
    &[descriptor!("svg", |node| element_prop!(node, Svg, |svg| svg.svg))];

/// Every property of `kind`: node properties first, then shape style, then kind-specific ones.
pub fn properties_of(kind: NodeKind) -> impl Iterator<Item = &'static PropertyDescriptor> {
    let (shape, own): (&'static [PropertyDescriptor], &'static [PropertyDescriptor]) = match kind {
        NodeKind::Group => (&[], &[]),
        NodeKind::View => (&[], VIEW_PROPERTIES),
        NodeKind::Rect => (SHAPE_PROPERTIES, RECT_PROPERTIES),
        NodeKind::Circle => (SHAPE_PROPERTIES, &[]),
        NodeKind::Path => (SHAPE_PROPERTIES, PATH_PROPERTIES),
        NodeKind::Line => (SHAPE_PROPERTIES, LINE_PROPERTIES),
        NodeKind::Img => (SHAPE_PROPERTIES, IMG_PROPERTIES),
        NodeKind::Code => (&[], CODE_PROPERTIES),
        NodeKind::Svg => (SHAPE_PROPERTIES, SVG_PROPERTIES),
    };
    NODE_PROPERTIES.iter().chain(shape).chain(own)
}

pub fn property_by_key(kind: NodeKind, key: &str) -> Option<&'static PropertyDescriptor> {
    properties_of(kind).find(|d| d.key == key)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/props.rs"]
mod tests;
