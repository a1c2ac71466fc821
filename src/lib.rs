//! Vignette is a reactive 2D scene graph for programmatic animation.
//!
//! A [`Scene`] owns a tree of [`Node`]s whose properties are [`Signal`]s. Derived values
//! (world transforms, absolute opacity, cache bounds) are memoized and recomputed only after an
//! input changes. Animations are cooperative [`Task`]s advanced frame by frame by a
//! [`Scheduler`]; besides plain value tweens they morph structure: polylines with different
//! point counts, whole SVG documents matched shape by shape, and source code diffed token by
//! token.
//!
//! # Pipeline overview
//!
//! 1. **Build**: create nodes in a [`Scene`] and wire their signals, plain or reactive.
//! 2. **Animate**: spawn tasks (`signal.tween(..)`, [`all`], [`sequence`], SVG and code tweens)
//!    on a [`Scheduler`] and [`Scheduler::tick`] once per frame.
//! 3. **Render**: [`Scene::render`] walks the tree into any [`Context2d`] host. The bundled
//!    [`RecordingContext`] keeps a display list for headless use and tests.
//!
//! Everything is single-threaded: nodes and signals are `Rc`-based and never cross threads.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod code;
mod curves;
mod foundation;
mod render;
mod scene;
mod signal;
mod svg;
/// Shared transform helpers (linear and affine utilities).
pub mod transform;

pub use animation::ease::Ease;
pub use animation::lerp::Lerp;
pub use animation::scheduler::Scheduler;
pub use animation::task::{
    All, BoxTask, Deferred, Delay, Run, Sequence, Task, TaskStatus, Tween, Wait, all, deferred,
    delay, run, sequence, wait,
};
pub use assets::decode::{ImageData, decode_image};
pub use assets::image_pool::{ImageEntry, ImageLoader, ImagePool};
pub use code::cursor::{
    CodeCursor, CodeDrawingInfo, CodeFragmentDrawInfo, CursorMetrics, SelectionState,
};
pub use code::diff::{DiffLine, PatienceDiff, patience_diff};
pub use code::edit::{
    append_scope, diff_code, insert_scope, offset_of, prepend_scope, remove_scope, replace_scope,
    tokenize,
};
pub use code::highlight::{
    CodeHighlighter, HighlightSpan, HighlightTheme, KeywordHighlighter, char_colors,
};
pub use code::range::{
    CodePattern, CodePoint, CodeRange, CodeSelection, PossibleCodeSelection,
    find_all_code_ranges, is_point_in_code_range, is_point_in_code_selection, lines,
    parse_code_selection, word,
};
pub use code::scope::{
    CodeFragment, CodeScope, CodeTag, ScopeSide, parse_code_scope, resolve_code_tag,
    resolve_scope,
};
pub use curves::interpolate::{
    PolylineLerp, calculate_lerp_distance, create_curve_profile_lerp, distribute_points,
    polygon_length, polygon_points_lerp, rotate_points, sample_profile,
};
pub use curves::profile::{
    CurveProfile, circle_profile, path_profile, polyline_profile, rect_profile,
};
pub use curves::segment::{
    CircleSegment, CubicSegment, CurvePoint, LineSegment, QuadSegment, Segment,
};
pub use foundation::color::Color;
pub use foundation::core::{Affine, BBox, BezPath, Fps, Point, Rect, Size, Spacing, Vec2};
pub use foundation::error::{VignetteError, VignetteResult};
pub use render::context::{Context2d, Font, Layer};
pub use render::effects::{
    CompositeOp, Filter, FilterKind, Shader, Shadow, blur_radius, parse_filter, serialize_filters,
};
pub use render::recording::{DrawCommand, DrawState, RecordingContext};
pub use scene::code_block::{CodeData, CodeStyle};
pub use scene::element::{
    CircleData, Element, ImgData, LineData, NodeKind, PathData, RectData, ShapeStyle, ViewData,
};
pub use scene::node::{Node, NodeProps, WeakNode};
pub use scene::props::{
    NodeState, PropValue, PropertyAccess, PropertyDescriptor, properties_of, property_by_key,
};
pub use scene::registry::{Scene, SceneConfig, Unregister, VIEW_KEY};
pub use signal::signal::{Computed, Signal, SignalValue};
pub use signal::tracker::untracked;
pub use svg::diff::{SvgDiff, SvgDiffShape, SvgDocument, SvgShape, SvgTransformed, diff_svg};
pub use svg::parse::{
    SvgDocumentData, SvgPaint, SvgPool, SvgShapeData, SvgShapeKind, SvgStyle, parse_svg_data,
};
pub use svg::tween::{SvgData, SvgTweenConfig};
