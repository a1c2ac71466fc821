//! Compositing state attached to nodes: composite operation, filters, shadow, shaders.

use std::collections::BTreeMap;

use crate::animation::lerp::{Lerp, step};
use crate::foundation::color::Color;
use crate::foundation::core::{Affine, Vec2};
use crate::foundation::error::{VignetteError, VignetteResult};
use crate::transform::affine::transform_scalar;

macro_rules! composite_ops {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Canvas `globalCompositeOperation` values.
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum CompositeOp {
            #[default]
            $($variant,)*
        }

        impl CompositeOp {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            pub fn parse(value: &str) -> VignetteResult<Self> {
                match value.trim() {
                    $($name => Ok(Self::$variant),)*
                    other => Err(VignetteError::parse(format!("unknown composite operation `{other}`"))),
                }
            }
        }
    };
}

composite_ops! {
    SourceOver => "source-over",
    SourceIn => "source-in",
    SourceOut => "source-out",
    SourceAtop => "source-atop",
    DestinationOver => "destination-over",
    DestinationIn => "destination-in",
    DestinationOut => "destination-out",
    DestinationAtop => "destination-atop",
    Lighter => "lighter",
    Copy => "copy",
    Xor => "xor",
    Multiply => "multiply",
    Screen => "screen",
    Overlay => "overlay",
    Darken => "darken",
    Lighten => "lighten",
    ColorDodge => "color-dodge",
    ColorBurn => "color-burn",
    HardLight => "hard-light",
    SoftLight => "soft-light",
    Difference => "difference",
    Exclusion => "exclusion",
    Hue => "hue",
    Saturation => "saturation",
    Color => "color",
    Luminosity => "luminosity",
}

impl Lerp for CompositeOp {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FilterKind {
    Blur,
    Brightness,
    Contrast,
    Grayscale,
    HueRotate,
    Invert,
    Saturate,
    Sepia,
}

impl FilterKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Grayscale => "grayscale",
            Self::HueRotate => "hue-rotate",
            Self::Invert => "invert",
            Self::Saturate => "saturate",
            Self::Sepia => "sepia",
        }
    }

    /// Value at which the filter has no effect.
    pub fn default_value(self) -> f64 {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturate => 1.0,
            _ => 0.0,
        }
    }

    fn unit(self) -> &'static str {
        match self {
            Self::Blur => "px",
            Self::HueRotate => "deg",
            _ => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Filter {
    pub kind: FilterKind,
    pub value: f64,
}

impl Filter {
    pub fn new(kind: FilterKind, value: f64) -> Self {
        Self { kind, value }
    }

    pub fn blur(value: f64) -> Self {
        Self::new(FilterKind::Blur, value)
    }

    pub fn brightness(value: f64) -> Self {
        Self::new(FilterKind::Brightness, value)
    }

    pub fn grayscale(value: f64) -> Self {
        Self::new(FilterKind::Grayscale, value)
    }

    pub fn is_active(&self) -> bool {
        self.value != self.kind.default_value()
    }

    /// CSS filter function. Blur radii are scaled by `matrix` into the target space.
    pub fn serialize(&self, matrix: Affine) -> String {
        let value = match self.kind {
            FilterKind::Blur => transform_scalar(self.value, matrix),
            _ => self.value,
        };
        format!("{}({}{})", self.kind.name(), value, self.kind.unit())
    }
}

/// Parse a filter from its kind name and value, the way node descriptions spell them.
pub fn parse_filter(kind: &str, value: f64) -> VignetteResult<Filter> {
    let kind = match kind.trim().to_ascii_lowercase().as_str() {
        "blur" => FilterKind::Blur,
        "brightness" => FilterKind::Brightness,
        "contrast" => FilterKind::Contrast,
        "grayscale" => FilterKind::Grayscale,
        "hue" | "hue-rotate" | "huerotate" => FilterKind::HueRotate,
        "invert" => FilterKind::Invert,
        "saturate" => FilterKind::Saturate,
        "sepia" => FilterKind::Sepia,
        other => return Err(VignetteError::validation(format!("unknown filter `{other}`"))),
    };
    if !value.is_finite() {
        return Err(VignetteError::validation(format!(
            "filter `{}` needs a finite value",
            kind.name()
        )));
    }
    if kind == FilterKind::Blur && value < 0.0 {
        return Err(VignetteError::validation("blur radius must be >= 0"));
    }
    Ok(Filter::new(kind, value))
}

/// Space-separated CSS filter string of the active filters, or `None` when nothing applies.
pub fn serialize_filters(filters: &[Filter], matrix: Affine) -> Option<String> {
    let active: Vec<String> = filters
        .iter()
        .filter(|f| f.is_active())
        .map(|f| f.serialize(matrix))
        .collect();
    if active.is_empty() {
        None
    } else {
        Some(active.join(" "))
    }
}

/// Total blur radius of a filter list.
pub fn blur_radius(filters: &[Filter]) -> f64 {
    filters
        .iter()
        .filter(|f| f.kind == FilterKind::Blur && f.is_active())
        .map(|f| f.value)
        .sum()
}

/// Filters are matched by kind; a filter missing on one side tweens from or to its neutral
/// value.
impl Lerp for Vec<Filter> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let mut out: Vec<Filter> = a
            .iter()
            .map(|fa| {
                let target = b
                    .iter()
                    .find(|fb| fb.kind == fa.kind)
                    .map_or(fa.kind.default_value(), |fb| fb.value);
                Filter::new(fa.kind, f64::lerp(&fa.value, &target, t))
            })
            .collect();
        for fb in b {
            if !a.iter().any(|fa| fa.kind == fb.kind) {
                out.push(Filter::new(
                    fb.kind,
                    f64::lerp(&fb.kind.default_value(), &fb.value, t),
                ));
            }
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shadow {
    pub color: Color,
    pub blur: f64,
    pub offset: Vec2,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: Color::TRANSPARENT,
            blur: 0.0,
            offset: Vec2::ZERO,
        }
    }
}

impl Shadow {
    pub fn is_active(&self) -> bool {
        !self.color.is_transparent() && (self.blur > 0.0 || self.offset != Vec2::ZERO)
    }
}

/// Fragment shader applied to a node's cached layer before it is composited.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shader {
    pub fragment: String,
    pub uniforms: BTreeMap<String, f64>,
}

impl Shader {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            uniforms: BTreeMap::new(),
        }
    }

    pub fn with_uniform(mut self, name: impl Into<String>, value: f64) -> Self {
        self.uniforms.insert(name.into(), value);
        self
    }
}

impl Lerp for Vec<Shader> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/effects.rs"]
mod tests;
