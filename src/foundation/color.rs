use std::str::FromStr;

use crate::foundation::error::{VignetteError, VignetteResult};

/// Straight (non-premultiplied) RGBA color with channels in `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            f64::from(a) / 255.0,
        )
    }

    /// Parse any CSS color accepted by SVG (`#rgb`, `rgb()`, named colors, ...).
    pub fn parse(text: &str) -> VignetteResult<Self> {
        let c = svgtypes::Color::from_str(text.trim())
            .map_err(|e| VignetteError::parse(format!("invalid color {text:?}: {e}")))?;
        Ok(Self::from_rgba8(c.red, c.green, c.blue, c.alpha))
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        fn ch(v: f64) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [ch(self.r), ch(self.g), ch(self.b), ch(self.a)]
    }

    pub fn serialize_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
