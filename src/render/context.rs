//! The drawing surface nodes render into.
//!
//! `Context2d` is the host's canvas: transforms and compositing state are stacked with
//! `save`/`restore`, and offscreen layers back cached nodes.

use kurbo::Stroke;

use crate::assets::decode::ImageData;
use crate::foundation::color::Color;
use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::VignetteResult;
use crate::render::effects::{CompositeOp, Shader, Shadow};
use crate::render::recording::DrawCommand;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "monospace".to_owned(),
            size: 48.0,
        }
    }
}

/// Finished offscreen layer, ready to be composited with [`Context2d::draw_layer`].
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

pub trait Context2d {
    fn save(&mut self);
    fn restore(&mut self);

    /// Post-multiply the current transform.
    fn transform(&mut self, m: Affine);
    fn set_transform(&mut self, m: Affine);
    fn current_transform(&self) -> Affine;

    fn global_alpha(&self) -> f64;
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_composite_op(&mut self, op: CompositeOp);
    /// CSS filter string; `None` disables filtering.
    fn set_filter(&mut self, filter: Option<&str>);
    fn set_shadow(&mut self, shadow: &Shadow);

    fn fill_path(&mut self, path: &BezPath, paint: Color);
    fn stroke_path(&mut self, path: &BezPath, paint: Color, stroke: &Stroke);
    fn clip(&mut self, path: &BezPath);
    fn fill_text(&mut self, text: &str, origin: Point, font: &Font, paint: Color);
    /// Advance width of `text`.
    fn measure_text(&self, text: &str, font: &Font) -> f64;
    fn draw_image(&mut self, image: &ImageData, dest: Rect, smoothing: bool);

    /// Allocate an offscreen layer of the given pixel size. Hosts that cannot provide one
    /// return a resource error.
    fn create_layer(&self, width: u32, height: u32) -> VignetteResult<Box<dyn Context2d>>;
    fn finish_layer(self: Box<Self>) -> Layer;
    /// Composite `layer` with its top-left corner at `origin`, after running `shaders` on it.
    fn draw_layer(&mut self, layer: &Layer, origin: Point, shaders: &[Shader]);
}
