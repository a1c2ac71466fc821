//! Display-list implementation of [`Context2d`] for headless hosts and tests.

use kurbo::Stroke;

use crate::assets::decode::ImageData;
use crate::foundation::color::Color;
use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::{VignetteError, VignetteResult};
use crate::render::context::{Context2d, Font, Layer};
use crate::render::effects::{CompositeOp, Shader, Shadow};

/// Width of one character relative to the font size.
const MONO_ADVANCE: f64 = 0.6;

/// Compositing state captured with every draw command.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawState {
    pub transform: Affine,
    pub alpha: f64,
    pub composite: CompositeOp,
    pub filter: Option<String>,
    pub shadow: Shadow,
    pub clipped: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            composite: CompositeOp::SourceOver,
            filter: None,
            shadow: Shadow::default(),
            clipped: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillPath {
        path: BezPath,
        paint: Color,
        state: DrawState,
    },
    StrokePath {
        path: BezPath,
        paint: Color,
        width: f64,
        state: DrawState,
    },
    FillText {
        text: String,
        origin: Point,
        font: Font,
        paint: Color,
        state: DrawState,
    },
    Image {
        width: u32,
        height: u32,
        dest: Rect,
        smoothing: bool,
        state: DrawState,
    },
    Layer {
        layer: Layer,
        origin: Point,
        shaders: Vec<Shader>,
        state: DrawState,
    },
}

impl DrawCommand {
    pub fn state(&self) -> &DrawState {
        match self {
            Self::FillPath { state, .. }
            | Self::StrokePath { state, .. }
            | Self::FillText { state, .. }
            | Self::Image { state, .. }
            | Self::Layer { state, .. } => state,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordingContext {
    width: u32,
    height: u32,
    state: DrawState,
    stack: Vec<DrawState>,
    commands: Vec<DrawCommand>,
    max_layer_pixels: Option<u64>,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: DrawState::default(),
            stack: Vec::new(),
            commands: Vec::new(),
            max_layer_pixels: None,
        }
    }

    /// Refuse layers larger than `pixels`; `Some(0)` refuses every layer.
    pub fn with_layer_limit(mut self, pixels: u64) -> Self {
        self.max_layer_pixels = Some(pixels);
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Number of primitive draws, including those nested in layers.
    pub fn draw_calls(&self) -> usize {
        count_draws(&self.commands)
    }

    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }
}

fn count_draws(commands: &[DrawCommand]) -> usize {
    commands
        .iter()
        .map(|c| match c {
            DrawCommand::Layer { layer, .. } => count_draws(&layer.commands),
            _ => 1,
        })
        .sum()
}

impl Context2d for RecordingContext {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&mut self, m: Affine) {
        self.state.transform *= m;
    }

    fn set_transform(&mut self, m: Affine) {
        self.state.transform = m;
    }

    fn current_transform(&self) -> Affine {
        self.state.transform
    }

    fn global_alpha(&self) -> f64 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_composite_op(&mut self, op: CompositeOp) {
        self.state.composite = op;
    }

    fn set_filter(&mut self, filter: Option<&str>) {
        self.state.filter = filter.map(str::to_owned);
    }

    fn set_shadow(&mut self, shadow: &Shadow) {
        self.state.shadow = *shadow;
    }

    fn fill_path(&mut self, path: &BezPath, paint: Color) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            paint,
            state: self.state.clone(),
        });
    }

    fn stroke_path(&mut self, path: &BezPath, paint: Color, stroke: &Stroke) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            paint,
            width: stroke.width,
            state: self.state.clone(),
        });
    }

    fn clip(&mut self, _path: &BezPath) {
        self.state.clipped = true;
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &Font, paint: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            origin,
            font: font.clone(),
            paint,
            state: self.state.clone(),
        });
    }

    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        text.chars().count() as f64 * font.size * MONO_ADVANCE
    }

    fn draw_image(&mut self, image: &ImageData, dest: Rect, smoothing: bool) {
        self.commands.push(DrawCommand::Image {
            width: image.width,
            height: image.height,
            dest,
            smoothing,
            state: self.state.clone(),
        });
    }

    fn create_layer(&self, width: u32, height: u32) -> VignetteResult<Box<dyn Context2d>> {
        let pixels = u64::from(width) * u64::from(height);
        if let Some(limit) = self.max_layer_pixels
            && pixels > limit
        {
            return Err(VignetteError::resource(format!(
                "cannot allocate {width}x{height} cache layer"
            )));
        }
        let mut layer = RecordingContext::new(width, height);
        layer.max_layer_pixels = self.max_layer_pixels;
        Ok(Box::new(layer))
    }

    fn finish_layer(self: Box<Self>) -> Layer {
        Layer {
            width: self.width,
            height: self.height,
            commands: self.commands,
        }
    }

    fn draw_layer(&mut self, layer: &Layer, origin: Point, shaders: &[Shader]) {
        self.commands.push(DrawCommand::Layer {
            layer: layer.clone(),
            origin,
            shaders: shaders.to_vec(),
            state: self.state.clone(),
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
