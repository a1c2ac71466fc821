use std::sync::Arc;

use anyhow::Context;

use crate::foundation::color::Color;
use crate::foundation::error::{VignetteError, VignetteResult};

/// Decoded raster image, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl ImageData {
    /// Straight-alpha color of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel_color(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.rgba8_premul.get(i..i + 4)?;
        let a = px[3];
        if a == 0 {
            return Some(Color::TRANSPARENT);
        }
        let unmul = |c: u8| ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
        Some(Color::from_rgba8(unmul(px[0]), unmul(px[1]), unmul(px[2]), a))
    }
}

/// Decode PNG, JPEG, GIF, WebP or BMP bytes for the image pool.
pub fn decode_image(bytes: &[u8]) -> VignetteResult<ImageData> {
    let decoded = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .into_rgba8();
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(VignetteError::validation("decoded image has no pixels"));
    }

    let mut pixels = decoded.into_raw();
    for px in pixels.chunks_exact_mut(4) {
        let alpha = px[3];
        for channel in &mut px[..3] {
            *channel = premultiply(*channel, alpha);
        }
    }
    tracing::trace!(width, height, "image decoded");

    Ok(ImageData {
        width,
        height,
        rgba8_premul: Arc::new(pixels),
    })
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
