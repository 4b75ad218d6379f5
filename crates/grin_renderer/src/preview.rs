//! Raster preview of a field's IOR-versus-radius curve.
//!
//! Column `x` is radius `x / (width - 1) * r_outer`. Each axis of the
//! per-axis IOR is plotted into its own color channel (X red, Y green,
//! Z blue), so an isotropic field draws a single white line.

use glam::Vec4;
use grin_core::{sample_curve, GrinField};
use grin_math::EPSILON;
use image::RgbaImage;

/// RGBA float image holding a rendered IOR curve.
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec4>,
}

impl PreviewImage {
    /// Create a new, fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    /// Plot the field's IOR curve across the full image.
    ///
    /// The vertical axis spans [`GrinField::ior_range`], bottom row lowest.
    pub fn render(field: &GrinField, width: u32, height: u32) -> Self {
        let mut image = Self::new(width, height);
        if width == 0 || height == 0 {
            return image;
        }

        let range = field.ior_range();
        let span = if range.size() > 0.0 { range.size() } else { EPSILON };
        let top = (height - 1) as f64;

        for (x, sample) in sample_curve(field, width as usize).iter().enumerate() {
            for axis in 0..3 {
                let level = ((sample.ior[axis] - range.min) / span).clamp(0.0, 1.0);
                let row = height - 1 - ((level * top) as u32).min(height - 1);
                let pixel = &mut image.pixels[pixel_index(width, x as u32, row)];
                pixel[axis] = 1.0;
                pixel.w = 1.0;
            }
        }

        image
    }

    /// Get the pixel at (x, y), with y = 0 the top row.
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[pixel_index(self.width, x, y)]
    }

    /// Convert to RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend(pixel.to_array().map(channel_to_byte));
        }
        bytes
    }

    /// Convert to an `image` crate buffer for saving or display.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.get(x, y).to_array().map(channel_to_byte))
        })
    }
}

/// Row-major offset of pixel (x, y), in `usize`.
fn pixel_index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

fn channel_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
