//! Scaled image drawing.
//!
//! Drawing uses inverse mapping: for each surface pixel whose center falls in
//! the destination rectangle, compute the source coordinate and sample it.
//!
//! ```text
//! src_x = (dst_x + 0.5 - rect.x) / rect.width  * image.width  - 0.5
//! src_y = (dst_y + 0.5 - rect.y) / rect.height * image.height - 0.5
//! ```
//!
//! Source coordinates are clamped to the image edge, so the border pixels
//! stretch rather than fade to black.

use super::{InterpolationFilter, Surface};
use crate::decode::DecodedImage;

/// Destination rectangle in surface pixels. May extend past the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the point is inside (right/bottom edges exclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Draw the whole `image` scaled into `rect`, blending source-over.
///
/// Degenerate rectangles and empty images draw nothing.
pub fn draw_image(
    surface: &mut Surface,
    image: &DecodedImage,
    rect: DrawRect,
    filter: InterpolationFilter,
) {
    if image.width == 0 || image.height == 0 || !image.is_valid() {
        return;
    }
    if !(rect.width > 0.0 && rect.height > 0.0) || !rect.x.is_finite() || !rect.y.is_finite() {
        return;
    }

    let (sw, sh) = surface.size_f64();
    let x0 = rect.x.max(0.0).floor() as u32;
    let y0 = rect.y.max(0.0).floor() as u32;
    let x1 = rect.right().min(sw).ceil().max(0.0) as u32;
    let y1 = rect.bottom().min(sh).ceil().max(0.0) as u32;

    let scale_x = image.width as f64 / rect.width;
    let scale_y = image.height as f64 / rect.height;

    for py in y0..y1 {
        let cy = py as f64 + 0.5;
        for px in x0..x1 {
            let cx = px as f64 + 0.5;
            if !rect.contains(cx, cy) {
                continue;
            }

            let src_x = (cx - rect.x) * scale_x - 0.5;
            let src_y = (cy - rect.y) * scale_y - 0.5;

            let color = match filter {
                InterpolationFilter::Nearest => sample_nearest(image, src_x, src_y),
                InterpolationFilter::Bilinear => sample_bilinear(image, src_x, src_y),
            };
            surface.blend_pixel(px, py, color);
        }
    }
}

/// Sample the closest source pixel.
fn sample_nearest(image: &DecodedImage, x: f64, y: f64) -> [f64; 4] {
    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let sx = x.round().clamp(0.0, max_x) as usize;
    let sy = y.round().clamp(0.0, max_y) as usize;
    image.pixel(sx, sy)
}

/// Sample a pixel using bilinear interpolation.
///
/// Bilinear interpolation considers the 4 nearest pixels and weights
/// their contribution based on distance.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [f64; 4] {
    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut result = [0.0f64; 4];
    for i in 0..4 {
        result[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }
    result
}
