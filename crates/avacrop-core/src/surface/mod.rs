//! The drawing target.
//!
//! A [`Surface`] is a fixed-size RGBA8 buffer with the two primitives the
//! renderer needs: clear and draw-image-into-rectangle. Filters read and write
//! its pixels directly.

mod draw;

use serde::{Deserialize, Serialize};

pub use draw::{draw_image, DrawRect};

/// Sampling used when the image is scaled onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Nearest neighbor - blocky when magnified, cheapest.
    Nearest,
    /// Bilinear - smooth, the canvas default.
    #[default]
    Bilinear,
}

/// Fixed-size RGBA drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a cleared surface. Dimensions are validated by the viewport options.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Surface size as floats, handy for geometry.
    pub fn size_f64(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }

    /// RGBA pixel data (4 bytes per pixel, row-major order).
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Reallocate at a new size. The content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Surface::new(width, height);
    }

    /// Read a pixel; `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(px)
    }

    /// Overwrite a pixel. Out-of-range writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Source-over blend of a straight-alpha color onto a pixel.
    pub fn blend_pixel(&mut self, x: u32, y: u32, rgba: [f64; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        let dst = &mut self.pixels[idx..idx + 4];

        let sa = (rgba[3] / 255.0).clamp(0.0, 1.0);
        let da = dst[3] as f64 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            dst.fill(0);
            return;
        }

        for c in 0..3 {
            let v = (rgba[c] * sa + dst[c] as f64 * da * (1.0 - sa)) / out_a;
            dst[c] = v.clamp(0.0, 255.0).round() as u8;
        }
        dst[3] = (out_a * 255.0).clamp(0.0, 255.0).round() as u8;
    }

    /// Iterate pixels with their coordinates, mutably.
    pub fn for_each_pixel_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(u32, u32, &mut [u8]),
    {
        let width = self.width.max(1);
        for (idx, chunk) in self.pixels.chunks_exact_mut(4).enumerate() {
            let x = idx as u32 % width;
            let y = idx as u32 / width;
            f(x, y, chunk);
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}
