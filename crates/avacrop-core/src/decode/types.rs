//! Core types for image decoding.

use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The source string is not a `data:` URI with a base64 payload.
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// The decoded image has a zero dimension.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// A decoded image with RGBA pixel data.
///
/// This is the image handle the viewport draws from. It is shared behind an
/// `Arc` so the host can keep its own reference while a session uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel, row-major order).
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create a new DecodedImage with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create an image filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, pixels)
    }

    /// Returns the number of pixels in the image.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns the expected byte length for RGBA data.
    #[inline]
    pub fn expected_byte_length(&self) -> usize {
        self.pixel_count() * 4
    }

    /// Validates that the pixel data length matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.expected_byte_length()
    }

    /// Width over height. Zero-height images report an aspect of 1.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Read one RGBA pixel. The caller guarantees the coordinate is in range.
    #[inline]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> [f64; 4] {
        let idx = (y * self.width as usize + x) * 4;
        [
            self.pixels[idx] as f64,
            self.pixels[idx + 1] as f64,
            self.pixels[idx + 2] as f64,
            self.pixels[idx + 3] as f64,
        ]
    }
}
