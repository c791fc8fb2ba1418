//! Shared types for image encoding.

use thiserror::Error;

/// Errors that can occur while encoding a surface.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Output format for `Viewport::save_as`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveFormat {
    /// Lossless PNG, keeps transparency.
    #[default]
    Png,
    /// JPEG at the given quality (1-100). Transparency is dropped.
    Jpeg { quality: u8 },
}

impl SaveFormat {
    /// MIME type used in the data URI.
    pub fn mime_type(self) -> &'static str {
        match self {
            SaveFormat::Png => "image/png",
            SaveFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Check an RGBA buffer against its dimensions.
pub(crate) fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(())
}
