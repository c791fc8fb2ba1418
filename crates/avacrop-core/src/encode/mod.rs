//! Image encoding for `save()`.
//!
//! This module provides functionality for:
//! - Encoding the rendered surface to PNG (default) or JPEG
//! - Wrapping encoded bytes in a `data:` URI, the shape the browser's
//!   `canvas.toDataURL()` hands back
//!
//! # Examples
//!
//! ```ignore
//! use avacrop_core::encode::{encode_png, to_data_uri};
//!
//! let pixels = vec![0u8; 256 * 256 * 4];
//! let png = encode_png(&pixels, 256, 256).unwrap();
//! let uri = to_data_uri("image/png", &png);
//! ```

mod jpeg;
mod png;
mod types;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};

pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use types::{EncodeError, SaveFormat};

/// Encode RGBA pixels in the requested format.
pub fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: SaveFormat,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        SaveFormat::Png => encode_png(pixels, width, height),
        SaveFormat::Jpeg { quality } => encode_jpeg(pixels, width, height, quality),
    }
}

/// Wrap encoded bytes in a base64 `data:` URI.
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(bytes))
}
