//! Image encoding WASM bindings.
//!
//! `JsViewport.save()` covers the usual export path. These functions encode
//! arbitrary RGBA buffers, for hosts that post-process the surface pixels.

use crate::types::JsDecodedImage;
use avacrop_core::encode::{self, SaveFormat};
use wasm_bindgen::prelude::*;

/// Encode RGBA pixel data to PNG bytes.
///
/// # Errors
///
/// Returns an error if the pixel data length doesn't match width * height * 4
/// or a dimension is zero.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode RGBA pixel data to JPEG bytes. Alpha is discarded.
///
/// * `quality` - JPEG quality (1-100, recommended: 90)
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a decoded image as a PNG `data:` URI.
#[wasm_bindgen]
pub fn image_to_data_uri(image: &JsDecodedImage) -> Result<String, JsValue> {
    let decoded = image.to_decoded();
    encode::encode(&decoded.pixels, decoded.width, decoded.height, SaveFormat::Png)
        .map(|bytes| encode::to_data_uri(SaveFormat::Png.mime_type(), &bytes))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
