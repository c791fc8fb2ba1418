//! Image decoding WASM bindings.
//!
//! Hosts that want to inspect an image before showing it (or decode it in a
//! worker) can decode here and pass the result to `JsViewport.setImage`.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@avacrop/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! viewport.setImage(image);
//! ```

use crate::types::JsDecodedImage;
use avacrop_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an encoded image (PNG or JPEG) to RGBA.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::load_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode a base64 `data:` URI, as produced by `FileReader.readAsDataURL`.
#[wasm_bindgen]
pub fn decode_data_uri(uri: &str) -> Result<JsDecodedImage, JsValue> {
    decode::load_data_uri(uri)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
