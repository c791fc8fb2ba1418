//! Avacrop WASM - WebAssembly bindings for the Avacrop viewport
//!
//! This crate exposes avacrop-core to JavaScript/TypeScript. The host owns the
//! `<canvas>` and the DOM events; it forwards gestures to `JsViewport`, calls
//! `pump()` from the frame/timeout callbacks it was given, and paints
//! `pixels()` when `change` fires.
//!
//! # Module Structure
//!
//! - `viewport` - `JsViewport`, the interactive session
//! - `clock` - frame clock backed by host callbacks
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` / `encode` - standalone image codec bindings
//! - `logging` - `tracing` output to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsViewport } from '@avacrop/wasm';
//!
//! await init();
//! const viewport = new JsViewport({ width: 256, height: 256 }, raf, timeout);
//! viewport.setSource(new Uint8Array(await file.arrayBuffer()));
//! ```

use wasm_bindgen::prelude::*;

mod clock;
mod decode;
mod encode;
mod logging;
mod types;
mod viewport;

// Re-export public types
pub use decode::{decode_data_uri, decode_image};
pub use encode::{encode_jpeg, encode_png, image_to_data_uri};
pub use types::JsDecodedImage;
pub use viewport::JsViewport;

/// Initialize the WASM module (called automatically on load).
///
/// Installs console logging and registers the built-in filter types.
#[wasm_bindgen(start)]
pub fn init() {
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    logging::install(level);
    avacrop_core::register_builtin_filters();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "avacrop initialized");
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Names of the registered filter types usable with `addFilter`.
#[wasm_bindgen(js_name = builtinFilters)]
pub fn builtin_filters() -> Vec<String> {
    use avacrop_core::filter::builtin::{BRIGHTNESS, CIRCLE, GRAYSCALE, VIGNETTE};
    [GRAYSCALE, BRIGHTNESS, VIGNETTE, CIRCLE]
        .into_iter()
        .map(str::to_owned)
        .collect()
}
