//! Image decoding for Avacrop.
//!
//! The viewport only consumes decoded images. This module is the ready-made
//! image source a host can use: it turns encoded bytes (or a `data:` URI, the
//! form browsers hand out for picked and dropped files) into a [`DecodedImage`].
//!
//! # Architecture
//!
//! Decoding is synchronous. Hosts that decode off the main thread can do so
//! and pass the result to `Viewport::set_image`.
//!
//! # Examples
//!
//! ```ignore
//! use avacrop_core::decode::load_image;
//!
//! let bytes = std::fs::read("avatar.png").unwrap();
//! let image = load_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod load;
mod types;

pub use load::{load_data_uri, load_image};
pub use types::{DecodeError, DecodedImage};
