//! Avacrop Core - interactive image viewport engine
//!
//! This crate provides the platform-independent half of Avacrop: a viewport
//! that places one image on a fixed-size RGBA surface, pans and zooms it with
//! optional animation, runs named post-processing filters after each draw and
//! exports the result. Browser bindings live in `avacrop-wasm`.
//!
//! ```ignore
//! use avacrop_core::{ManualClock, Viewport, ViewportOptions};
//!
//! let mut viewport = Viewport::new(ViewportOptions::with_size(256, 256), ManualClock::new())?;
//! viewport.set_source(&std::fs::read("avatar.jpg")?)?;
//! viewport.fill(None);
//! let uri = viewport.save();
//! ```

pub mod clock;
pub mod decode;
pub mod encode;
pub mod events;
pub mod filter;
pub mod loading;
pub mod options;
pub mod render;
pub mod surface;
pub mod transform;
pub mod viewport;

pub use clock::{Debouncer, FrameClock, ManualClock, SETTLE_DELAY};
pub use decode::{DecodeError, DecodedImage};
pub use encode::{EncodeError, SaveFormat};
pub use events::ViewportEvent;
pub use filter::{
    register_builtin_filters, register_filter, FilterConfig, FilterContext, FilterPipeline,
    FilterSource,
};
pub use options::{ConfigError, OptionsPatch, ViewportOptions};
pub use surface::{DrawRect, InterpolationFilter, Surface};
pub use transform::{ResetMode, TransformState, ZoomBounds};
pub use viewport::Viewport;
