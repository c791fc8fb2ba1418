//! The viewport transform engine.
//!
//! # Pipeline
//!
//! 1. [`TransformController`] turns a command into a clamped target
//! 2. [`Animator`] interpolates from the live state to the target
//! 3. The viewport writes each sample into its [`TransformState`] and renders
//!
//! # Coordinate System
//!
//! - Offsets are surface pixels; the renderer subtracts them from the draw
//!   position, so positive offsets move the content left/up
//! - Zoom 1 with zero offset is the fit baseline (image inscribed, centered)
//! - Zoom changes pivot around the surface center

mod animator;
mod controller;
mod state;

pub use animator::{AnimationJob, Animator, Step};
pub use controller::{
    duration_from_millis, resolve_duration, DoubleClickAction, Movement, ResetMode,
    TransformController, DEFAULT_ANIMATION, WHEEL_SENSITIVITY,
};
pub use state::{TransformState, ZoomBounds};
