//! Target computation for viewport commands.
//!
//! Every command resolves to a target [`TransformState`] and a duration. The
//! controller never touches the live state; the viewport hands its output to
//! the [`Animator`](super::Animator).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::state::{TransformState, ZoomBounds};

/// Animation length used by fit/fill/center/reset when no duration is given.
pub const DEFAULT_ANIMATION: Duration = Duration::from_millis(250);

/// Raw wheel magnitude per unit of zoom.
pub const WHEEL_SENSITIVITY: f64 = 100.0;

/// Longest animation accepted from untyped hosts.
const MAX_ANIMATION_MS: f64 = 60_000.0;

/// What `reset()` does. Chosen once from the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    #[default]
    Fit,
    Fill,
    Center,
}

/// Outcome of the double-click policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleClickAction {
    Fit,
    Fill,
    Center,
}

/// A resolved movement request: where to go and how long to take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub target: TransformState,
    pub duration: Duration,
}

/// Computes clamped target transforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformController {
    bounds: ZoomBounds,
    reset_mode: ResetMode,
}

impl TransformController {
    pub fn new(bounds: ZoomBounds, reset_mode: ResetMode) -> Self {
        Self { bounds, reset_mode }
    }

    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    pub fn reset_mode(&self) -> ResetMode {
        self.reset_mode
    }

    /// Whole image inscribed: `{0, 0, 1}`.
    pub fn fit(&self) -> TransformState {
        TransformState::new(0.0, 0.0, self.bounds.clamp(1.0))
    }

    /// Cover the surface, cropping the long axis.
    ///
    /// `image` is `(width, height)` in pixels.
    pub fn fill(&self, image: (u32, u32)) -> TransformState {
        let (iw, ih) = (image.0 as f64, image.1 as f64);
        let zoom = if ih > iw { ih / iw } else { iw / ih };
        TransformState::new(0.0, 0.0, self.bounds.clamp(zoom))
    }

    /// Recenter without changing zoom.
    pub fn center(&self, current: &TransformState) -> TransformState {
        TransformState::new(0.0, 0.0, self.bounds.clamp(current.zoom))
    }

    /// Pure pan by `(dx, dy)`.
    pub fn move_by(&self, current: &TransformState, dx: f64, dy: f64) -> TransformState {
        TransformState::new(
            current.offset_x + dx,
            current.offset_y + dy,
            self.bounds.clamp(current.zoom),
        )
    }

    /// Zoom around the surface center.
    ///
    /// The zoom is clamped first and the offset scaled by the same ratio, so
    /// `offset / zoom` is unchanged and the point under the center stays put.
    pub fn zoom_to(&self, current: &TransformState, zoom: f64) -> TransformState {
        let zoom = self.bounds.clamp(zoom);
        if current.zoom == 0.0 {
            return TransformState::new(0.0, 0.0, zoom);
        }
        TransformState::new(
            current.offset_x / current.zoom * zoom,
            current.offset_y / current.zoom * zoom,
            zoom,
        )
    }

    /// Target of the configured reset mode. `image` is `None` when nothing is loaded.
    pub fn reset(&self, current: &TransformState, image: Option<(u32, u32)>) -> TransformState {
        match self.reset_mode {
            ResetMode::Fit => self.fit(),
            ResetMode::Fill => image.map_or_else(|| self.fit(), |dims| self.fill(dims)),
            ResetMode::Center => self.center(current),
        }
    }

    /// Double-click cycles fit -> fill -> fit, recentering first if panned at zoom 1.
    pub fn double_click(&self, current: &TransformState) -> DoubleClickAction {
        if current.zoom == 1.0 {
            if current.is_centered() {
                DoubleClickAction::Fill
            } else {
                DoubleClickAction::Center
            }
        } else {
            DoubleClickAction::Fit
        }
    }

    /// Immediate zoom target for a raw wheel delta.
    pub fn wheel(&self, current: &TransformState, raw_delta: f64) -> TransformState {
        let delta = if raw_delta.is_finite() {
            raw_delta / WHEEL_SENSITIVITY
        } else {
            0.0
        };
        self.zoom_to(current, current.zoom + delta)
    }
}

/// Pick the caller's duration or the command default.
#[inline]
pub fn resolve_duration(duration: Option<Duration>, default: Duration) -> Duration {
    duration.unwrap_or(default)
}

/// Convert host milliseconds into a duration, clamping malformed values.
///
/// Negative and `NaN` become zero; huge values are capped.
pub fn duration_from_millis(ms: f64) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(ms.min(MAX_ANIMATION_MS) / 1000.0)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
