//! Construction and reconfiguration options.
//!
//! Options deserialize from camelCase (the JS object shape), with every field
//! optional and defaulted:
//!
//! ```json
//! { "width": 300, "height": 150, "minZoom": 1, "maxZoom": null, "resetMode": "fill" }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::surface::InterpolationFilter;
use crate::transform::{ResetMode, ZoomBounds};

pub const DEFAULT_WIDTH: u32 = 256;
pub const DEFAULT_HEIGHT: u32 = 256;

/// Invalid construction or reconfiguration input. Fatal for the call.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid surface size {width}x{height}: both dimensions must be positive")]
    InvalidSize { width: u32, height: u32 },

    #[error("Invalid minimum zoom {0}: must be finite and non-negative")]
    InvalidMinZoom(f64),

    #[error("Invalid zoom range: maximum {max} is below minimum {min}")]
    InvalidZoomRange { min: f64, max: f64 },
}

/// Viewport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportOptions {
    /// Accept drag/wheel/double-click gestures.
    pub interactive: bool,
    /// Host should accept dropped files.
    pub droppable: bool,
    /// Host should open a file picker on click when empty.
    pub selectable: bool,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Lower zoom bound (at least 0).
    pub min_zoom: f64,
    /// Upper zoom bound; `None` is unbounded.
    pub max_zoom: Option<f64>,
    /// What `reset()` does.
    pub reset_mode: ResetMode,
    /// Sampling used when drawing the image.
    pub interpolation: InterpolationFilter,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            interactive: true,
            droppable: true,
            selectable: true,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_zoom: 1.0,
            max_zoom: None,
            reset_mode: ResetMode::Fit,
            interpolation: InterpolationFilter::Bilinear,
        }
    }
}

impl ViewportOptions {
    /// Options with a given surface size and everything else defaulted.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if !self.min_zoom.is_finite() || self.min_zoom < 0.0 {
            return Err(ConfigError::InvalidMinZoom(self.min_zoom));
        }
        if let Some(max) = self.max_zoom {
            if max.is_nan() || max < self.min_zoom {
                return Err(ConfigError::InvalidZoomRange {
                    min: self.min_zoom,
                    max,
                });
            }
        }
        Ok(())
    }

    pub fn zoom_bounds(&self) -> ZoomBounds {
        ZoomBounds::new(self.min_zoom, self.max_zoom.unwrap_or(f64::INFINITY))
    }
}

/// Partial update for [`ViewportOptions`]; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsPatch {
    pub interactive: Option<bool>,
    pub droppable: Option<bool>,
    pub selectable: Option<bool>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub reset_mode: Option<ResetMode>,
    pub interpolation: Option<InterpolationFilter>,
}

impl OptionsPatch {
    /// Copy of `base` with the present fields replaced.
    pub fn apply_to(&self, base: &ViewportOptions) -> ViewportOptions {
        ViewportOptions {
            interactive: self.interactive.unwrap_or(base.interactive),
            droppable: self.droppable.unwrap_or(base.droppable),
            selectable: self.selectable.unwrap_or(base.selectable),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            min_zoom: self.min_zoom.unwrap_or(base.min_zoom),
            max_zoom: self.max_zoom.or(base.max_zoom),
            reset_mode: self.reset_mode.unwrap_or(base.reset_mode),
            interpolation: self.interpolation.unwrap_or(base.interpolation),
        }
    }
}
