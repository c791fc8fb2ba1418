//! The transform data model.

use serde::{Deserialize, Serialize};

/// Allowed zoom range.
///
/// `min` is at least 0 and `max` is at least `min`. An unbounded maximum is
/// represented by `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: f64::INFINITY,
        }
    }
}

impl ZoomBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a zoom factor into the bounds.
    ///
    /// `NaN` lands on `min` and `+inf` on `max`, so malformed input is clamped
    /// rather than rejected.
    #[inline]
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min).min(self.max)
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min && zoom <= self.max
    }
}

/// Pan/zoom state of a viewport.
///
/// Offsets are in surface pixels. The renderer subtracts them from the draw
/// position, so a positive `offset_x` moves the content left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformState {
    pub offset_x: f64,
    pub offset_y: f64,
    pub zoom: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformState {
    /// The fit baseline: centered, inscribed, zoom 1.
    pub const IDENTITY: TransformState = TransformState {
        offset_x: 0.0,
        offset_y: 0.0,
        zoom: 1.0,
    };

    pub fn new(offset_x: f64, offset_y: f64, zoom: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            zoom,
        }
    }

    /// True when the offset is exactly zero on both axes.
    pub fn is_centered(&self) -> bool {
        self.offset_x == 0.0 && self.offset_y == 0.0
    }

    /// Linear interpolation towards `target`, each component independently.
    ///
    /// `fraction` is expected in `[0, 1]`.
    pub fn lerp(&self, target: &TransformState, fraction: f64) -> TransformState {
        TransformState {
            offset_x: self.offset_x + (target.offset_x - self.offset_x) * fraction,
            offset_y: self.offset_y + (target.offset_y - self.offset_y) * fraction,
            zoom: self.zoom + (target.zoom - self.zoom) * fraction,
        }
    }
}
