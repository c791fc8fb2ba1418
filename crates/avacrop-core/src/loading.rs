//! Loading spinner shown while an image is being fetched or decoded.
//!
//! The indicator is a task owned by the viewport. Each frame it checks its
//! cancellation token first and stops drawing as soon as the token fires.

use std::f64::consts::TAU;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::surface::Surface;

/// Number of spokes; the rotation also advances in 1/16 turn steps.
pub const SPINNER_LINES: u32 = 16;

#[derive(Debug)]
pub struct LoadingIndicator {
    token: CancellationToken,
    started_at: Duration,
}

impl LoadingIndicator {
    pub fn start(now: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            started_at: now,
        }
    }

    /// Handle for whoever finishes the load.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Rotation in turns at `now`, quantized to 1/16 turn per 1/16 second.
    pub fn rotation(&self, now: Duration) -> f64 {
        let lines = SPINNER_LINES as f64;
        let elapsed = now.saturating_sub(self.started_at).as_secs_f64();
        (elapsed * lines).floor() / lines
    }

    /// Draw one frame. Returns `false` (and draws nothing) once cancelled.
    pub fn tick(&self, surface: &mut Surface, now: Duration) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        surface.clear();
        draw_spinner(surface, self.rotation(now));
        true
    }
}

/// Draw 16 spokes around the surface center, fading from transparent to black.
pub fn draw_spinner(surface: &mut Surface, rotation: f64) {
    let (w, h) = surface.size_f64();
    let (cx, cy) = (w / 2.0, h / 2.0);
    let inner = w / 10.0;
    let outer = w / 4.0;
    let half_width = (w / 30.0 / 2.0).max(0.5);

    for i in 0..SPINNER_LINES {
        let angle = TAU * (rotation + (i + 1) as f64 / SPINNER_LINES as f64);
        let (sin, cos) = angle.sin_cos();
        let start = (cx + cos * inner, cy + sin * inner);
        let end = (cx + cos * outer, cy + sin * outer);
        let alpha = 255.0 * i as f64 / SPINNER_LINES as f64;
        stroke_segment(surface, start, end, half_width, [0.0, 0.0, 0.0, alpha]);
    }
}

/// Fill pixels whose centers lie within `half_width` of the segment.
fn stroke_segment(
    surface: &mut Surface,
    a: (f64, f64),
    b: (f64, f64),
    half_width: f64,
    rgba: [f64; 4],
) {
    if rgba[3] <= 0.0 {
        return;
    }

    let (sw, sh) = surface.size_f64();
    let min_x = (a.0.min(b.0) - half_width).floor().max(0.0) as u32;
    let min_y = (a.1.min(b.1) - half_width).floor().max(0.0) as u32;
    let max_x = (a.0.max(b.0) + half_width).ceil().min(sw).max(0.0) as u32;
    let max_y = (a.1.max(b.1) + half_width).ceil().min(sh).max(0.0) as u32;

    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;

    for py in min_y..max_y {
        for px in min_x..max_x {
            let (x, y) = (px as f64 + 0.5, py as f64 + 0.5);
            let t = if len_sq > 0.0 {
                (((x - a.0) * dx + (y - a.1) * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let (nx, ny) = (a.0 + dx * t - x, a.1 + dy * t - y);
            if nx * nx + ny * ny <= half_width * half_width {
                surface.blend_pixel(px, py, rgba);
            }
        }
    }
}
