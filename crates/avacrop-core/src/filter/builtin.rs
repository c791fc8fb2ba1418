//! Built-in filter types.
//!
//! | Name         | Config                                      |
//! |--------------|---------------------------------------------|
//! | `grayscale`  | `amount` (0-1, default 1)                   |
//! | `brightness` | `stops` (default 0)                         |
//! | `vignette`   | `strength` (0-1, 0.5), `feather` (0-1, 0.5) |
//! | `circle`     | `feather` in pixels (default 1)             |
//!
//! Call [`register_builtin_filters`] once at startup; repeated calls are free.

use std::sync::Once;

use serde_json::json;

use super::{register_filter, FilterConfig, FilterContext};
use crate::surface::Surface;

pub const GRAYSCALE: &str = "grayscale";
pub const BRIGHTNESS: &str = "brightness";
pub const VIGNETTE: &str = "vignette";
pub const CIRCLE: &str = "circle";

/// ITU-R BT.709 luminance coefficients.
const LUMINANCE_R: f64 = 0.2126;
const LUMINANCE_G: f64 = 0.7152;
const LUMINANCE_B: f64 = 0.0722;

/// Register every built-in type in the process-wide registry.
pub fn register_builtin_filters() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        register_filter(GRAYSCALE, grayscale, defaults(json!({ "amount": 1.0 })));
        register_filter(BRIGHTNESS, brightness, defaults(json!({ "stops": 0.0 })));
        register_filter(
            VIGNETTE,
            vignette,
            defaults(json!({ "strength": 0.5, "feather": 0.5 })),
        );
        register_filter(CIRCLE, circle, defaults(json!({ "feather": 1.0 })));
    });
}

fn defaults(value: serde_json::Value) -> FilterConfig {
    match value {
        serde_json::Value::Object(map) => map,
        _ => FilterConfig::new(),
    }
}

/// Smootherstep: `6t^5 - 15t^4 + 10t^3`, zero slope at both ends.
#[inline]
fn smootherstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn to_u8(v: f64) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

/// Blend each pixel towards its BT.709 luminance.
pub fn grayscale(surface: &mut Surface, ctx: &FilterContext<'_>) {
    let amount = ctx.number("amount", 1.0).clamp(0.0, 1.0);
    if amount == 0.0 {
        return;
    }

    for px in surface.pixels_mut().chunks_exact_mut(4) {
        let (r, g, b) = (px[0] as f64, px[1] as f64, px[2] as f64);
        let lum = LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b;
        px[0] = to_u8(r + (lum - r) * amount);
        px[1] = to_u8(g + (lum - g) * amount);
        px[2] = to_u8(b + (lum - b) * amount);
    }
}

/// Exposure adjustment: multiply RGB by `2^stops`.
pub fn brightness(surface: &mut Surface, ctx: &FilterContext<'_>) {
    let stops = ctx.number("stops", 0.0);
    if stops == 0.0 || !stops.is_finite() {
        return;
    }

    let factor = 2f64.powf(stops);
    for px in surface.pixels_mut().chunks_exact_mut(4) {
        px[0] = to_u8(px[0] as f64 * factor);
        px[1] = to_u8(px[1] as f64 * factor);
        px[2] = to_u8(px[2] as f64 * factor);
    }
}

/// Darken towards the edges of the surface.
///
/// Distance is measured in an ellipse fitted to the surface (1.0 at the
/// edge midpoints). Darkening starts at `1 - feather` and reaches
/// `strength` at the edge.
pub fn vignette(surface: &mut Surface, ctx: &FilterContext<'_>) {
    let strength = ctx.number("strength", 0.5).clamp(0.0, 1.0);
    let feather = ctx.number("feather", 0.5).clamp(0.0, 1.0);
    if strength == 0.0 {
        return;
    }

    let (w, h) = surface.size_f64();
    let (cx, cy) = (w / 2.0, h / 2.0);
    let inner = 1.0 - feather;

    surface.for_each_pixel_mut(|x, y, px| {
        let nx = (x as f64 + 0.5 - cx) / cx;
        let ny = (y as f64 + 0.5 - cy) / cy;
        let dist = (nx * nx + ny * ny).sqrt();

        let mask = if feather > 0.0 {
            smootherstep((dist - inner) / feather)
        } else if dist >= 1.0 {
            1.0
        } else {
            0.0
        };

        let factor = 1.0 - strength * mask;
        px[0] = to_u8(px[0] as f64 * factor);
        px[1] = to_u8(px[1] as f64 * factor);
        px[2] = to_u8(px[2] as f64 * factor);
    });
}

/// Avatar mask: pixels outside the inscribed circle become transparent.
///
/// `feather` is the width in pixels of the anti-aliased rim.
pub fn circle(surface: &mut Surface, ctx: &FilterContext<'_>) {
    let feather = ctx.number("feather", 1.0).max(0.0);
    let (w, h) = surface.size_f64();
    let (cx, cy) = (w / 2.0, h / 2.0);
    let radius = w.min(h) / 2.0;

    surface.for_each_pixel_mut(|x, y, px| {
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        let dist = (dx * dx + dy * dy).sqrt();

        let coverage = if feather > 0.0 {
            ((radius - dist) / feather).clamp(0.0, 1.0)
        } else if dist <= radius {
            1.0
        } else {
            0.0
        };

        if coverage < 1.0 {
            px[3] = to_u8(px[3] as f64 * coverage);
        }
    });
}
