//! Frame rendering: image placement plus filter passes.
//!
//! At zoom 1 with zero offset a landscape image spans the surface width and a
//! portrait image spans its height, centered on the other axis. Zoom scales the drawn rectangle about the surface center and the
//! offset is subtracted from its position.

use crate::decode::DecodedImage;
use crate::filter::FilterPipeline;
use crate::surface::{draw_image, DrawRect, InterpolationFilter, Surface};
use crate::transform::TransformState;

/// Where the image lands on the surface for a given transform.
///
/// `image` and `surface` are `(width, height)` in pixels.
pub fn compute_draw_rect(
    image: (u32, u32),
    surface: (u32, u32),
    transform: &TransformState,
) -> DrawRect {
    let (iw, ih) = (image.0 as f64, image.1 as f64);
    let (sw, sh) = (surface.0 as f64, surface.1 as f64);
    let zoom = transform.zoom;
    let aspect = if ih > 0.0 { iw / ih } else { 1.0 };

    if aspect < 1.0 {
        // Portrait: height fills the surface
        let w = sh * aspect;
        DrawRect::new(
            (sw - w * zoom) / 2.0 - transform.offset_x,
            (sh - sh * zoom) / 2.0 - transform.offset_y,
            w * zoom,
            sh * zoom,
        )
    } else {
        let h = sw / aspect;
        DrawRect::new(
            (sw - sw * zoom) / 2.0 - transform.offset_x,
            (sh - h * zoom) / 2.0 - transform.offset_y,
            sw * zoom,
            h * zoom,
        )
    }
}

/// Clear, draw the image, then run every filter in order.
///
/// Returns the rectangle the image was drawn into.
pub fn render_frame(
    surface: &mut Surface,
    image: &DecodedImage,
    transform: &TransformState,
    filters: &FilterPipeline,
    interpolation: InterpolationFilter,
) -> DrawRect {
    let rect = compute_draw_rect(
        (image.width, image.height),
        (surface.width(), surface.height()),
        transform,
    );

    surface.clear();
    draw_image(surface, image, rect, interpolation);
    filters.apply_all(surface, *transform, (image.width, image.height));

    tracing::trace!(
        x = rect.x,
        y = rect.y,
        width = rect.width,
        height = rect.height,
        filters = filters.len(),
        "rendered frame"
    );
    rect
}


// ============================================================================
// Property-Based Tests
// ============================================================================
