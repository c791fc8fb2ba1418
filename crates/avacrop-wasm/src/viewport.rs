//! `JsViewport`: the viewport exposed to JavaScript.
//!
//! Durations are milliseconds; `undefined` picks the command default
//! (250ms for fit/fill/center/reset, immediate for moveBy/zoomTo).
//!
//! # Example
//!
//! ```typescript
//! const viewport = new JsViewport({ width: 256, height: 256, resetMode: 'fill' }, raf, timeout);
//! viewport.on('change', () => ctx.putImageData(
//!   new ImageData(new Uint8ClampedArray(viewport.pixels()), viewport.width, viewport.height), 0, 0));
//! viewport.setSource(new Uint8Array(await file.arrayBuffer()));
//! viewport.addFilter('circle', undefined);
//! const avatar = viewport.save();
//! ```

use std::time::Duration;

use avacrop_core::filter::FilterConfig;
use avacrop_core::transform::duration_from_millis;
use avacrop_core::{
    FilterSource, OptionsPatch, SaveFormat, Viewport, ViewportEvent, ViewportOptions,
};
use js_sys::Function;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::clock::JsClock;
use crate::types::JsDecodedImage;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Deserialize an optional JS object; `undefined` and `null` give the default.
fn from_js<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

fn millis(duration: Option<f64>) -> Option<Duration> {
    duration.map(duration_from_millis)
}

#[wasm_bindgen]
pub struct JsViewport {
    inner: Viewport,
}

#[wasm_bindgen]
impl JsViewport {
    /// Create a viewport.
    ///
    /// * `options` - `{ width, height, minZoom, maxZoom, resetMode, interactive, ... }`
    /// * `request_frame` - called when the viewport wants `pump()` on the next frame
    /// * `request_timeout` - called with a delay in ms after which to `pump()`
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsValue,
        request_frame: Option<Function>,
        request_timeout: Option<Function>,
    ) -> Result<JsViewport, JsValue> {
        let options: ViewportOptions = from_js(options)?;
        let clock = JsClock::new(request_frame, request_timeout);
        let inner = Viewport::new(options, clock).map_err(js_error)?;
        Ok(Self { inner })
    }

    /// Merge option changes, e.g. `{ interactive: false }` or a new size.
    pub fn configure(&mut self, patch: JsValue) -> Result<(), JsValue> {
        let patch: OptionsPatch = from_js(patch)?;
        self.inner.configure(&patch).map_err(js_error)
    }

    // Image lifecycle

    /// Decode and show encoded image bytes (PNG or JPEG).
    #[wasm_bindgen(js_name = setSource)]
    pub fn set_source(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.set_source(bytes).map_err(js_error)
    }

    /// Decode and show a `data:` URI from `FileReader.readAsDataURL`.
    #[wasm_bindgen(js_name = setDataUri)]
    pub fn set_data_uri(&mut self, uri: &str) -> Result<(), JsValue> {
        self.inner.set_data_uri(uri).map_err(js_error)
    }

    /// Show an already decoded image.
    #[wasm_bindgen(js_name = setImage)]
    pub fn set_image(&mut self, image: &JsDecodedImage) -> Result<(), JsValue> {
        if !image.is_valid() {
            return Err(JsValue::from_str("Image buffer does not match its dimensions"));
        }
        self.inner.set_image(image.to_decoded());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Show the loading spinner until `endLoading` or an image arrives.
    #[wasm_bindgen(js_name = beginLoading)]
    pub fn begin_loading(&mut self) {
        self.inner.begin_loading();
    }

    #[wasm_bindgen(js_name = endLoading)]
    pub fn end_loading(&mut self) {
        self.inner.end_loading();
    }

    // Commands

    pub fn fit(&mut self, duration: Option<f64>) {
        self.inner.fit(millis(duration));
    }

    pub fn fill(&mut self, duration: Option<f64>) {
        self.inner.fill(millis(duration));
    }

    pub fn center(&mut self, duration: Option<f64>) {
        self.inner.center(millis(duration));
    }

    pub fn reset(&mut self, duration: Option<f64>) {
        self.inner.reset(millis(duration));
    }

    #[wasm_bindgen(js_name = moveBy)]
    pub fn move_by(&mut self, dx: f64, dy: f64, duration: Option<f64>) {
        self.inner.move_by(dx, dy, millis(duration));
    }

    #[wasm_bindgen(js_name = zoomTo)]
    pub fn zoom_to(&mut self, zoom: f64, duration: Option<f64>) {
        self.inner.zoom_to(zoom, millis(duration));
    }

    // Gestures

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self) {
        self.inner.begin_drag();
    }

    #[wasm_bindgen(js_name = dragDelta)]
    pub fn drag_delta(&mut self, dx: f64, dy: f64) {
        self.inner.drag_delta(dx, dy);
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self) {
        self.inner.end_drag();
    }

    /// Raw `WheelEvent.deltaY`-style value; 100 units per zoom step.
    #[wasm_bindgen(js_name = wheelDelta)]
    pub fn wheel_delta(&mut self, delta: f64) {
        self.inner.wheel_delta(delta);
    }

    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self) {
        self.inner.double_click();
    }

    // Frame driving

    /// Run due work. Call from the frame and timeout callbacks.
    pub fn pump(&mut self) {
        self.inner.pump();
    }

    pub fn render(&mut self) {
        self.inner.render();
    }

    // Filters

    /// Add a registered filter type under its own name with config overrides.
    ///
    /// Returns `false` if the name is taken or the type is not registered.
    #[wasm_bindgen(js_name = addFilter)]
    pub fn add_filter(&mut self, name: &str, config: JsValue) -> Result<bool, JsValue> {
        let overrides: FilterConfig = from_js(config)?;
        Ok(self.add_registered(name, overrides))
    }

    #[wasm_bindgen(js_name = removeFilter)]
    pub fn remove_filter(&mut self, name: &str) -> bool {
        self.inner.remove_filter(name)
    }

    #[wasm_bindgen(js_name = removeAllFilters)]
    pub fn remove_all_filters(&mut self) {
        self.inner.remove_all_filters();
    }

    /// Merge config keys into a filter. Returns `false` if it is not present.
    #[wasm_bindgen(js_name = updateFilter)]
    pub fn update_filter(&mut self, name: &str, config: JsValue) -> Result<bool, JsValue> {
        let partial: FilterConfig = from_js(config)?;
        Ok(self.inner.update_filter(name, partial))
    }

    #[wasm_bindgen(js_name = hasFilter)]
    pub fn has_filter(&self, name: &str) -> bool {
        self.inner.has_filter(name)
    }

    /// Filter names in application order.
    #[wasm_bindgen(js_name = filterNames)]
    pub fn filter_names(&self) -> Vec<String> {
        self.inner.filters().names().map(str::to_owned).collect()
    }

    // Events

    /// Subscribe to `load`, `clear` or `change`.
    pub fn on(&mut self, event: &str, handler: Function) -> Result<(), JsValue> {
        let event = ViewportEvent::from_name(event)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown event: {event}")))?;
        self.inner.on(event, move |_| {
            if let Err(err) = handler.call0(&JsValue::NULL) {
                tracing::warn!(%event, ?err, "event handler threw");
            }
        });
        Ok(())
    }

    // Export and inspection

    /// The rendered surface as a PNG data URI, or `undefined` without an image.
    pub fn save(&self) -> Option<String> {
        self.inner.save()
    }

    /// The rendered surface as a JPEG data URI.
    #[wasm_bindgen(js_name = saveJpeg)]
    pub fn save_jpeg(&self, quality: u8) -> Option<String> {
        self.inner.save_as(SaveFormat::Jpeg { quality })
    }

    /// RGBA surface pixels (a copy), ready for `new ImageData(...)`.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.surface().pixels().to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.surface().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.surface().height()
    }

    /// `{ offsetX, offsetY, zoom }`
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.state()).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.state().zoom
    }

    #[wasm_bindgen(getter, js_name = hasImage)]
    pub fn has_image(&self) -> bool {
        self.inner.has_image()
    }

    #[wasm_bindgen(getter, js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    #[wasm_bindgen(getter)]
    pub fn interactive(&self) -> bool {
        self.inner.options().interactive
    }

    /// Whether the host should accept dropped files.
    #[wasm_bindgen(getter)]
    pub fn droppable(&self) -> bool {
        self.inner.options().droppable
    }

    /// Whether the host should open a file picker on click while empty.
    #[wasm_bindgen(getter)]
    pub fn selectable(&self) -> bool {
        self.inner.options().selectable
    }
}

impl JsViewport {
    #[cfg(test)]
    pub(crate) fn from_viewport(inner: Viewport) -> Self {
        Self { inner }
    }

    fn add_registered(&mut self, name: &str, overrides: FilterConfig) -> bool {
        self.inner
            .add_filter(name, FilterSource::registered().with_config(overrides))
    }
}

/// Tests that avoid `JsValue` and run on every target.
#[cfg(test)]
mod tests {
    use super::*;
    use avacrop_core::filter::builtin::{register_builtin_filters, GRAYSCALE};
    use avacrop_core::{DecodedImage, ManualClock, TransformState};

    fn viewport(width: u32, height: u32) -> (JsViewport, ManualClock) {
        let clock = ManualClock::new();
        let inner = Viewport::new(ViewportOptions::with_size(width, height), clock.clone()).unwrap();
        (JsViewport::from_viewport(inner), clock)
    }

    #[test]
    fn test_millis_conversion() {
        assert_eq!(millis(None), None);
        assert_eq!(millis(Some(0.0)), Some(Duration::ZERO));
        assert_eq!(millis(Some(-3.0)), Some(Duration::ZERO));
        assert_eq!(millis(Some(250.0)), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_set_image_and_fill() {
        let (mut vp, _) = viewport(300, 150);
        let image = JsDecodedImage::from_decoded(DecodedImage::filled(600, 300, [5, 5, 5, 255]));
        vp.set_image(&image).unwrap();
        assert!(vp.has_image());

        vp.fill(Some(0.0));
        assert_eq!(vp.zoom(), 2.0);
        assert_eq!(vp.pixels().len(), 300 * 150 * 4);
        assert_eq!((vp.width(), vp.height()), (300, 150));
    }

    #[test]
    fn test_gestures_through_bindings() {
        let (mut vp, _) = viewport(100, 100);
        vp.set_image(&JsDecodedImage::new(10, 10, vec![255u8; 400]))
            .unwrap();
        vp.reset(Some(0.0));

        vp.begin_drag();
        vp.drag_delta(4.0, 2.0);
        vp.end_drag();
        vp.wheel_delta(100.0);

        assert_eq!(vp.inner.state(), TransformState::new(-8.0, -4.0, 2.0));
    }

    #[test]
    fn test_registered_filter_round_trip() {
        register_builtin_filters();
        let (mut vp, _) = viewport(8, 8);
        vp.set_image(&JsDecodedImage::new(2, 2, vec![200u8, 0, 0, 255].repeat(4)))
            .unwrap();

        assert!(vp.add_registered(GRAYSCALE, FilterConfig::new()));
        assert!(!vp.add_registered(GRAYSCALE, FilterConfig::new()));
        assert_eq!(vp.filter_names(), vec![GRAYSCALE.to_string()]);

        let px = &vp.pixels()[..4];
        assert_eq!(px[0], px[1]);

        assert!(vp.remove_filter(GRAYSCALE));
        assert!(!vp.has_filter(GRAYSCALE));
    }

    #[test]
    fn test_save_and_flags() {
        let (mut vp, _) = viewport(16, 16);
        assert_eq!(vp.save(), None);
        assert!(vp.interactive() && vp.droppable() && vp.selectable());

        vp.set_image(&JsDecodedImage::new(1, 1, vec![1, 2, 3, 255]))
            .unwrap();
        assert!(vp.save().unwrap().starts_with("data:image/png;base64,"));
        assert!(vp.save_jpeg(80).unwrap().starts_with("data:image/jpeg;base64,"));

        vp.clear();
        assert!(!vp.has_image());
    }

    #[test]
    fn test_loading_flags() {
        let (mut vp, _) = viewport(32, 32);
        vp.begin_loading();
        assert!(vp.is_loading());
        vp.end_loading();
        assert!(!vp.is_loading());
    }
}

/// WASM-specific tests that require JsValue.
///
/// Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_new_with_undefined_options() {
        let vp = JsViewport::new(JsValue::UNDEFINED, None, None).unwrap();
        assert_eq!((vp.width(), vp.height()), (256, 256));
    }

    #[wasm_bindgen_test]
    fn test_new_rejects_zero_size() {
        let opts = serde_wasm_bindgen::to_value(&ViewportOptions::with_size(0, 10)).unwrap();
        assert!(JsViewport::new(opts, None, None).is_err());
    }

    #[wasm_bindgen_test]
    fn test_unknown_event_name() {
        let mut vp = JsViewport::new(JsValue::UNDEFINED, None, None).unwrap();
        assert!(vp.on("resize", Function::new_no_args("")).is_err());
        assert!(vp.on("change", Function::new_no_args("")).is_ok());
    }

    #[wasm_bindgen_test]
    fn test_set_source_invalid_bytes() {
        let mut vp = JsViewport::new(JsValue::UNDEFINED, None, None).unwrap();
        assert!(vp.set_source(&[1, 2, 3]).is_err());
        assert!(!vp.has_image());
    }

    #[wasm_bindgen_test]
    fn test_add_unregistered_filter() {
        let mut vp = JsViewport::new(JsValue::UNDEFINED, None, None).unwrap();
        assert!(!vp.add_filter("no-such-filter", JsValue::UNDEFINED).unwrap());
    }
}
