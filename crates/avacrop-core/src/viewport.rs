//! The viewport session.
//!
//! A [`Viewport`] owns one surface, one image slot and the transform that
//! places the image on the surface. Commands compute a target through the
//! [`TransformController`] and either apply it at once or hand it to the
//! [`Animator`]. Every render arms the settle [`Debouncer`]; `change` fires
//! once rendering has been quiet for [`SETTLE_DELAY`](crate::clock::SETTLE_DELAY).
//!
//! The viewport is single-threaded and host-driven: it asks its
//! [`FrameClock`] for frames and timeouts, and the host calls [`Viewport::pump`]
//! when they fire.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::clock::{Debouncer, FrameClock};
use crate::decode::{load_data_uri, load_image, DecodeError, DecodedImage};
use crate::encode::{encode, to_data_uri, SaveFormat};
use crate::events::{EventTable, ViewportEvent};
use crate::filter::{FilterConfig, FilterPipeline, FilterSource};
use crate::loading::LoadingIndicator;
use crate::options::{ConfigError, OptionsPatch, ViewportOptions};
use crate::render::render_frame;
use crate::surface::{DrawRect, Surface};
use crate::transform::{
    resolve_duration, Animator, DoubleClickAction, Step, TransformController, TransformState,
    DEFAULT_ANIMATION,
};

/// An interactive image viewport.
pub struct Viewport {
    options: ViewportOptions,
    controller: TransformController,
    state: TransformState,
    animator: Animator,
    surface: Surface,
    image: Option<Arc<DecodedImage>>,
    filters: FilterPipeline,
    events: EventTable<Viewport>,
    settle: Debouncer,
    loading: Option<LoadingIndicator>,
    dragging: bool,
    last_draw: Option<DrawRect>,
    frame_pending: bool,
    clock: Box<dyn FrameClock>,
}

impl Viewport {
    /// Create an empty viewport. Fails when the options are invalid.
    pub fn new<C>(options: ViewportOptions, clock: C) -> Result<Self, ConfigError>
    where
        C: FrameClock + 'static,
    {
        options.validate()?;
        tracing::debug!(
            width = options.width,
            height = options.height,
            "creating viewport"
        );

        Ok(Self {
            controller: TransformController::new(options.zoom_bounds(), options.reset_mode),
            surface: Surface::new(options.width, options.height),
            options,
            state: TransformState::IDENTITY,
            animator: Animator::new(),
            image: None,
            filters: FilterPipeline::new(),
            events: EventTable::new(),
            settle: Debouncer::default(),
            loading: None,
            dragging: false,
            last_draw: None,
            frame_pending: false,
            clock: Box::new(clock),
        })
    }

    // ------------------------------------------------------------------
    // Configuration and accessors
    // ------------------------------------------------------------------

    /// Merge `patch` into the current options.
    ///
    /// On error nothing changes. A size change reallocates the surface and
    /// redraws the current image.
    pub fn configure(&mut self, patch: &OptionsPatch) -> Result<(), ConfigError> {
        let next = patch.apply_to(&self.options);
        next.validate()?;

        if next.interactive != self.options.interactive {
            tracing::debug!(interactive = next.interactive, "gesture bindings toggled");
            if !next.interactive {
                self.dragging = false;
            }
        }

        let resized = next.width != self.options.width || next.height != self.options.height;
        self.controller = TransformController::new(next.zoom_bounds(), next.reset_mode);
        self.options = next;
        self.state.zoom = self.controller.bounds().clamp(self.state.zoom);

        if resized {
            self.surface.resize(self.options.width, self.options.height);
            self.last_draw = None;
        }
        self.render();
        Ok(())
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    /// The live transform.
    pub fn state(&self) -> TransformState {
        self.state
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn image(&self) -> Option<&Arc<DecodedImage>> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn filters(&self) -> &FilterPipeline {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Rectangle the image was last drawn into, if any.
    pub fn draw_rect(&self) -> Option<DrawRect> {
        self.last_draw
    }

    /// Subscribe to an event. Handlers run in subscription order.
    pub fn on<F>(&mut self, event: ViewportEvent, handler: F)
    where
        F: FnMut(&Viewport) + 'static,
    {
        self.events.subscribe(event, Box::new(handler));
    }

    // ------------------------------------------------------------------
    // Image lifecycle
    // ------------------------------------------------------------------

    /// Show `image`, reset to the identity transform and run `reset()`.
    ///
    /// Ends any loading indicator and fires `load`.
    pub fn set_image(&mut self, image: impl Into<Arc<DecodedImage>>) {
        let image = image.into();
        tracing::debug!(width = image.width, height = image.height, "image set");

        self.end_loading();
        self.animator.discard();
        self.state = TransformState::IDENTITY;
        self.image = Some(image);

        self.render();
        self.emit(ViewportEvent::Load);
        self.reset(None);
    }

    /// Decode encoded bytes and show the result.
    ///
    /// On failure the viewport is left without an image, the loading
    /// indicator is stopped and no `load` fires.
    pub fn set_source(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        self.begin_loading();
        let decoded = load_image(bytes);
        self.finish_source(decoded)
    }

    /// Decode a `data:` URI (the browser's file-reader output) and show it.
    pub fn set_data_uri(&mut self, uri: &str) -> Result<(), DecodeError> {
        self.begin_loading();
        let decoded = load_data_uri(uri);
        self.finish_source(decoded)
    }

    fn finish_source(
        &mut self,
        decoded: Result<DecodedImage, DecodeError>,
    ) -> Result<(), DecodeError> {
        match decoded {
            Ok(image) => {
                self.set_image(image);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to decode image source");
                self.end_loading();
                self.animator.discard();
                self.state = TransformState::IDENTITY;
                self.image = None;
                self.last_draw = None;
                Err(err)
            }
        }
    }

    /// Start the loading indicator and return its cancellation token.
    ///
    /// Cancelling the token stops the spinner on the next frame. Calling this
    /// while already loading returns the running indicator's token.
    pub fn begin_loading(&mut self) -> CancellationToken {
        if let Some(indicator) = &self.loading {
            if !indicator.is_cancelled() {
                return indicator.token();
            }
        }

        let indicator = LoadingIndicator::start(self.clock.now());
        indicator.tick(&mut self.surface, self.clock.now());
        let token = indicator.token();
        self.loading = Some(indicator);
        self.request_frame();
        tracing::trace!("loading indicator started");
        token
    }

    /// Stop the loading indicator and clear its drawing.
    pub fn end_loading(&mut self) {
        if let Some(indicator) = self.loading.take() {
            indicator.cancel();
            self.surface.clear();
            tracing::trace!("loading indicator stopped");
        }
    }

    /// Return to the empty state: no image, no filters, identity transform.
    ///
    /// Fires `clear`.
    pub fn clear(&mut self) {
        tracing::debug!("viewport cleared");
        self.end_loading();
        self.filters.remove_all();
        self.animator.discard();
        self.settle.cancel();
        self.dragging = false;
        self.state = TransformState::IDENTITY;
        self.image = None;
        self.last_draw = None;
        self.surface.clear();
        self.emit(ViewportEvent::Clear);
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Show the whole image. Animates over 250ms unless a duration is given.
    pub fn fit(&mut self, duration: Option<Duration>) {
        let target = self.controller.fit();
        self.move_and_zoom(target, resolve_duration(duration, DEFAULT_ANIMATION));
    }

    /// Cover the surface with the image.
    pub fn fill(&mut self, duration: Option<Duration>) {
        let Some(dims) = self.image_size() else {
            return;
        };
        let target = self.controller.fill(dims);
        self.move_and_zoom(target, resolve_duration(duration, DEFAULT_ANIMATION));
    }

    /// Recenter, keeping the zoom.
    pub fn center(&mut self, duration: Option<Duration>) {
        let target = self.controller.center(&self.state);
        self.move_and_zoom(target, resolve_duration(duration, DEFAULT_ANIMATION));
    }

    /// Run the configured reset mode.
    pub fn reset(&mut self, duration: Option<Duration>) {
        let target = self.controller.reset(&self.state, self.image_size());
        self.move_and_zoom(target, resolve_duration(duration, DEFAULT_ANIMATION));
    }

    /// Pan by `(dx, dy)` surface pixels. Immediate unless a duration is given.
    pub fn move_by(&mut self, dx: f64, dy: f64, duration: Option<Duration>) {
        let target = self.controller.move_by(&self.state, dx, dy);
        self.move_and_zoom(target, resolve_duration(duration, Duration::ZERO));
    }

    /// Zoom around the surface center. Immediate unless a duration is given.
    pub fn zoom_to(&mut self, zoom: f64, duration: Option<Duration>) {
        if !self.controller.bounds().clamp(zoom).is_finite() {
            tracing::debug!(zoom, "ignoring unbounded zoom");
            return;
        }
        let target = self.controller.zoom_to(&self.state, zoom);
        self.move_and_zoom(target, resolve_duration(duration, Duration::ZERO));
    }

    fn move_and_zoom(&mut self, target: TransformState, duration: Duration) {
        if self.image.is_none() {
            return;
        }

        let now = self.clock.now();
        match self.animator.start(self.state, target, duration, now) {
            Some(state) => {
                self.state = state;
                self.render();
            }
            None => self.request_frame(),
        }
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    fn accepts_gestures(&self) -> bool {
        self.options.interactive && self.image.is_some()
    }

    /// Pointer down on the surface.
    pub fn begin_drag(&mut self) {
        if self.accepts_gestures() {
            self.dragging = true;
        }
    }

    /// Pointer moved by `(dx, dy)` pixels. The content follows the pointer.
    pub fn drag_delta(&mut self, dx: f64, dy: f64) {
        if !self.accepts_gestures() {
            return;
        }
        self.move_by(-dx, -dy, Some(Duration::ZERO));
    }

    /// Pointer released.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Wheel scrolled by a raw delta. Ignored during a drag.
    pub fn wheel_delta(&mut self, raw: f64) {
        if !self.accepts_gestures() || self.dragging {
            return;
        }
        let target = self.controller.wheel(&self.state, raw);
        self.move_and_zoom(target, Duration::ZERO);
    }

    /// Cycle fit, fill and center per the double-click policy.
    pub fn double_click(&mut self) {
        if !self.accepts_gestures() {
            return;
        }
        match self.controller.double_click(&self.state) {
            DoubleClickAction::Fit => self.fit(None),
            DoubleClickAction::Fill => self.fill(None),
            DoubleClickAction::Center => self.center(None),
        }
    }

    // ------------------------------------------------------------------
    // Frame driving
    // ------------------------------------------------------------------

    /// Run whatever is due: the loading spinner, one animation step and the
    /// settle check. Call when a requested frame or timeout fires.
    ///
    /// At most one frame request is outstanding at a time.
    pub fn pump(&mut self) {
        let now = self.clock.now();
        self.frame_pending = false;

        match self.loading.as_ref().map(|ind| ind.tick(&mut self.surface, now)) {
            Some(true) => self.request_frame(),
            Some(false) => {
                // Token cancelled by the host
                self.end_loading();
                self.render();
            }
            None => {}
        }

        match self.animator.tick(now) {
            Step::Idle => {}
            Step::Running(state) => {
                self.state = state;
                self.render();
                self.request_frame();
            }
            Step::Finished(state) => {
                self.state = state;
                self.render();
            }
        }

        if self.settle.poll(now) {
            tracing::trace!("render settled");
            self.emit(ViewportEvent::Change);
        }
    }

    /// Draw the current image and filters. Does nothing without an image.
    pub fn render(&mut self) {
        let Some(image) = self.image.as_deref() else {
            return;
        };

        let rect = render_frame(
            &mut self.surface,
            image,
            &self.state,
            &self.filters,
            self.options.interpolation,
        );
        self.last_draw = Some(rect);

        self.settle.trigger(self.clock.now());
        // Running frames poll the debouncer themselves
        if !self.animator.is_active() && self.loading.is_none() {
            self.clock.request_timeout(self.settle.delay());
        }
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Add a named filter pass and redraw. Returns `false` when the name is
    /// taken or the registered type does not exist.
    pub fn add_filter(&mut self, name: &str, source: FilterSource) -> bool {
        let added = self.filters.add(name, source);
        if added {
            self.render();
        }
        added
    }

    pub fn remove_filter(&mut self, name: &str) -> bool {
        let removed = self.filters.remove(name);
        if removed {
            self.render();
        }
        removed
    }

    pub fn remove_all_filters(&mut self) {
        self.filters.remove_all();
        self.render();
    }

    /// Merge config into a filter and redraw. Returns `false` when unknown.
    pub fn update_filter(&mut self, name: &str, partial: FilterConfig) -> bool {
        let updated = self.filters.update(name, partial);
        if updated {
            self.render();
        } else {
            tracing::debug!(filter = name, "update for unknown filter ignored");
        }
        updated
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.has(name)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// The rendered surface as a PNG `data:` URI, or `None` without an image.
    pub fn save(&self) -> Option<String> {
        self.save_as(SaveFormat::Png)
    }

    /// The rendered surface in `format` as a `data:` URI.
    pub fn save_as(&self, format: SaveFormat) -> Option<String> {
        self.image.as_ref()?;

        match encode(
            self.surface.pixels(),
            self.surface.width(),
            self.surface.height(),
            format,
        ) {
            Ok(bytes) => Some(to_data_uri(format.mime_type(), &bytes)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode surface");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn request_frame(&mut self) {
        if !self.frame_pending {
            self.frame_pending = true;
            self.clock.request_frame();
        }
    }

    fn image_size(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|img| (img.width, img.height))
    }

    fn emit(&mut self, event: ViewportEvent) {
        let mut handlers = self.events.take(event);
        for handler in handlers.iter_mut() {
            handler(self);
        }
        self.events.restore(event, handlers);
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("has_image", &self.image.is_some())
            .field("filters", &self.filters.len())
            .field("loading", &self.loading.is_some())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SETTLE_DELAY};
    use crate::encode::encode_png;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn viewport(width: u32, height: u32) -> (Viewport, ManualClock) {
        let clock = ManualClock::new();
        let vp = Viewport::new(ViewportOptions::with_size(width, height), clock.clone()).unwrap();
        (vp, clock)
    }

    /// Viewport with an image already settled at the identity transform.
    fn loaded(width: u32, height: u32, image: (u32, u32)) -> (Viewport, ManualClock) {
        let (mut vp, clock) = viewport(width, height);
        vp.set_image(DecodedImage::filled(image.0, image.1, [200, 100, 50, 255]));
        clock.advance(DEFAULT_ANIMATION);
        vp.pump();
        (vp, clock)
    }

    fn counter(vp: &mut Viewport, event: ViewportEvent) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        vp.on(event, move |_| c.set(c.get() + 1));
        count
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        let err = Viewport::new(ViewportOptions::with_size(0, 0), ManualClock::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSize { .. }));
    }

    #[test]
    fn test_new_is_empty() {
        let (vp, _) = viewport(64, 32);
        assert!(!vp.has_image());
        assert_eq!(vp.state(), TransformState::IDENTITY);
        assert_eq!((vp.surface().width(), vp.surface().height()), (64, 32));
        assert_eq!(vp.save(), None);
    }

    #[test]
    fn test_set_image_fires_load_and_renders() {
        let (mut vp, _) = viewport(300, 150);
        let loads = counter(&mut vp, ViewportEvent::Load);

        vp.set_image(DecodedImage::filled(600, 300, [0, 0, 255, 255]));

        assert_eq!(loads.get(), 1);
        assert_eq!(vp.draw_rect(), Some(DrawRect::new(0.0, 0.0, 300.0, 150.0)));
        assert_eq!(vp.surface().pixel(150, 75), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_load_handler_sees_image() {
        let (mut vp, _) = viewport(10, 10);
        let seen = Rc::new(Cell::new((0, 0)));
        let s = Rc::clone(&seen);
        vp.on(ViewportEvent::Load, move |v| {
            let img = v.image().unwrap();
            s.set((img.width, img.height));
        });
        vp.set_image(DecodedImage::filled(3, 7, [1, 1, 1, 255]));
        assert_eq!(seen.get(), (3, 7));
    }

    #[test]
    fn test_fill_immediate_on_wide_image() {
        let (mut vp, _) = loaded(300, 150, (600, 300));
        vp.fill(Some(Duration::ZERO));
        assert_eq!(vp.state(), TransformState::new(0.0, 0.0, 2.0));
        assert_eq!(vp.draw_rect(), Some(DrawRect::new(-150.0, -75.0, 600.0, 300.0)));
    }

    #[test]
    fn test_fit_animates_over_default_duration() {
        let (mut vp, clock) = loaded(100, 100, (100, 100));
        vp.zoom_to(3.0, None);
        assert_eq!(vp.state().zoom, 3.0);

        vp.fit(None);
        assert!(vp.is_animating());
        assert_eq!(vp.state().zoom, 3.0);

        clock.advance(ms(125));
        vp.pump();
        assert!((vp.state().zoom - 2.0).abs() < 1e-9);

        clock.advance(ms(125));
        vp.pump();
        assert_eq!(vp.state(), TransformState::IDENTITY);
        assert!(!vp.is_animating());
    }

    #[test]
    fn test_animation_requests_frames() {
        let (mut vp, clock) = loaded(100, 100, (100, 100));
        let before = clock.frame_requests();
        vp.zoom_to(2.0, Some(ms(100)));
        assert_eq!(clock.frame_requests(), before + 1);

        clock.advance(ms(16));
        vp.pump();
        assert_eq!(clock.frame_requests(), before + 2);
    }

    /// Deliver one `pump` per frame request made since `delivered`, once per
    /// display frame, until the animation ends. Returns the pumps of each frame.
    fn run_frames(vp: &mut Viewport, clock: &ManualClock, mut delivered: usize) -> Vec<usize> {
        let mut per_frame = Vec::new();
        for _ in 0..100 {
            if !vp.is_animating() {
                break;
            }
            let due = clock.frame_requests() - delivered;
            delivered += due;
            clock.advance(ms(16));
            for _ in 0..due {
                vp.pump();
            }
            per_frame.push(due);
        }
        per_frame
    }

    #[test]
    fn test_replaced_animations_share_one_frame_chain() {
        let (mut vp, clock) = loaded(100, 100, (100, 100));
        let before = clock.frame_requests();
        vp.zoom_to(2.0, Some(ms(200)));
        vp.zoom_to(3.0, Some(ms(200)));
        vp.zoom_to(4.0, Some(ms(200)));
        assert_eq!(clock.frame_requests(), before + 1);

        let per_frame = run_frames(&mut vp, &clock, before);

        assert!(!per_frame.is_empty());
        assert!(per_frame.iter().all(|&n| n == 1), "{per_frame:?}");
        assert_eq!(vp.state().zoom, 4.0);
    }

    #[test]
    fn test_long_animation_arms_no_settle_timeouts() {
        let (mut vp, clock) = loaded(100, 100, (100, 100));
        let mut delivered = clock.frame_requests();
        vp.zoom_to(3.0, Some(ms(1000)));
        let timeouts = clock.timeout_requests();

        for _ in 0..20 {
            let due = clock.frame_requests() - delivered;
            assert_eq!(due, 1);
            delivered += due;
            clock.advance(ms(16));
            vp.pump();
        }
        // Frames alone drive the animation; no settle timeouts are armed
        assert_eq!(clock.timeout_requests(), timeouts);
        assert!(vp.is_animating());

        let per_frame = run_frames(&mut vp, &clock, delivered);
        assert!(per_frame.iter().all(|&n| n == 1), "{per_frame:?}");
        assert_eq!(vp.state().zoom, 3.0);
        assert_eq!(clock.last_timeout(), Some(SETTLE_DELAY));
    }

    #[test]
    fn test_new_command_replaces_running_animation() {
        let (mut vp, clock) = loaded(100, 100, (100, 100));
        vp.zoom_to(4.0, Some(ms(100)));
        clock.advance(ms(50));
        vp.pump();
        let mid = vp.state().zoom;
        assert!(mid > 1.0 && mid < 4.0);

        vp.zoom_to(1.0, Some(ms(100)));
        clock.advance(ms(100));
        vp.pump();
        assert_eq!(vp.state().zoom, 1.0);
    }

    #[test]
    fn test_zoom_clamped_to_bounds() {
        let clock = ManualClock::new();
        let mut opts = ViewportOptions::with_size(100, 100);
        opts.max_zoom = Some(3.0);
        let mut vp = Viewport::new(opts, clock.clone()).unwrap();
        vp.set_image(DecodedImage::filled(10, 10, [0, 0, 0, 255]));

        vp.zoom_to(10.0, None);
        assert_eq!(vp.state().zoom, 3.0);
        vp.zoom_to(0.2, None);
        assert_eq!(vp.state().zoom, 1.0);
    }

    #[test]
    fn test_malformed_zoom_is_clamped() {
        let clock = ManualClock::new();
        let mut opts = ViewportOptions::with_size(10, 10);
        opts.max_zoom = Some(4.0);
        let mut vp = Viewport::new(opts, clock).unwrap();
        vp.set_image(DecodedImage::filled(10, 10, [0, 0, 0, 255]));

        vp.zoom_to(f64::INFINITY, None);
        assert_eq!(vp.state().zoom, 4.0);
        vp.zoom_to(f64::NAN, None);
        assert_eq!(vp.state().zoom, 1.0);
    }

    #[test]
    fn test_infinite_zoom_ignored_when_unbounded() {
        let (mut vp, _) = loaded(10, 10, (10, 10));
        vp.zoom_to(f64::INFINITY, None);
        assert_eq!(vp.state().zoom, 1.0);
    }

    #[test]
    fn test_commands_without_image_are_ignored() {
        let (mut vp, clock) = viewport(100, 100);
        vp.move_by(10.0, 10.0, None);
        vp.zoom_to(2.0, None);
        vp.fill(None);
        vp.fit(Some(ms(100)));
        assert_eq!(vp.state(), TransformState::IDENTITY);
        assert_eq!(clock.frame_requests(), 0);
        assert_eq!(clock.timeout_requests(), 0);
    }

    #[test]
    fn test_render_without_image_is_noop() {
        let (mut vp, clock) = viewport(10, 10);
        vp.render();
        assert!(vp.surface().pixels().iter().all(|&b| b == 0));
        assert_eq!(clock.timeout_requests(), 0);
    }

    #[test]
    fn test_change_debounced_after_burst() {
        let (mut vp, clock) = loaded(100, 100, (100, 100));
        clock.advance(SETTLE_DELAY);
        vp.pump();
        let changes = counter(&mut vp, ViewportEvent::Change);

        let t0 = clock.now();
        vp.move_by(1.0, 0.0, None);
        clock.advance(ms(50));
        vp.move_by(1.0, 0.0, None);

        clock.set(t0 + ms(250));
        vp.pump();
        assert_eq!(changes.get(), 0);

        clock.set(t0 + ms(300));
        vp.pump();
        assert_eq!(changes.get(), 1);

        clock.advance(ms(500));
        vp.pump();
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn test_render_requests_settle_timeout() {
        let (mut vp, clock) = loaded(10, 10, (10, 10));
        vp.render();
        assert_eq!(clock.last_timeout(), Some(SETTLE_DELAY));
    }

    #[test]
    fn test_drag_moves_content_with_pointer() {
        let (mut vp, _) = loaded(100, 100, (100, 100));
        vp.begin_drag();
        vp.drag_delta(10.0, -4.0);
        vp.end_drag();
        assert_eq!(vp.state(), TransformState::new(-10.0, 4.0, 1.0));
        // Content shifted right and up by the pointer delta
        let rect = vp.draw_rect().unwrap();
        assert_eq!((rect.x, rect.y), (10.0, -4.0));
    }

    #[test]
    fn test_wheel_ignored_while_dragging() {
        let (mut vp, _) = loaded(100, 100, (100, 100));
        vp.begin_drag();
        vp.wheel_delta(100.0);
        assert_eq!(vp.state().zoom, 1.0);

        vp.end_drag();
        vp.wheel_delta(100.0);
        assert_eq!(vp.state().zoom, 2.0);
    }

    #[test]
    fn test_gestures_ignored_when_not_interactive() {
        let (mut vp, _) = loaded(100, 100, (100, 100));
        vp.configure(&OptionsPatch {
            interactive: Some(false),
            ..OptionsPatch::default()
        })
        .unwrap();

        vp.begin_drag();
        assert!(!vp.is_dragging());
        vp.drag_delta(5.0, 5.0);
        vp.wheel_delta(100.0);
        vp.double_click();
        assert_eq!(vp.state(), TransformState::IDENTITY);
        assert!(!vp.is_animating());

        // Programmatic commands still work
        vp.zoom_to(2.0, None);
        assert_eq!(vp.state().zoom, 2.0);
    }

    #[test]
    fn test_double_click_cycle() {
        let (mut vp, clock) = loaded(100, 100, (200, 100));
        let settle = |vp: &mut Viewport| {
            clock.advance(DEFAULT_ANIMATION);
            vp.pump();
        };

        vp.double_click();
        settle(&mut vp);
        assert_eq!(vp.state(), TransformState::new(0.0, 0.0, 2.0));

        vp.double_click();
        settle(&mut vp);
        assert_eq!(vp.state(), TransformState::IDENTITY);

        vp.move_by(5.0, 0.0, None);
        vp.double_click();
        settle(&mut vp);
        assert_eq!(vp.state(), TransformState::IDENTITY);
        assert_eq!(vp.state().offset_x, 0.0);
    }

    #[test]
    fn test_reset_uses_configured_mode() {
        let clock = ManualClock::new();
        let mut opts = ViewportOptions::with_size(100, 100);
        opts.reset_mode = crate::transform::ResetMode::Fill;
        let mut vp = Viewport::new(opts, clock.clone()).unwrap();

        vp.set_image(DecodedImage::filled(300, 100, [0, 0, 0, 255]));
        clock.advance(DEFAULT_ANIMATION);
        vp.pump();
        assert_eq!(vp.state().zoom, 3.0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let (mut vp, _) = loaded(50, 50, (50, 50));
        let clears = counter(&mut vp, ViewportEvent::Clear);
        vp.add_filter("noop", FilterSource::custom(|_, _| {}));
        vp.zoom_to(2.0, None);

        vp.clear();

        assert_eq!(clears.get(), 1);
        assert!(!vp.has_image());
        assert!(!vp.has_filter("noop"));
        assert_eq!(vp.state(), TransformState::IDENTITY);
        assert!(vp.surface().pixels().iter().all(|&b| b == 0));
        assert_eq!(vp.save(), None);
    }

    #[test]
    fn test_clear_cancels_pending_change() {
        let (mut vp, clock) = loaded(10, 10, (10, 10));
        let changes = counter(&mut vp, ViewportEvent::Change);
        vp.render();
        vp.clear();
        clock.advance(SETTLE_DELAY * 2);
        vp.pump();
        assert_eq!(changes.get(), 0);
    }

    #[test]
    fn test_filters_rerender() {
        let (mut vp, _) = loaded(8, 8, (8, 8));
        assert!(vp.add_filter(
            "red",
            FilterSource::custom(|s, ctx| {
                let r = ctx.number("r", 0.0) as u8;
                s.for_each_pixel_mut(|_, _, px| px[0] = r);
            })
            .with_config(serde_json::json!({ "r": 7 }).as_object().cloned().unwrap_or_default()),
        ));
        assert_eq!(vp.surface().pixel(4, 4).unwrap()[0], 7);
        assert!(!vp.add_filter("red", FilterSource::custom(|_, _| {})));

        let mut partial = FilterConfig::new();
        partial.insert("r".into(), serde_json::json!(9));
        assert!(vp.update_filter("red", partial));
        assert_eq!(vp.surface().pixel(4, 4).unwrap()[0], 9);
        assert!(!vp.update_filter("missing", FilterConfig::new()));

        assert!(vp.remove_filter("red"));
        assert_eq!(vp.surface().pixel(4, 4).unwrap()[0], 200);
        assert!(!vp.remove_filter("red"));
    }

    #[test]
    fn test_unknown_registered_filter_is_ignored() {
        let (mut vp, _) = loaded(8, 8, (8, 8));
        assert!(!vp.add_filter("viewport-test-missing-type", FilterSource::registered()));
        assert!(vp.filters().is_empty());
    }

    #[test]
    fn test_save_returns_png_data_uri() {
        let (vp, _) = loaded(16, 16, (16, 16));
        let uri = vp.save().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let decoded = crate::decode::load_data_uri(&uri).unwrap();
        assert_eq!((decoded.width, decoded.height), (16, 16));
        assert_eq!(&decoded.pixels[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn test_save_as_jpeg() {
        let (vp, _) = loaded(16, 16, (16, 16));
        let uri = vp.save_as(SaveFormat::Jpeg { quality: 80 }).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_set_source_decodes_png() {
        let (mut vp, _) = viewport(20, 10);
        let loads = counter(&mut vp, ViewportEvent::Load);
        let pixels: Vec<u8> = [10u8, 20, 30, 255].repeat(8);
        let png = encode_png(&pixels, 4, 2).unwrap();

        vp.set_source(&png).unwrap();

        assert_eq!(loads.get(), 1);
        assert!(!vp.is_loading());
        assert_eq!(vp.image().map(|i| (i.width, i.height)), Some((4, 2)));
    }

    #[test]
    fn test_set_source_failure_leaves_viewport_empty() {
        let (mut vp, _) = viewport(20, 20);
        let loads = counter(&mut vp, ViewportEvent::Load);

        assert!(vp.set_source(b"not an image").is_err());

        assert_eq!(loads.get(), 0);
        assert!(!vp.has_image());
        assert!(!vp.is_loading());
        assert!(vp.surface().pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_loading_spinner_until_cancelled() {
        let (mut vp, clock) = viewport(64, 64);
        let token = vp.begin_loading();
        assert!(vp.is_loading());
        assert!(vp.surface().pixels().chunks_exact(4).any(|px| px[3] > 0));

        clock.advance(ms(16));
        vp.pump();
        assert!(vp.is_loading());

        token.cancel();
        clock.advance(ms(16));
        vp.pump();
        assert!(!vp.is_loading());
    }

    #[test]
    fn test_cancelled_spinner_restores_image() {
        let (mut vp, clock) = viewport(64, 64);
        vp.set_image(DecodedImage::filled(64, 64, [0, 255, 0, 255]));
        clock.advance(DEFAULT_ANIMATION);
        vp.pump();

        let mut expected = Surface::new(64, 64);
        render_frame(
            &mut expected,
            vp.image().unwrap(),
            &vp.state(),
            vp.filters(),
            vp.options().interpolation,
        );
        assert_eq!(vp.surface().pixels(), expected.pixels());

        let token = vp.begin_loading();
        assert_ne!(vp.surface().pixels(), expected.pixels());

        token.cancel();
        clock.advance(ms(16));
        vp.pump();

        assert!(!vp.is_loading());
        assert_eq!(vp.surface().pixels(), expected.pixels());
        assert_eq!(vp.surface().pixel(32, 32), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_cancelled_spinner_without_image_clears_surface() {
        let (mut vp, clock) = viewport(64, 64);
        let token = vp.begin_loading();
        token.cancel();
        clock.advance(ms(16));
        vp.pump();

        assert!(!vp.is_loading());
        assert!(vp.surface().pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_begin_loading_twice_shares_token() {
        let (mut vp, _) = viewport(32, 32);
        let a = vp.begin_loading();
        let b = vp.begin_loading();
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn test_end_loading_clears_spinner() {
        let (mut vp, _) = viewport(64, 64);
        let token = vp.begin_loading();
        vp.end_loading();
        assert!(token.is_cancelled());
        assert!(vp.surface().pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_configure_resizes_and_redraws() {
        let (mut vp, _) = loaded(100, 100, (100, 50));
        vp.configure(&OptionsPatch {
            width: Some(40),
            height: Some(20),
            ..OptionsPatch::default()
        })
        .unwrap();

        assert_eq!((vp.surface().width(), vp.surface().height()), (40, 20));
        assert_eq!(vp.draw_rect(), Some(DrawRect::new(0.0, 0.0, 40.0, 20.0)));
    }

    #[test]
    fn test_configure_rejects_bad_patch_without_changes() {
        let (mut vp, _) = viewport(10, 10);
        let err = vp
            .configure(&OptionsPatch {
                min_zoom: Some(-2.0),
                width: Some(99),
                ..OptionsPatch::default()
            })
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidMinZoom(-2.0));
        assert_eq!(vp.options().width, 10);
    }

    #[test]
    fn test_configure_clamps_live_zoom() {
        let (mut vp, _) = loaded(10, 10, (10, 10));
        vp.zoom_to(5.0, None);
        vp.configure(&OptionsPatch {
            max_zoom: Some(2.0),
            ..OptionsPatch::default()
        })
        .unwrap();
        assert_eq!(vp.state().zoom, 2.0);
    }

    #[test]
    fn test_handlers_can_read_state() {
        let (mut vp, clock) = loaded(10, 10, (10, 10));
        let zooms = Rc::new(RefCell::new(Vec::new()));
        let z = Rc::clone(&zooms);
        vp.on(ViewportEvent::Change, move |v| z.borrow_mut().push(v.state().zoom));

        vp.zoom_to(2.0, None);
        clock.advance(SETTLE_DELAY);
        vp.pump();
        assert_eq!(*zooms.borrow(), vec![2.0]);
    }
}
