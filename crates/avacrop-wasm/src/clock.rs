//! Frame clock backed by host callbacks.
//!
//! The host passes two functions to the `JsViewport` constructor, usually thin
//! wrappers over `requestAnimationFrame` and `setTimeout` that call
//! `viewport.pump()`:
//!
//! ```typescript
//! const viewport = new JsViewport(
//!   { width: 256, height: 256 },
//!   () => requestAnimationFrame(() => viewport.pump()),
//!   (ms) => setTimeout(() => viewport.pump(), ms),
//! );
//! ```

use std::time::Duration;

use avacrop_core::clock::{FrameClock, FALLBACK_FRAME_INTERVAL};
use js_sys::Function;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Performance;

pub(crate) struct JsClock {
    performance: Option<Performance>,
    request_frame: Option<Function>,
    request_timeout: Option<Function>,
}

/// `globalThis.performance`, present in windows and workers.
fn global_performance() -> Option<Performance> {
    js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("performance"))
        .ok()?
        .dyn_into::<Performance>()
        .ok()
}

/// Milliseconds to a duration; negative and non-finite values become zero.
fn millis_to_duration(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

impl JsClock {
    pub(crate) fn new(request_frame: Option<Function>, request_timeout: Option<Function>) -> Self {
        if request_timeout.is_none() {
            tracing::warn!("no requestTimeout callback; change events need manual pump() calls");
        }
        let performance = global_performance();
        if performance.is_none() {
            tracing::warn!("performance.now() unavailable; falling back to Date.now()");
        }
        Self {
            performance,
            request_frame,
            request_timeout,
        }
    }
}

impl FrameClock for JsClock {
    fn now(&self) -> Duration {
        let ms = match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        };
        millis_to_duration(ms)
    }

    fn request_timeout(&self, delay: Duration) {
        let Some(callback) = &self.request_timeout else {
            return;
        };
        let ms = JsValue::from_f64(delay.as_secs_f64() * 1000.0);
        if let Err(err) = callback.call1(&JsValue::NULL, &ms) {
            tracing::warn!(?err, "requestTimeout callback threw");
        }
    }

    fn request_frame(&self) {
        match &self.request_frame {
            Some(callback) => {
                if let Err(err) = callback.call0(&JsValue::NULL) {
                    tracing::warn!(?err, "requestFrame callback threw");
                }
            }
            None => self.request_timeout(FALLBACK_FRAME_INTERVAL),
        }
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_now_is_monotonic() {
        let clock = JsClock::new(None, None);
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
