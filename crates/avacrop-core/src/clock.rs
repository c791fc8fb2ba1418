//! Host frame clock and the settle debouncer.
//!
//! The viewport never sleeps or spawns. When it needs to run again it asks the
//! host through [`FrameClock`], and the host calls `Viewport::pump` when the
//! frame or timeout fires.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Interval used when the host has no frame primitive (~60 Hz).
pub const FALLBACK_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Quiet period before a `change` event fires.
pub const SETTLE_DELAY: Duration = Duration::from_millis(250);

/// Time and scheduling services supplied by the host.
pub trait FrameClock {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;

    /// Ask for `pump` to be called after `delay`.
    fn request_timeout(&self, delay: Duration);

    /// Ask for `pump` to be called on the next display frame.
    ///
    /// Hosts without a frame primitive get a fixed-interval timeout instead.
    fn request_frame(&self) {
        self.request_timeout(FALLBACK_FRAME_INTERVAL);
    }
}

#[derive(Debug, Default)]
struct ManualClockInner {
    now: Cell<Duration>,
    frame_requests: Cell<usize>,
    timeout_requests: Cell<usize>,
    last_timeout: Cell<Option<Duration>>,
}

/// A clock advanced by hand. Clones share the same time.
///
/// Requests are only counted, never delivered: the owner decides when to
/// call `pump`. Only the latest timeout delay is kept.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    inner: Rc<ManualClockInner>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.inner.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.inner.now.set(self.inner.now.get() + by);
    }

    /// Number of `request_frame` calls so far.
    pub fn frame_requests(&self) -> usize {
        self.inner.frame_requests.get()
    }

    /// Number of `request_timeout` calls so far.
    pub fn timeout_requests(&self) -> usize {
        self.inner.timeout_requests.get()
    }

    /// Delay of the most recent `request_timeout`.
    pub fn last_timeout(&self) -> Option<Duration> {
        self.inner.last_timeout.get()
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        self.inner.now.get()
    }

    fn request_timeout(&self, delay: Duration) {
        self.inner
            .timeout_requests
            .set(self.inner.timeout_requests.get() + 1);
        self.inner.last_timeout.set(Some(delay));
    }

    fn request_frame(&self) {
        self.inner
            .frame_requests
            .set(self.inner.frame_requests.get() + 1);
    }
}

/// Trailing-edge debouncer: fires once, `delay` after the last trigger.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SETTLE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the quiet period at `now`, replacing any pending deadline.
    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when `now` has reached the deadline.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
