//! Time-based interpolation between two transforms.
//!
//! The animator does not own a timer. The viewport asks it to [`start`] a
//! job and then calls [`tick`] with the host clock's time on every frame.
//!
//! [`start`]: Animator::start
//! [`tick`]: Animator::tick

use std::time::Duration;

use super::state::TransformState;

/// One in-flight movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationJob {
    pub start_time: Duration,
    pub duration: Duration,
    pub from: TransformState,
    pub to: TransformState,
}

impl AnimationJob {
    pub fn end_time(&self) -> Duration {
        self.start_time + self.duration
    }

    /// Progress in `[0, 1]` at `now`.
    pub fn fraction(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_time);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// State at `now`. At or past the end this is exactly `to`.
    pub fn sample(&self, now: Duration) -> TransformState {
        if now >= self.end_time() {
            self.to
        } else {
            self.from.lerp(&self.to, self.fraction(now))
        }
    }
}

/// Result of a frame tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// No job is running.
    Idle,
    /// Intermediate state; another frame is needed.
    Running(TransformState),
    /// Final state; the job is done.
    Finished(TransformState),
}

/// Holds at most one animation job.
#[derive(Debug, Default)]
pub struct Animator {
    job: Option<AnimationJob>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin moving from `from` to `to`, replacing any running job.
    ///
    /// A zero duration returns the target for immediate application and leaves
    /// the animator idle.
    pub fn start(
        &mut self,
        from: TransformState,
        to: TransformState,
        duration: Duration,
        now: Duration,
    ) -> Option<TransformState> {
        if duration.is_zero() {
            self.job = None;
            return Some(to);
        }

        if self.job.is_some() {
            tracing::trace!("replacing in-flight animation");
        }
        self.job = Some(AnimationJob {
            start_time: now,
            duration,
            from,
            to,
        });
        None
    }

    /// Advance to `now`.
    pub fn tick(&mut self, now: Duration) -> Step {
        let Some(job) = self.job else {
            return Step::Idle;
        };

        let state = job.sample(now);
        if now >= job.end_time() {
            self.job = None;
            Step::Finished(state)
        } else {
            Step::Running(state)
        }
    }

    pub fn is_active(&self) -> bool {
        self.job.is_some()
    }

    pub fn job(&self) -> Option<&AnimationJob> {
        self.job.as_ref()
    }

    /// Drop the running job. Used when the session is cleared.
    pub(crate) fn discard(&mut self) {
        self.job = None;
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
