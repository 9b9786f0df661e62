//! Debounced query controller.

use std::time::{Duration, Instant};

/// Delay before a typed query is allowed to hit the suggestion source.
pub const QUERY_DEBOUNCE: Duration = Duration::from_millis(250);

/// Stabilizes a rapidly-changing text value: the settled value updates only
/// after `delay` of silence since the last change. Every change restarts
/// the window; intermediate values never emit. Callers pass `now`
/// explicitly, which keeps the timer deterministic under test.
#[derive(Debug, Clone)]
pub struct Debouncer {
    settled: String,
    pending: Option<String>,
    deadline: Option<Instant>,
    delay: Duration,
}

impl Debouncer {
    pub fn new(initial: impl Into<String>, delay: Duration) -> Self {
        Self {
            settled: initial.into(),
            pending: None,
            deadline: None,
            delay,
        }
    }

    /// Feed a raw value. Feeding the already-settled value cancels any
    /// open window instead of scheduling a no-op emission.
    pub fn set(&mut self, value: &str, now: Instant) {
        if value == self.settled {
            self.pending = None;
            self.deadline = None;
            return;
        }
        self.pending = Some(value.to_string());
        self.deadline = Some(now + self.delay);
    }

    /// Returns true exactly when a pending value settles; `settled()` then
    /// reflects it. At most one emission per quiescence window.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                if let Some(value) = self.pending.take() {
                    self.settled = value;
                }
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Replace the settled value outright, dropping any open window
    /// without emitting. Used on selection and teardown.
    pub fn reset(&mut self, value: impl Into<String>) {
        self.settled = value.into();
        self.pending = None;
        self.deadline = None;
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
