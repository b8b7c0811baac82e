//! Trailing-edge debouncing.
//!
//! Resize events arrive in bursts while a window edge is dragged. A
//! [`Debouncer`] keeps only the latest value and releases it once no new
//! value has arrived for the quiet period.

use std::time::{Duration, Instant};

/// Holds the latest triggered value until the quiet period has passed.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    /// Record a new value, replacing any pending one and restarting the timer.
    pub fn trigger(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if it has been quiet long enough.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*at) < self.quiet {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// When the pending value will be released.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.quiet)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value without releasing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
