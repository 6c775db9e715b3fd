//! Idle timer.
//!
//! A pure value with no threads or clocks of its own: the owner reports activity with
//! [`IdleTimer::touch`] and asks [`IdleTimer::poll`] whether the quiet period has elapsed,
//! passing the current [`Instant`] both times.

use std::time::{Duration, Instant};

/// Fires once after a period without activity.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    delay: Duration,
    last_activity: Option<Instant>,
    cancelled: bool,
}

impl IdleTimer {
    /// Create an unarmed timer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_activity: None,
            cancelled: false,
        }
    }

    /// The quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record activity at `now`, (re)arming the timer.
    pub fn touch(&mut self, now: Instant) {
        if !self.cancelled {
            self.last_activity = Some(now);
        }
    }

    /// Returns `true` if the timer will fire once its deadline passes.
    pub fn is_armed(&self) -> bool {
        self.last_activity.is_some()
    }

    /// Returns `true` after [`IdleTimer::cancel`].
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// When the timer fires, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_activity.map(|at| at + self.delay)
    }

    /// Returns `true` (and disarms) if at least `delay` has passed since the last activity.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_activity else {
            return false;
        };
        if now.saturating_duration_since(last) < self.delay {
            return false;
        }
        self.last_activity = None;
        true
    }

    /// Disarm permanently; later activity is ignored.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.last_activity = None;
    }
}
