//! Single-shot debounce timer.
//!
//! The timer holds a deadline and is driven by its owner's event loop:
//! every [`DebounceTimer::start`] pushes the deadline out by the full
//! interval, and [`DebounceTimer::poll`] reports the expiry exactly once.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DebounceTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the timer, replacing any pending deadline
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` once when the deadline has passed, disarming the timer
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
