//! Explicit debounce timer: last write wins, nothing is queued.

use std::time::{Duration, Instant};

/// A single re-armable deadline.
///
/// The owner passes `now` in on every call, which keeps the timer free of any
/// runtime and lets tests drive it with synthetic instants.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the timer at `now + quiet`. A pending deadline is dropped.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True exactly once per arming, on the first call at or after the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(1000);

    #[test]
    fn fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.schedule(t0);
        assert!(!d.fire_if_due(t0 + Duration::from_millis(999)));
        assert!(d.fire_if_due(t0 + QUIET));
        assert!(!d.fire_if_due(t0 + Duration::from_secs(5)));
        assert!(d.deadline().is_none());
    }

    #[test]
    fn reschedule_pushes_deadline_back() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(600));
        assert!(!d.fire_if_due(t0 + Duration::from_millis(1200)));
        assert!(d.fire_if_due(t0 + Duration::from_millis(1600)));
    }

    #[test]
    fn cancel_clears_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.schedule(t0);
        d.cancel();
        assert!(d.deadline().is_none());
        assert!(!d.fire_if_due(t0 + Duration::from_secs(2)));
    }
}
