//! Explicit cancellable settle timer.
//!
//! Each keystroke replaces the pending deadline, so only the last input
//! inside a settle window ever fires — at most one suggestions fetch per
//! window. Time is injected so the behavior is testable without sleeping.

use std::time::{Duration, Instant};

/// Classic trailing-edge debounce over an injected clock.
#[derive(Debug)]
pub struct Debouncer {
    settle: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Default settle window for search inputs.
    pub const SEARCH_SETTLE: Duration = Duration::from_millis(300);

    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            deadline: None,
        }
    }

    /// Schedule (or reschedule) the deadline. Cancels any pending one.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.settle);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True while a deadline is armed.
    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the settle window has elapsed, then
    /// disarms. Call from the event-loop tick.
    pub fn fire(&mut self, now: Instant) -> bool {
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

    const SETTLE: Duration = Duration::from_millis(300);

    #[test]
    fn fires_once_after_settle_window() {
        let mut d = Debouncer::new(SETTLE);
        let t0 = Instant::now();
        d.poke(t0);
        assert!(!d.fire(t0 + Duration::from_millis(299)));
        assert!(d.fire(t0 + Duration::from_millis(300)));
        // Disarmed after firing.
        assert!(!d.fire(t0 + Duration::from_millis(600)));
    }

    #[test]
    fn rapid_pokes_collapse_to_one_fire() {
        let mut d = Debouncer::new(SETTLE);
        let t0 = Instant::now();
        // Keystrokes 100 ms apart, each inside the previous window.
        let mut fired = 0;
        for i in 0..5 {
            d.poke(t0 + Duration::from_millis(i * 100));
            if d.fire(t0 + Duration::from_millis(i * 100 + 50)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 0);
        // 300 ms after the last keystroke: exactly one fire.
        assert!(d.fire(t0 + Duration::from_millis(400 + 300)));
        assert_eq!(fired, 0);
    }

    #[test]
    fn cancel_disarms() {
        let mut d = Debouncer::new(SETTLE);
        let t0 = Instant::now();
        d.poke(t0);
        d.cancel();
        assert!(!d.pending());
        assert!(!d.fire(t0 + SETTLE));
    }
}
