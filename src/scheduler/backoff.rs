use std::time::{Duration, Instant};

/// Doubling retry delay between `initial` and `max`.
#[derive(Debug, Clone)]
pub struct BackoffController {
    initial: Duration,
    max: Duration,
    current: Duration,
    next_retry: Option<Instant>,
}

impl BackoffController {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
            next_retry: None,
        }
    }

    /// True when no failure is pending or its delay has elapsed.
    pub fn should_retry(&self, now: Instant) -> bool {
        self.next_retry.map_or(true, |at| now >= at)
    }

    /// Schedule the next attempt and grow the delay. Returns the delay used.
    pub fn mark_failure(&mut self, now: Instant) -> Duration {
        let delay = self.current;
        self.next_retry = Some(now + delay);
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn mark_success(&mut self) {
        self.current = self.initial;
        self.next_retry = None;
    }

    pub fn current_delay(&self) -> Duration {
        self.current
    }
}
