//! Decides when the cached snapshot is stale and a fetch is due.

pub mod backoff;

use std::time::{Duration, Instant};

pub use backoff::BackoffController;

/// How long a snapshot is served before a refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Fetching,
    Standby,
}

#[derive(Debug, Clone)]
pub struct PollScheduler {
    refresh_interval: Duration,
    phase: PollPhase,
    last_fetch: Option<Instant>,
    backoff: BackoffController,
}

impl PollScheduler {
    /// Starts in `Fetching`: nothing has been retrieved yet.
    pub fn new(refresh_interval: Duration, backoff: BackoffController) -> Self {
        Self {
            refresh_interval,
            phase: PollPhase::Fetching,
            last_fetch: None,
            backoff,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn last_fetch(&self) -> Option<Instant> {
        self.last_fetch
    }

    /// Move Standby to Fetching once more than the refresh interval has passed
    /// since the last successful fetch.
    pub fn tick(&mut self, now: Instant) -> PollPhase {
        if self.phase == PollPhase::Standby {
            let stale = self
                .last_fetch
                .map_or(true, |at| now.saturating_duration_since(at) > self.refresh_interval);
            if stale {
                self.phase = PollPhase::Fetching;
            }
        }
        self.phase
    }

    /// True when a fetch should be attempted right now.
    pub fn fetch_due(&self, now: Instant) -> bool {
        self.phase == PollPhase::Fetching && self.backoff.should_retry(now)
    }

    pub fn mark_success(&mut self, now: Instant) {
        self.last_fetch = Some(now);
        self.phase = PollPhase::Standby;
        self.backoff.mark_success();
    }

    /// Stay in `Fetching`; returns the delay before the next attempt.
    pub fn mark_failure(&mut self, now: Instant) -> Duration {
        self.phase = PollPhase::Fetching;
        self.backoff.mark_failure(now)
    }
}
