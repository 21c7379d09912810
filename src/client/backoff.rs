//! Exponential backoff for batch-write retries
//!
//! The policy is a pure description (`current interval -> (sleep, next interval)`);
//! the per-call mutable part lives in [`BackoffTimer`], which is created on the
//! first retry of a call and dropped with it.

use rand::Rng;
use std::time::Duration;

/// Exponential backoff profile
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Sleep before the first retry, and after every reset
    pub initial_interval: Duration,
    /// Growth factor between consecutive sleeps
    pub multiplier: f64,
    /// Cap on a single sleep
    pub max_interval: Duration,
    /// Cap on the sum of all sleeps handed out by one timer (`None` = unbounded)
    pub max_elapsed_time: Option<Duration>,
    /// Draw each sleep uniformly from `0..=interval` (default: false)
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(100),
            multiplier: 1.5,
            max_interval: Duration::from_secs(30),
            max_elapsed_time: None,
            jitter: false,
        }
    }
}

impl BackoffPolicy {
    /// Create a policy without elapsed-time limit or jitter
    pub fn new(initial_interval: Duration, multiplier: f64, max_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier,
            max_interval,
            max_elapsed_time: None,
            jitter: false,
        }
    }

    /// Interval that follows `current`
    ///
    /// Uses exponential growth: next = current * multiplier, capped at `max_interval`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        let next_nanos = (current.as_nanos() as f64 * self.multiplier).round();
        if !next_nanos.is_finite() || next_nanos >= self.max_interval.as_nanos() as f64 {
            return self.max_interval;
        }
        Duration::from_nanos(next_nanos.max(0.0) as u64)
    }

    /// One backoff step: the sleep for `current` and the interval after it
    pub fn step(&self, current: Duration) -> (Duration, Duration) {
        (current.min(self.max_interval), self.next_interval(current))
    }

    /// Start a timer at the initial interval
    pub fn start(&self) -> BackoffTimer {
        BackoffTimer {
            policy: self.clone(),
            current_interval: self.initial_interval,
            elapsed: Duration::ZERO,
        }
    }
}

/// Mutable backoff state for one call
#[derive(Debug, Clone)]
pub struct BackoffTimer {
    policy: BackoffPolicy,
    current_interval: Duration,
    elapsed: Duration,
}

impl BackoffTimer {
    /// Next sleep duration
    ///
    /// Returns `None` once the sleeps handed out so far reach `max_elapsed_time`.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if let Some(max_elapsed) = self.policy.max_elapsed_time {
            if self.elapsed >= max_elapsed {
                return None;
            }
        }

        let (interval, next) = self.policy.step(self.current_interval);
        self.current_interval = next;

        let sleep = if self.policy.jitter {
            let capped_ms = interval.as_millis() as u64;
            let mut rng = rand::thread_rng();
            Duration::from_millis(rng.gen_range(0..=capped_ms))
        } else {
            interval
        };

        self.elapsed = self.elapsed.saturating_add(sleep);
        Some(sleep)
    }

    /// Go back to the initial interval
    ///
    /// The elapsed total is kept.
    pub fn reset(&mut self) {
        self.current_interval = self.policy.initial_interval;
    }

    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Sum of all sleeps handed out so far
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
