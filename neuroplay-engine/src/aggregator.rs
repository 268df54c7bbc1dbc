//! Rolling performance statistics over a bounded attempt history.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::attempt::{Attempt, AttemptInput};
use crate::clock::{Clock, SystemClock};
use crate::constants::{
    DEFAULT_WINDOW_SIZE, EMPTY_WINDOW_ACCURACY, HISTORY_WINDOW_MULTIPLIER, LOG_TARGET_ADAPTIVE,
    MAX_WINDOW_SIZE, NEUTRAL_REACTION_TIME_MS, PREALLOCATED_SLOTS,
};
use crate::numbers::{mean_and_population_std_dev, ratio_or};

/// Descriptive statistics over the trailing window of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub accuracy: f64,
    pub avg_reaction_time_ms: f64,
    pub reaction_time_std_dev: f64,
}

impl PerformanceStats {
    /// Optimistic defaults reported when no attempts are available.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            accuracy: EMPTY_WINDOW_ACCURACY,
            avg_reaction_time_ms: NEUTRAL_REACTION_TIME_MS,
            reaction_time_std_dev: 0.0,
        }
    }
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self::neutral()
    }
}

/// FIFO history of attempts capped at twice the statistics window.
#[derive(Debug, Clone)]
pub struct PerformanceAggregator<C = SystemClock> {
    window_size: usize,
    history: VecDeque<Attempt>,
    clock: C,
}

impl PerformanceAggregator<SystemClock> {
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        Self::with_clock(window_size, SystemClock)
    }
}

impl Default for PerformanceAggregator<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl<C: Clock> PerformanceAggregator<C> {
    /// Build an aggregator stamping attempts from `clock`.
    ///
    /// The window is clamped into `1..=10_000`, so the history always keeps the
    /// latest attempt and its capacity never overflows.
    #[must_use]
    pub fn with_clock(window_size: usize, clock: C) -> Self {
        let window_size = window_size.clamp(1, MAX_WINDOW_SIZE);
        let reserved = (window_size * HISTORY_WINDOW_MULTIPLIER + 1).min(PREALLOCATED_SLOTS);
        Self {
            window_size,
            history: VecDeque::with_capacity(reserved),
            clock,
        }
    }

    /// Append a timestamped copy of `input`, evicting the oldest entries past capacity.
    pub fn record(&mut self, input: AttemptInput) {
        let attempt = Attempt::stamped(input, self.clock.now_ms());
        log::trace!(
            target: LOG_TARGET_ADAPTIVE,
            "attempt kind={} correct={} rt={}ms",
            attempt.kind,
            attempt.correct,
            attempt.reaction_time_ms
        );
        self.history.push_back(attempt);
        while self.history.len() > self.capacity() {
            self.history.pop_front();
        }
    }

    /// Statistics over the most recent `window` attempts (or all, if fewer).
    #[must_use]
    pub fn compute_stats(&self, window: usize) -> PerformanceStats {
        let take = window.min(self.history.len());
        if take == 0 {
            return PerformanceStats::neutral();
        }
        let recent = self.history.iter().skip(self.history.len() - take);

        let mut correct = 0usize;
        let mut timings = Vec::with_capacity(take);
        for attempt in recent {
            if attempt.correct {
                correct += 1;
            }
            if attempt.has_timing() {
                timings.push(attempt.reaction_time_ms);
            }
        }

        let (avg_reaction_time_ms, reaction_time_std_dev) =
            mean_and_population_std_dev(&timings).unwrap_or((NEUTRAL_REACTION_TIME_MS, 0.0));

        PerformanceStats {
            accuracy: ratio_or(correct, take, EMPTY_WINDOW_ACCURACY),
            avg_reaction_time_ms,
            reaction_time_std_dev,
        }
    }

    /// Statistics over the configured window.
    #[must_use]
    pub fn window_stats(&self) -> PerformanceStats {
        self.compute_stats(self.window_size)
    }

    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Maximum number of retained attempts.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.window_size * HISTORY_WINDOW_MULTIPLIER
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Retained attempts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Attempt> {
        self.history.iter()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }
}
