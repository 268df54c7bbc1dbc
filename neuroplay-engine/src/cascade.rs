//! Error cascade detection over a short outcome buffer.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::advisory::Advisory;
use crate::clock::{Clock, SystemClock};
use crate::config::{CascadeConfig, ConfigError};
use crate::constants::{
    CASCADE_CRITICAL_ERRORS, CASCADE_DEFAULT_RECENT, CASCADE_HIGH_ERRORS, LOG_TARGET_CASCADE,
    PREALLOCATED_SLOTS, TREND_MARGIN, TREND_MIN_SAMPLES, TREND_SEGMENT,
};
use crate::numbers::{ratio_or, round_to};

/// One buffered outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    pub correct: bool,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn from_errors(errors: usize) -> Self {
        if errors >= CASCADE_CRITICAL_ERRORS {
            Self::Critical
        } else if errors >= CASCADE_HIGH_ERRORS {
            Self::High
        } else {
            Self::Medium
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeAction {
    ReduceDifficulty,
}

/// Details of a detected cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeAlert {
    /// Errors among the inspected attempts.
    pub errors: usize,
    pub action: CascadeAction,
    pub suggestion: Advisory,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CascadeStatus {
    Clear,
    Detected(CascadeAlert),
}

impl CascadeStatus {
    #[must_use]
    pub const fn is_cascade(&self) -> bool {
        matches!(self, Self::Detected(_))
    }

    #[must_use]
    pub const fn alert(&self) -> Option<&CascadeAlert> {
        match self {
            Self::Detected(alert) => Some(alert),
            Self::Clear => None,
        }
    }
}

/// Buffer summary; accuracy is a percentage rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadeStats {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub accuracy_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    InsufficientData,
    Improving,
    Declining,
    Stable,
}

/// Flags runs of errors so the host can offer a break or ease off.
#[derive(Debug, Clone)]
pub struct ErrorCascadeDetector<C = SystemClock> {
    config: CascadeConfig,
    buffer: VecDeque<CascadeOutcome>,
    clock: C,
}

impl ErrorCascadeDetector<SystemClock> {
    #[must_use]
    pub fn new() -> Self {
        Self::build(CascadeConfig::default(), SystemClock)
    }

    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails validation.
    pub fn with_config(config: CascadeConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_clock(config, SystemClock)
    }
}

impl Default for ErrorCascadeDetector<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ErrorCascadeDetector<C> {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails validation.
    pub fn with_config_and_clock(config: CascadeConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: CascadeConfig, clock: C) -> Self {
        Self {
            buffer: VecDeque::with_capacity(config.buffer_size.min(PREALLOCATED_SLOTS)),
            config,
            clock,
        }
    }

    pub fn add_attempt(&mut self, correct: bool) -> CascadeStatus {
        self.buffer.push_back(CascadeOutcome {
            correct,
            timestamp_ms: self.clock.now_ms(),
        });
        while self.buffer.len() > self.config.buffer_size {
            self.buffer.pop_front();
        }

        let status = self.check();
        if let Some(alert) = status.alert() {
            log::info!(
                target: LOG_TARGET_CASCADE,
                "error cascade: {} errors in last {} attempts, severity {:?}",
                alert.errors,
                self.config.inspect_window,
                alert.severity
            );
        }
        status
    }

    #[must_use]
    pub fn check(&self) -> CascadeStatus {
        if self.buffer.len() < self.config.threshold {
            return CascadeStatus::Clear;
        }
        let errors = self
            .newest(self.config.inspect_window)
            .filter(|outcome| !outcome.correct)
            .count();
        if errors < self.config.threshold {
            return CascadeStatus::Clear;
        }
        CascadeStatus::Detected(CascadeAlert {
            errors,
            action: CascadeAction::ReduceDifficulty,
            suggestion: Advisory::BreakSuggested,
            severity: Severity::from_errors(errors),
        })
    }

    #[must_use]
    pub fn should_suggest_break(&self) -> bool {
        self.check()
            .alert()
            .is_some_and(|alert| alert.severity == Severity::Critical)
    }

    #[must_use]
    pub fn stats(&self) -> CascadeStats {
        let total = self.buffer.len();
        let correct = self.buffer.iter().filter(|o| o.correct).count();
        CascadeStats {
            total,
            correct,
            incorrect: total - correct,
            accuracy_pct: round_to(ratio_or(correct, total, 0.0) * 100.0, 1),
        }
    }

    #[must_use]
    pub fn trend(&self) -> Trend {
        if self.buffer.len() < TREND_MIN_SAMPLES {
            return Trend::InsufficientData;
        }
        let older = segment_accuracy(self.buffer.iter().take(TREND_SEGMENT));
        let newer = segment_accuracy(self.newest(TREND_SEGMENT));
        if newer > older + TREND_MARGIN {
            Trend::Improving
        } else if newer < older - TREND_MARGIN {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    /// Newest `count` outcomes, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<CascadeOutcome> {
        self.newest(count).copied().collect()
    }

    #[must_use]
    pub fn recent_default(&self) -> Vec<CascadeOutcome> {
        self.recent(CASCADE_DEFAULT_RECENT)
    }

    fn newest(&self, count: usize) -> impl Iterator<Item = &CascadeOutcome> {
        self.buffer.iter().skip(self.buffer.len().saturating_sub(count))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub const fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

fn segment_accuracy<'a>(segment: impl Iterator<Item = &'a CascadeOutcome>) -> f64 {
    let (hits, total) = segment.fold((0, 0), |(hits, total), outcome| {
        (hits + usize::from(outcome.correct), total + 1)
    });
    ratio_or(hits, total, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn detector() -> ErrorCascadeDetector<ManualClock> {
        ErrorCascadeDetector::with_config_and_clock(
            CascadeConfig::default(),
            ManualClock::starting_at(42),
        )
        .expect("default cascade config is valid")
    }

    fn feed(detector: &mut ErrorCascadeDetector<ManualClock>, outcomes: &[bool]) -> CascadeStatus {
        outcomes
            .iter()
            .map(|&correct| detector.add_attempt(correct))
            .last()
            .unwrap_or(CascadeStatus::Clear)
    }

    #[test]
    fn needs_threshold_attempts_before_flagging() {
        let mut d = detector();
        assert_eq!(feed(&mut d, &[false, false, false]), CascadeStatus::Clear);
        let status = d.add_attempt(false);
        let alert = status.alert().expect("four straight errors cascade");
        assert_eq!(alert.errors, 4);
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.action, CascadeAction::ReduceDifficulty);
        assert_eq!(alert.suggestion, Advisory::BreakSuggested);
        assert!(!d.should_suggest_break());
    }

    #[test]
    fn five_errors_is_critical_and_suggests_break() {
        let mut d = detector();
        let status = feed(&mut d, &[true, false, false, false, false, false]);
        assert_eq!(status.alert().map(|a| a.severity), Some(Severity::Critical));
        assert!(d.should_suggest_break());
    }

    #[test]
    fn only_the_inspect_window_counts() {
        let mut d = detector();
        let status = feed(&mut d, &[false, false, false, false, true, true]);
        assert!(!status.is_cascade());
        let status = feed(&mut d, &[false, true, false, false, false]);
        assert_eq!(status.alert().map(|a| a.errors), Some(4));
    }

    #[test]
    fn lower_threshold_reports_medium() {
        let config = CascadeConfig {
            threshold: 3,
            ..CascadeConfig::default()
        };
        let mut d = ErrorCascadeDetector::with_config_and_clock(config, ManualClock::default())
            .expect("valid");
        let status = feed(&mut d, &[false, false, false]);
        assert_eq!(status.alert().map(|a| a.severity), Some(Severity::Medium));
    }

    #[test]
    fn buffer_is_bounded() {
        let mut d = detector();
        feed(&mut d, &[true; 15]);
        assert_eq!(d.len(), 10);
        assert_eq!(d.recent(3).len(), 3);
        assert_eq!(d.recent(50).len(), 10);
        assert!(d.recent_default().iter().all(|o| o.timestamp_ms == 42));
    }

    #[test]
    fn stats_round_to_one_decimal() {
        let mut d = detector();
        assert_eq!(
            d.stats(),
            CascadeStats {
                total: 0,
                correct: 0,
                incorrect: 0,
                accuracy_pct: 0.0
            }
        );
        feed(&mut d, &[true, true, false]);
        let stats = d.stats();
        assert_eq!((stats.total, stats.correct, stats.incorrect), (3, 2, 1));
        assert!((stats.accuracy_pct - 66.7).abs() < 1e-9);
    }

    #[test]
    fn trend_compares_oldest_and_newest_segments() {
        let mut d = detector();
        feed(&mut d, &[false, false, false, true, true]);
        assert_eq!(d.trend(), Trend::InsufficientData);
        d.add_attempt(true);
        assert_eq!(d.trend(), Trend::Improving);

        d.reset();
        assert!(d.is_empty());
        feed(&mut d, &[true, true, true, false, false, false]);
        assert_eq!(d.trend(), Trend::Declining);

        d.reset();
        feed(&mut d, &[true, false, true, true, true, false]);
        assert_eq!(d.trend(), Trend::Stable);
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(CascadeStatus::Clear).expect("serialize");
        assert_eq!(json["status"], "clear");
    }
}
