//! Training session wiring one controller and one cascade detector to a game.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::advisory::Locale;
use crate::attempt::AttemptInput;
use crate::cascade::{CascadeStatus, ErrorCascadeDetector};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, EngineConfig};
use crate::constants::LOG_TARGET_SESSION;
use crate::controller::{AdaptiveController, AdjustmentResult};
use crate::numbers::ratio_or;
use crate::params::ParameterSet;

/// What one response produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub adjustment: Option<AdjustmentResult>,
    pub cascade: CascadeStatus,
}

/// Attempts and hits for one challenge kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTally {
    pub attempts: u64,
    pub correct: u64,
}

impl KindTally {
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let attempts = usize::try_from(self.attempts).unwrap_or(usize::MAX);
        let correct = usize::try_from(self.correct).unwrap_or(usize::MAX);
        ratio_or(correct, attempts, 0.0)
    }
}

/// End-of-session report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_attempts: u64,
    pub correct: u64,
    pub accuracy: f64,
    pub adjustments: u64,
    pub cascades_detected: u64,
    pub breaks_suggested: u64,
    pub final_params: ParameterSet,
    pub by_kind: BTreeMap<String, KindTally>,
    pub locale: Locale,
}

/// Stateful wrapper binding one controller and one cascade detector to a game session.
#[derive(Debug, Clone)]
pub struct TrainingSession<C = SystemClock> {
    controller: AdaptiveController<C>,
    cascade: ErrorCascadeDetector<C>,
    tallies: BTreeMap<String, KindTally>,
    cascades_detected: u64,
    breaks_suggested: u64,
}

impl TrainingSession<SystemClock> {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when either section of `config` is invalid.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone> TrainingSession<C> {
    /// Build a session whose components share `clock`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when either section of `config` is invalid.
    pub fn with_clock(config: EngineConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let controller = AdaptiveController::with_config_and_clock(config.adaptive, clock.clone())?
            .with_locale(config.locale);
        let cascade = ErrorCascadeDetector::with_config_and_clock(config.cascade, clock)?;
        Ok(Self {
            controller,
            cascade,
            tallies: BTreeMap::new(),
            cascades_detected: 0,
            breaks_suggested: 0,
        })
    }

    /// Feed one response to both the controller and the cascade detector.
    pub fn respond(&mut self, input: AttemptInput) -> SessionEvent {
        let tally = self.tallies.entry(input.kind.clone()).or_default();
        tally.attempts += 1;
        tally.correct += u64::from(input.correct);

        let cascade = self.cascade.add_attempt(input.correct);
        if cascade.is_cascade() {
            self.cascades_detected += 1;
            if self.cascade.should_suggest_break() {
                self.breaks_suggested += 1;
            }
        }
        let adjustment = self.controller.record_attempt(input);
        if let Some(result) = &adjustment {
            log::debug!(
                target: LOG_TARGET_SESSION,
                "adjustment #{} -> {}",
                self.controller.adjustment_count(),
                result.decision
            );
        }
        SessionEvent {
            adjustment,
            cascade,
        }
    }

    #[must_use]
    pub const fn params(&self) -> ParameterSet {
        self.controller.params()
    }

    #[must_use]
    pub const fn controller(&self) -> &AdaptiveController<C> {
        &self.controller
    }

    #[must_use]
    pub const fn cascade(&self) -> &ErrorCascadeDetector<C> {
        &self.cascade
    }

    #[must_use]
    pub const fn kind_tally(&self) -> &BTreeMap<String, KindTally> {
        &self.tallies
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        let (total_attempts, correct) = self
            .tallies
            .values()
            .fold((0, 0), |(n, c), t| (n + t.attempts, c + t.correct));
        let overall = KindTally {
            attempts: total_attempts,
            correct,
        };
        SessionSummary {
            total_attempts,
            correct,
            accuracy: overall.accuracy(),
            adjustments: self.controller.adjustment_count(),
            cascades_detected: self.cascades_detected,
            breaks_suggested: self.breaks_suggested,
            final_params: self.controller.params(),
            by_kind: self.tallies.clone(),
            locale: self.controller.locale(),
        }
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.cascade.reset();
        self.tallies.clear();
        self.cascades_detected = 0;
        self.breaks_suggested = 0;
        log::debug!(target: LOG_TARGET_SESSION, "session reset");
    }
}
