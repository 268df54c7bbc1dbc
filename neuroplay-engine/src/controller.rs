//! Adaptive difficulty controller
use serde::{Deserialize, Serialize};

use crate::advisory::{Advisory, Locale};
use crate::aggregator::{PerformanceAggregator, PerformanceStats};
use crate::attempt::AttemptInput;
use crate::clock::{Clock, SystemClock};
use crate::config::{AdaptiveConfig, ConfigError};
use crate::constants::LOG_TARGET_ADAPTIVE;
use crate::params::ParameterSet;
use crate::policy::{Decision, decide, step_for};

/// Audit entry written by every adjustment pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub timestamp_ms: i64,
    pub decision: Decision,
    pub accuracy: f64,
    pub avg_reaction_time_ms: f64,
    pub reaction_time_std_dev: f64,
}

/// Returned to the game after an adjustment pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentResult {
    pub decision: Decision,
    pub advisory: Advisory,
    /// Advisory rendered in the controller's locale.
    pub message: String,
    pub params: ParameterSet,
}

/// Read-only diagnostics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerStats {
    /// Attempts recorded since construction or the last reset.
    pub total_attempts: u64,
    /// Attempts currently held by the aggregator.
    pub retained_attempts: usize,
    pub recent_accuracy: f64,
    pub avg_reaction_time_ms: f64,
    pub reaction_time_std_dev: f64,
    pub adjustment_count: u64,
    pub last_adjustment: Option<AdjustmentRecord>,
    pub current_params: ParameterSet,
}

/// Where the controller sits within its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerPhase {
    AwaitingWindow { collected: usize, window: usize },
    /// Transient: the window just filled and a pass is running.
    Evaluating,
}

/// Closed-loop controller keeping the player inside the target accuracy band.
///
/// One instance per game session. Mutation goes through `&mut self`; a host
/// sharing a controller between threads wraps it in a `Mutex`.
#[derive(Debug, Clone)]
pub struct AdaptiveController<C = SystemClock> {
    config: AdaptiveConfig,
    locale: Locale,
    aggregator: PerformanceAggregator<C>,
    params: ParameterSet,
    attempt_count: u64,
    adjustment_count: u64,
    last_adjustment: Option<AdjustmentRecord>,
}

impl AdaptiveController<SystemClock> {
    /// Controller with the reference tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::build(AdaptiveConfig::default(), SystemClock)
    }

    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails validation.
    pub fn with_config(config: AdaptiveConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_clock(config, SystemClock)
    }
}

impl Default for AdaptiveController<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> AdaptiveController<C> {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails validation.
    pub fn with_config_and_clock(config: AdaptiveConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: AdaptiveConfig, clock: C) -> Self {
        Self {
            aggregator: PerformanceAggregator::with_clock(config.window_size, clock),
            params: config.defaults,
            config,
            locale: Locale::default(),
            attempt_count: 0,
            adjustment_count: 0,
            last_adjustment: None,
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Record one player response; every `window_size`-th call runs an adjustment pass.
    pub fn record_attempt(&mut self, input: AttemptInput) -> Option<AdjustmentResult> {
        self.aggregator.record(input);
        match self.advance() {
            ControllerPhase::Evaluating => Some(self.adjust()),
            ControllerPhase::AwaitingWindow { .. } => None,
        }
    }

    fn advance(&mut self) -> ControllerPhase {
        self.attempt_count += 1;
        if self.collected_in_window() == 0 {
            ControllerPhase::Evaluating
        } else {
            self.phase()
        }
    }

    fn collected_in_window(&self) -> usize {
        let window = u64::try_from(self.config.window_size).unwrap_or(u64::MAX);
        usize::try_from(self.attempt_count % window).unwrap_or(0)
    }

    fn adjust(&mut self) -> AdjustmentResult {
        let stats = self.aggregator.compute_stats(self.config.window_size);
        let decision = decide(&stats, &self.config.thresholds);
        if let Some(step) = step_for(decision, &self.config) {
            self.params = self.params.scaled(&step, &self.config.bounds);
        }

        let advisory = Advisory::for_decision(decision);
        self.adjustment_count += 1;
        self.last_adjustment = Some(AdjustmentRecord {
            timestamp_ms: self.aggregator.clock().now_ms(),
            decision,
            accuracy: stats.accuracy,
            avg_reaction_time_ms: stats.avg_reaction_time_ms,
            reaction_time_std_dev: stats.reaction_time_std_dev,
        });

        log::debug!(
            target: LOG_TARGET_ADAPTIVE,
            "{} accuracy={:.1}% avg_rt={:.0}ms rt_sd={:.0}ms speed={:.2} challenge={:.5} obstacle={:.2} gravity={:.2}",
            decision,
            stats.accuracy * 100.0,
            stats.avg_reaction_time_ms,
            stats.reaction_time_std_dev,
            self.params.speed,
            self.params.challenge_frequency,
            self.params.obstacle_speed,
            self.params.gravity
        );

        AdjustmentResult {
            decision,
            advisory,
            message: advisory.message(self.locale).to_string(),
            params: self.params,
        }
    }

    /// Copy of the current parameters.
    #[must_use]
    pub const fn params(&self) -> ParameterSet {
        self.params
    }

    /// Statistics over the current window without running a pass.
    #[must_use]
    pub fn window_stats(&self) -> PerformanceStats {
        self.aggregator.compute_stats(self.config.window_size)
    }

    #[must_use]
    pub fn stats(&self) -> ControllerStats {
        let window = self.window_stats();
        ControllerStats {
            total_attempts: self.attempt_count,
            retained_attempts: self.aggregator.len(),
            recent_accuracy: window.accuracy,
            avg_reaction_time_ms: window.avg_reaction_time_ms,
            reaction_time_std_dev: window.reaction_time_std_dev,
            adjustment_count: self.adjustment_count,
            last_adjustment: self.last_adjustment,
            current_params: self.params,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ControllerPhase {
        ControllerPhase::AwaitingWindow {
            collected: self.collected_in_window(),
            window: self.config.window_size,
        }
    }

    #[must_use]
    pub const fn last_adjustment(&self) -> Option<&AdjustmentRecord> {
        self.last_adjustment.as_ref()
    }

    #[must_use]
    pub const fn adjustment_count(&self) -> u64 {
        self.adjustment_count
    }

    #[must_use]
    pub const fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub const fn aggregator(&self) -> &PerformanceAggregator<C> {
        &self.aggregator
    }

    /// Restore the freshly constructed state; config, locale and clock are kept.
    pub fn reset(&mut self) {
        self.aggregator.clear();
        self.attempt_count = 0;
        self.adjustment_count = 0;
        self.last_adjustment = None;
        self.params = self.config.defaults;
        log::debug!(target: LOG_TARGET_ADAPTIVE, "controller reset to defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn controller() -> AdaptiveController<ManualClock> {
        AdaptiveController::with_config_and_clock(
            AdaptiveConfig::default(),
            ManualClock::starting_at(1_000),
        )
        .expect("default config is valid")
    }

    fn feed(
        controller: &mut AdaptiveController<ManualClock>,
        count: usize,
        correct: bool,
        rt: f64,
    ) -> Vec<Option<AdjustmentResult>> {
        (0..count)
            .map(|_| controller.record_attempt(AttemptInput::new(correct, rt, "obstacle")))
            .collect()
    }

    #[test]
    fn only_the_tenth_call_adjusts() {
        let mut ctl = controller();
        let results = feed(&mut ctl, 10, true, 500.0);
        assert!(results[..9].iter().all(Option::is_none));
        let result = results[9].as_ref().expect("tenth call adjusts");
        assert_eq!(result.decision, Decision::Increase);
        assert_eq!(result.advisory, Advisory::DifficultyIncreased);
    }

    #[test]
    fn phase_tracks_window_progress() {
        let mut ctl = controller();
        assert_eq!(
            ctl.phase(),
            ControllerPhase::AwaitingWindow {
                collected: 0,
                window: 10
            }
        );
        feed(&mut ctl, 3, true, 500.0);
        assert_eq!(
            ctl.phase(),
            ControllerPhase::AwaitingWindow {
                collected: 3,
                window: 10
            }
        );
        feed(&mut ctl, 7, true, 500.0);
        assert_eq!(
            ctl.phase(),
            ControllerPhase::AwaitingWindow {
                collected: 0,
                window: 10
            }
        );
    }

    #[test]
    fn adjustment_record_is_stamped_and_counted() {
        let mut ctl = controller();
        feed(&mut ctl, 10, true, 1_000.0);
        let record = ctl.last_adjustment().copied().expect("record written");
        assert_eq!(record.decision, Decision::Maintain);
        assert_eq!(record.timestamp_ms, 1_000);
        assert!((record.accuracy - 1.0).abs() < f64::EPSILON);
        assert!((record.avg_reaction_time_ms - 1_000.0).abs() < 1e-9);
        assert_eq!(ctl.adjustment_count(), 1);
    }

    #[test]
    fn returned_params_are_copies() {
        let mut ctl = controller();
        let mut params = ctl.params();
        params.speed = 99.0;
        let mut stats = ctl.stats();
        stats.current_params.gravity = 0.0;
        assert!((ctl.params().speed - 5.0).abs() < f64::EPSILON);
        assert!((ctl.stats().current_params.gravity - 0.8).abs() < f64::EPSILON);

        let mut result = feed(&mut ctl, 10, true, 500.0)
            .pop()
            .flatten()
            .expect("adjustment");
        result.params.speed = 1.0;
        assert!((ctl.params().speed - 5.5).abs() < 1e-9);
    }

    #[test]
    fn stats_report_totals_beyond_retention() {
        let mut ctl = controller();
        feed(&mut ctl, 35, false, 2_500.0);
        let stats = ctl.stats();
        assert_eq!(stats.total_attempts, 35);
        assert_eq!(stats.retained_attempts, 20);
        assert_eq!(stats.adjustment_count, 3);
        assert!(stats.recent_accuracy.abs() < f64::EPSILON);
    }

    #[test]
    fn reset_restores_configured_defaults() {
        let mut ctl = controller();
        feed(&mut ctl, 40, true, 400.0);
        assert!(ctl.params().speed > 5.0);
        ctl.reset();
        assert_eq!(ctl.params(), ParameterSet::default());
        let stats = ctl.stats();
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.adjustment_count, 0);
        assert!(stats.last_adjustment.is_none());
        let results = feed(&mut ctl, 10, true, 400.0);
        assert!(results[..9].iter().all(Option::is_none));
        assert!(results[9].is_some());
    }

    #[test]
    fn locale_selects_message_language() {
        let mut ctl = controller().with_locale(Locale::Pt);
        let result = feed(&mut ctl, 10, false, 2_500.0)
            .pop()
            .flatten()
            .expect("adjustment");
        assert_eq!(result.decision, Decision::Decrease);
        assert_eq!(result.message, "📉 Dificuldade ajustada para melhor experiência");
    }

    #[test]
    fn custom_window_changes_cadence() {
        let config = AdaptiveConfig {
            window_size: 4,
            ..AdaptiveConfig::default()
        };
        let mut ctl =
            AdaptiveController::with_config_and_clock(config, ManualClock::default()).unwrap();
        let hits: Vec<usize> = feed(&mut ctl, 12, true, 500.0)
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().map(|_| i + 1))
            .collect();
        assert_eq!(hits, vec![4, 8, 12]);
        assert_eq!(ctl.aggregator().capacity(), 8);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AdaptiveConfig {
            window_size: 0,
            ..AdaptiveConfig::default()
        };
        assert!(AdaptiveController::with_config(config).is_err());
    }
}
