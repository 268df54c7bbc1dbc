//! Engine tuning loaded from code defaults or JSON overrides.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advisory::Locale;
use crate::constants::{
    CASCADE_BUFFER_SIZE, CASCADE_INSPECT_WINDOW, CASCADE_THRESHOLD,
    DECREASE_MAX_ACCURACY, DECREASE_MIN_REACTION_STD_DEV_MS, DECREASE_MIN_REACTION_TIME_MS,
    DEFAULT_WINDOW_SIZE, INCREASE_MAX_REACTION_TIME_MS, INCREASE_MIN_ACCURACY,
    MAX_CASCADE_BUFFER_SIZE, MAX_WINDOW_SIZE,
};
use crate::params::{ParamBounds, ParamSteps, ParameterSet};

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },
    #[error("{field} must be at most {max} (got {value})")]
    TooLarge {
        field: &'static str,
        max: usize,
        value: usize,
    },
    #[error("{field} bounds invalid (min {min} > max {max})")]
    BoundsInverted {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} default {value} lies outside [{min}, {max}]")]
    DefaultOutOfBounds {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{step}.{param} factor must be finite and positive (got {value})")]
    InvalidStep {
        step: &'static str,
        param: &'static str,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error(
        "accuracy band inverted: decrease below {decrease:.2} must not exceed increase above {increase:.2}"
    )]
    AccuracyBand { decrease: f64, increase: f64 },
    #[error("cascade threshold {threshold} exceeds inspection window {window}")]
    CascadeThreshold { threshold: usize, window: usize },
    #[error("cascade inspection window {window} exceeds buffer size {buffer}")]
    CascadeWindow { window: usize, buffer: usize },
    #[error("failed to parse engine configuration: {0}")]
    Parse(String),
}

/// Decision thresholds evaluated once per adjustment pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Accuracy strictly above which difficulty may rise.
    #[serde(default = "Thresholds::default_increase_accuracy")]
    pub increase_accuracy: f64,
    /// Mean reaction time strictly below which difficulty may rise.
    #[serde(default = "Thresholds::default_increase_reaction_ms")]
    pub increase_reaction_ms: f64,
    #[serde(default = "Thresholds::default_decrease_accuracy")]
    pub decrease_accuracy: f64,
    #[serde(default = "Thresholds::default_decrease_reaction_ms")]
    pub decrease_reaction_ms: f64,
    #[serde(default = "Thresholds::default_decrease_std_dev_ms")]
    pub decrease_std_dev_ms: f64,
}

impl Thresholds {
    const fn default_increase_accuracy() -> f64 {
        INCREASE_MIN_ACCURACY
    }

    const fn default_increase_reaction_ms() -> f64 {
        INCREASE_MAX_REACTION_TIME_MS
    }

    const fn default_decrease_accuracy() -> f64 {
        DECREASE_MAX_ACCURACY
    }

    const fn default_decrease_reaction_ms() -> f64 {
        DECREASE_MIN_REACTION_TIME_MS
    }

    const fn default_decrease_std_dev_ms() -> f64 {
        DECREASE_MIN_REACTION_STD_DEV_MS
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("thresholds.increase_accuracy", self.increase_accuracy),
            ("thresholds.decrease_accuracy", self.decrease_accuracy),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 1.0,
                    value,
                });
            }
        }
        if self.decrease_accuracy > self.increase_accuracy {
            return Err(ConfigError::AccuracyBand {
                decrease: self.decrease_accuracy,
                increase: self.increase_accuracy,
            });
        }
        for (field, value) in [
            ("thresholds.increase_reaction_ms", self.increase_reaction_ms),
            ("thresholds.decrease_reaction_ms", self.decrease_reaction_ms),
            ("thresholds.decrease_std_dev_ms", self.decrease_std_dev_ms),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: f64::MAX,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            increase_accuracy: INCREASE_MIN_ACCURACY,
            increase_reaction_ms: INCREASE_MAX_REACTION_TIME_MS,
            decrease_accuracy: DECREASE_MAX_ACCURACY,
            decrease_reaction_ms: DECREASE_MIN_REACTION_TIME_MS,
            decrease_std_dev_ms: DECREASE_MIN_REACTION_STD_DEV_MS,
        }
    }
}

/// Tuning for the adaptive difficulty controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// Attempts per statistics window; also the adjustment cadence.
    #[serde(default = "AdaptiveConfig::default_window_size")]
    pub window_size: usize,
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Factors left out of a JSON document keep their reference increase values.
    #[serde(
        default = "ParamSteps::increase",
        deserialize_with = "ParamSteps::deserialize_increase"
    )]
    pub increase_step: ParamSteps,
    #[serde(
        default = "ParamSteps::decrease",
        deserialize_with = "ParamSteps::deserialize_decrease"
    )]
    pub decrease_step: ParamSteps,
    #[serde(default)]
    pub bounds: ParamBounds,
    #[serde(default)]
    pub defaults: ParameterSet,
}

impl AdaptiveConfig {
    const fn default_window_size() -> usize {
        DEFAULT_WINDOW_SIZE
    }

    /// Check every invariant the controller relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::TooSmall {
                field: "adaptive.window_size",
                min: 1,
                value: self.window_size,
            });
        }
        if self.window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::TooLarge {
                field: "adaptive.window_size",
                max: MAX_WINDOW_SIZE,
                value: self.window_size,
            });
        }
        self.thresholds.validate()?;
        for (prefix, step) in [
            ("increase_step", &self.increase_step),
            ("decrease_step", &self.decrease_step),
        ] {
            for (param, value) in step.factors() {
                if !(value.is_finite() && value > 0.0) {
                    return Err(ConfigError::InvalidStep {
                        step: prefix,
                        param,
                        value,
                    });
                }
            }
        }
        for (field, range) in self.bounds.named() {
            if !range.is_ordered() {
                return Err(ConfigError::BoundsInverted {
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        let defaults = [
            self.defaults.speed,
            self.defaults.challenge_frequency,
            self.defaults.obstacle_speed,
            self.defaults.gravity,
            self.defaults.jump_velocity,
        ];
        for ((field, range), value) in self.bounds.named().into_iter().zip(defaults) {
            if !range.contains(value) {
                return Err(ConfigError::DefaultOutOfBounds {
                    field,
                    min: range.min,
                    max: range.max,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            thresholds: Thresholds::default(),
            increase_step: ParamSteps::increase(),
            decrease_step: ParamSteps::decrease(),
            bounds: ParamBounds::default(),
            defaults: ParameterSet::default(),
        }
    }
}

/// Tuning for the error cascade detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Errors among the inspected attempts that count as a cascade.
    #[serde(default = "CascadeConfig::default_threshold")]
    pub threshold: usize,
    #[serde(default = "CascadeConfig::default_inspect_window")]
    pub inspect_window: usize,
    #[serde(default = "CascadeConfig::default_buffer_size")]
    pub buffer_size: usize,
}

impl CascadeConfig {
    const fn default_threshold() -> usize {
        CASCADE_THRESHOLD
    }

    const fn default_inspect_window() -> usize {
        CASCADE_INSPECT_WINDOW
    }

    const fn default_buffer_size() -> usize {
        CASCADE_BUFFER_SIZE
    }

    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the threshold or windows are inconsistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::TooSmall {
                field: "cascade.threshold",
                min: 1,
                value: self.threshold,
            });
        }
        if self.buffer_size > MAX_CASCADE_BUFFER_SIZE {
            return Err(ConfigError::TooLarge {
                field: "cascade.buffer_size",
                max: MAX_CASCADE_BUFFER_SIZE,
                value: self.buffer_size,
            });
        }
        if self.threshold > self.inspect_window {
            return Err(ConfigError::CascadeThreshold {
                threshold: self.threshold,
                window: self.inspect_window,
            });
        }
        if self.inspect_window > self.buffer_size {
            return Err(ConfigError::CascadeWindow {
                window: self.inspect_window,
                buffer: self.buffer_size,
            });
        }
        Ok(())
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            threshold: CASCADE_THRESHOLD,
            inspect_window: CASCADE_INSPECT_WINDOW,
            buffer_size: CASCADE_BUFFER_SIZE,
        }
    }
}

/// Full engine configuration for one training session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
    #[serde(default)]
    pub cascade: CascadeConfig,
    #[serde(default)]
    pub locale: Locale,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the first
    /// invariant violation found by [`EngineConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first [`ConfigError`] from the adaptive or cascade section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.adaptive.validate()?;
        self.cascade.validate()
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamRange;

    #[test]
    fn defaults_validate() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_overrides_named_fields_only() {
        let config = EngineConfig::from_json(
            r#"{"adaptive":{"window_size":5,"thresholds":{"increase_accuracy":0.9}},"locale":"pt"}"#,
        )
        .expect("valid config");
        assert_eq!(config.adaptive.window_size, 5);
        assert!((config.adaptive.thresholds.increase_accuracy - 0.9).abs() < f64::EPSILON);
        assert!((config.adaptive.thresholds.decrease_accuracy - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.adaptive.increase_step, ParamSteps::increase());
        assert_eq!(config.cascade, CascadeConfig::default());
        assert_eq!(config.locale, Locale::Pt);
    }

    #[test]
    fn rejects_zero_window() {
        let err = EngineConfig::from_json(r#"{"adaptive":{"window_size":0}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooSmall {
                field: "adaptive.window_size",
                ..
            }
        ));
    }

    #[test]
    fn partial_step_keeps_reference_factors() {
        let config =
            EngineConfig::from_json(r#"{"adaptive":{"increase_step":{"speed":1.5}}}"#).unwrap();
        let step = config.adaptive.increase_step;
        assert!((step.speed - 1.5).abs() < f64::EPSILON);
        assert!((step.challenge_frequency - 1.2).abs() < f64::EPSILON);
        assert!((step.obstacle_speed - 1.05).abs() < f64::EPSILON);
        assert!((step.gravity - 1.0).abs() < f64::EPSILON);

        let config =
            EngineConfig::from_json(r#"{"adaptive":{"decrease_step":{"gravity":0.9}}}"#).unwrap();
        let step = config.adaptive.decrease_step;
        assert!((step.gravity - 0.9).abs() < f64::EPSILON);
        assert!((step.speed - 0.9).abs() < f64::EPSILON);
        assert!((step.challenge_frequency - 0.8).abs() < f64::EPSILON);
        assert!((step.obstacle_speed - 0.95).abs() < f64::EPSILON);
        assert_eq!(config.adaptive.increase_step, ParamSteps::increase());
    }

    #[test]
    fn rejects_oversized_window_and_buffer() {
        let err =
            EngineConfig::from_json(r#"{"adaptive":{"window_size":18446744073709551615}}"#)
                .unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooLarge {
                field: "adaptive.window_size",
                max: MAX_WINDOW_SIZE,
                value: usize::MAX,
            }
        );
        let err = EngineConfig::from_json(r#"{"cascade":{"buffer_size":1000000000}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooLarge {
                field: "cascade.buffer_size",
                ..
            }
        ));
        let largest = format!(r#"{{"adaptive":{{"window_size":{MAX_WINDOW_SIZE}}}}}"#);
        assert!(EngineConfig::from_json(&largest).is_ok());
    }

    #[test]
    fn rejects_inverted_bounds_and_stray_defaults() {
        let mut config = AdaptiveConfig::default();
        config.bounds.speed = ParamRange::new(10.0, 2.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoundsInverted {
                field: "bounds.speed",
                ..
            })
        ));

        let mut config = AdaptiveConfig::default();
        config.defaults.gravity = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultOutOfBounds {
                field: "bounds.gravity",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_positive_steps() {
        let mut config = AdaptiveConfig::default();
        config.decrease_step.gravity = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidStep {
                step: "decrease_step",
                param: "gravity",
                value: 0.0,
            })
        );
    }

    #[test]
    fn rejects_inverted_accuracy_band() {
        let mut config = AdaptiveConfig::default();
        config.thresholds.decrease_accuracy = 0.9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AccuracyBand { .. })
        ));
    }

    #[test]
    fn rejects_inconsistent_cascade_windows() {
        let config = CascadeConfig {
            threshold: 6,
            ..CascadeConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::CascadeThreshold {
                threshold: 6,
                window: 5
            })
        );
        let config = CascadeConfig {
            inspect_window: 12,
            ..CascadeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CascadeWindow { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
