//! Difficulty decision rule for one adjustment pass.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregator::PerformanceStats;
use crate::config::{AdaptiveConfig, Thresholds};
use crate::params::ParamSteps;

/// Outcome of an adjustment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Increase,
    Decrease,
    Maintain,
}

impl Decision {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Maintain => "maintain",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Player is clearly above the target band.
#[must_use]
pub fn wants_increase(stats: &PerformanceStats, thresholds: &Thresholds) -> bool {
    stats.accuracy > thresholds.increase_accuracy
        && stats.avg_reaction_time_ms < thresholds.increase_reaction_ms
}

/// Player is below the target band or responding erratically.
#[must_use]
pub fn wants_decrease(stats: &PerformanceStats, thresholds: &Thresholds) -> bool {
    stats.accuracy < thresholds.decrease_accuracy
        || stats.avg_reaction_time_ms > thresholds.decrease_reaction_ms
        || stats.reaction_time_std_dev > thresholds.decrease_std_dev_ms
}

/// Evaluate `increase → decrease → maintain` in that order.
///
/// The ordering matters once thresholds are retuned so that both conditions
/// can hold at the same time: increase wins.
#[must_use]
pub fn decide(stats: &PerformanceStats, thresholds: &Thresholds) -> Decision {
    if wants_increase(stats, thresholds) {
        Decision::Increase
    } else if wants_decrease(stats, thresholds) {
        Decision::Decrease
    } else {
        Decision::Maintain
    }
}

/// Step factors for `decision`, or `None` when parameters hold.
#[must_use]
pub const fn step_for(decision: Decision, config: &AdaptiveConfig) -> Option<ParamSteps> {
    match decision {
        Decision::Increase => Some(config.increase_step),
        Decision::Decrease => Some(config.decrease_step),
        Decision::Maintain => None,
    }
}
