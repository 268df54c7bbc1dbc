//! Player attempt records
use serde::{Deserialize, Serialize};

/// A scored player response as reported by a game.
///
/// `reaction_time_ms` uses a non-positive value to mean "no timing data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptInput {
    pub correct: bool,
    #[serde(default)]
    pub reaction_time_ms: f64,
    #[serde(default)]
    pub kind: String,
}

impl AttemptInput {
    #[must_use]
    pub fn new(correct: bool, reaction_time_ms: f64, kind: impl Into<String>) -> Self {
        Self {
            correct,
            reaction_time_ms,
            kind: kind.into(),
        }
    }

    /// Response without reaction-time measurement.
    #[must_use]
    pub fn untimed(correct: bool, kind: impl Into<String>) -> Self {
        Self::new(correct, 0.0, kind)
    }
}

/// An attempt as retained by the aggregator, stamped at insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub correct: bool,
    pub reaction_time_ms: f64,
    pub timestamp_ms: i64,
    pub kind: String,
}

impl Attempt {
    #[must_use]
    pub fn stamped(input: AttemptInput, timestamp_ms: i64) -> Self {
        Self {
            correct: input.correct,
            reaction_time_ms: input.reaction_time_ms,
            timestamp_ms,
            kind: input.kind,
        }
    }

    /// Whether this attempt contributes to reaction-time statistics.
    ///
    /// Non-positive and non-finite values are treated as missing timing.
    #[must_use]
    pub fn has_timing(&self) -> bool {
        self.reaction_time_ms.is_finite() && self.reaction_time_ms > 0.0
    }
}
