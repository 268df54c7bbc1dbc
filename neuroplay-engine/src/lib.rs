//! NeuroPlay Adaptive Difficulty Engine
//!
//! Platform-agnostic core that watches a player's recent accuracy and reaction
//! times and nudges game parameters so the player stays in a target
//! performance band. This crate has no UI, storage or network dependencies;
//! games feed it attempts and read back parameters.

pub mod advisory;
pub mod aggregator;
pub mod attempt;
pub mod cascade;
pub mod clock;
pub mod config;
pub(crate) mod constants;
pub mod controller;
pub mod numbers;
pub mod params;
pub mod policy;
pub mod session;

// Re-export commonly used types
pub use advisory::{Advisory, Locale};
pub use aggregator::{PerformanceAggregator, PerformanceStats};
pub use attempt::{Attempt, AttemptInput};
pub use cascade::{
    CascadeAction, CascadeAlert, CascadeOutcome, CascadeStats, CascadeStatus,
    ErrorCascadeDetector, Severity, Trend,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AdaptiveConfig, CascadeConfig, ConfigError, EngineConfig, Thresholds};
pub use controller::{
    AdaptiveController, AdjustmentRecord, AdjustmentResult, ControllerPhase, ControllerStats,
};
pub use params::{ParamBounds, ParamRange, ParamSteps, ParameterSet};
pub use policy::Decision;
pub use session::{KindTally, SessionEvent, SessionSummary, TrainingSession};
