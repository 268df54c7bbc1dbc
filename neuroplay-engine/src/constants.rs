//! Centralized tuning constants for the NeuroPlay adaptive engine.
//!
//! These values define the reference controller behaviour. Runtime overrides
//! go through [`crate::config`], which falls back to the values below for any
//! field a configuration document leaves out.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_ADAPTIVE: &str = "neuroplay::adaptive";
pub(crate) const LOG_TARGET_CASCADE: &str = "neuroplay::cascade";
pub(crate) const LOG_TARGET_SESSION: &str = "neuroplay::session";

// Window and history -------------------------------------------------------
pub(crate) const DEFAULT_WINDOW_SIZE: usize = 10;
pub(crate) const HISTORY_WINDOW_MULTIPLIER: usize = 2;
pub(crate) const MAX_WINDOW_SIZE: usize = 10_000;
/// Upper bound on buffer slots reserved up front; larger buffers grow on demand.
pub(crate) const PREALLOCATED_SLOTS: usize = 256;

// Neutral statistics for windows without data ------------------------------
pub(crate) const EMPTY_WINDOW_ACCURACY: f64 = 1.0;
pub(crate) const NEUTRAL_REACTION_TIME_MS: f64 = 1_000.0;

// Decision thresholds (zone of proximal development: 60-85% accuracy) -----
pub(crate) const INCREASE_MIN_ACCURACY: f64 = 0.85;
pub(crate) const INCREASE_MAX_REACTION_TIME_MS: f64 = 800.0;
pub(crate) const DECREASE_MAX_ACCURACY: f64 = 0.60;
pub(crate) const DECREASE_MIN_REACTION_TIME_MS: f64 = 2_000.0;
pub(crate) const DECREASE_MIN_REACTION_STD_DEV_MS: f64 = 500.0;

// Step factors ---------------------------------------------------------------
pub(crate) const INCREASE_SPEED_FACTOR: f64 = 1.10;
pub(crate) const INCREASE_CHALLENGE_FACTOR: f64 = 1.20;
pub(crate) const INCREASE_OBSTACLE_FACTOR: f64 = 1.05;
pub(crate) const DECREASE_SPEED_FACTOR: f64 = 0.90;
pub(crate) const DECREASE_CHALLENGE_FACTOR: f64 = 0.80;
pub(crate) const DECREASE_OBSTACLE_FACTOR: f64 = 0.95;
pub(crate) const DECREASE_GRAVITY_FACTOR: f64 = 0.95;
pub(crate) const NEUTRAL_FACTOR: f64 = 1.0;

// Parameter defaults ---------------------------------------------------------
pub(crate) const DEFAULT_SPEED: f64 = 5.0;
pub(crate) const DEFAULT_CHALLENGE_FREQUENCY: f64 = 0.0008;
pub(crate) const DEFAULT_OBSTACLE_SPEED: f64 = 5.0;
pub(crate) const DEFAULT_GRAVITY: f64 = 0.8;
pub(crate) const DEFAULT_JUMP_VELOCITY: f64 = -12.0;

// Parameter bounds -----------------------------------------------------------
pub(crate) const SPEED_MIN: f64 = 3.0;
pub(crate) const SPEED_MAX: f64 = 15.0;
pub(crate) const CHALLENGE_FREQUENCY_MIN: f64 = 0.0003;
pub(crate) const CHALLENGE_FREQUENCY_MAX: f64 = 0.003;
pub(crate) const OBSTACLE_SPEED_MIN: f64 = 3.0;
pub(crate) const OBSTACLE_SPEED_MAX: f64 = 12.0;
pub(crate) const GRAVITY_MIN: f64 = 0.6;
pub(crate) const GRAVITY_MAX: f64 = 1.0;
pub(crate) const JUMP_VELOCITY_MIN: f64 = -20.0;
pub(crate) const JUMP_VELOCITY_MAX: f64 = -8.0;

// Error cascade detection ----------------------------------------------------
pub(crate) const CASCADE_THRESHOLD: usize = 4;
pub(crate) const CASCADE_INSPECT_WINDOW: usize = 5;
pub(crate) const CASCADE_BUFFER_SIZE: usize = 10;
pub(crate) const MAX_CASCADE_BUFFER_SIZE: usize = 10_000;
pub(crate) const CASCADE_CRITICAL_ERRORS: usize = 5;
pub(crate) const CASCADE_HIGH_ERRORS: usize = 4;
pub(crate) const TREND_MIN_SAMPLES: usize = 6;
pub(crate) const TREND_SEGMENT: usize = 3;
pub(crate) const TREND_MARGIN: f64 = 0.2;
pub(crate) const CASCADE_DEFAULT_RECENT: usize = 5;
