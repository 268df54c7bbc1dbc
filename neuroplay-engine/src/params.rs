//! Tunable gameplay parameters and their clamp-then-multiply stepping.
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{
    CHALLENGE_FREQUENCY_MAX, CHALLENGE_FREQUENCY_MIN, DECREASE_CHALLENGE_FACTOR,
    DECREASE_GRAVITY_FACTOR, DECREASE_OBSTACLE_FACTOR, DECREASE_SPEED_FACTOR,
    DEFAULT_CHALLENGE_FREQUENCY, DEFAULT_GRAVITY, DEFAULT_JUMP_VELOCITY, DEFAULT_OBSTACLE_SPEED,
    DEFAULT_SPEED, GRAVITY_MAX, GRAVITY_MIN, INCREASE_CHALLENGE_FACTOR, INCREASE_OBSTACLE_FACTOR,
    INCREASE_SPEED_FACTOR, JUMP_VELOCITY_MAX, JUMP_VELOCITY_MIN, NEUTRAL_FACTOR,
    OBSTACLE_SPEED_MAX, OBSTACLE_SPEED_MIN, SPEED_MAX, SPEED_MIN,
};
use crate::numbers::scale_clamped;

/// The vector of gameplay tunables the controller owns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(default = "ParameterSet::default_speed")]
    pub speed: f64,
    /// Probability per tick that a cognitive challenge spawns.
    #[serde(default = "ParameterSet::default_challenge_frequency")]
    pub challenge_frequency: f64,
    #[serde(default = "ParameterSet::default_obstacle_speed")]
    pub obstacle_speed: f64,
    #[serde(default = "ParameterSet::default_gravity")]
    pub gravity: f64,
    #[serde(default = "ParameterSet::default_jump_velocity")]
    pub jump_velocity: f64,
}

impl ParameterSet {
    const fn default_speed() -> f64 {
        DEFAULT_SPEED
    }

    const fn default_challenge_frequency() -> f64 {
        DEFAULT_CHALLENGE_FREQUENCY
    }

    const fn default_obstacle_speed() -> f64 {
        DEFAULT_OBSTACLE_SPEED
    }

    const fn default_gravity() -> f64 {
        DEFAULT_GRAVITY
    }

    const fn default_jump_velocity() -> f64 {
        DEFAULT_JUMP_VELOCITY
    }

    /// Apply `steps` to every tunable, clamping each product into `bounds`.
    #[must_use]
    pub fn scaled(self, steps: &ParamSteps, bounds: &ParamBounds) -> Self {
        Self {
            speed: bounds.speed.scale(self.speed, steps.speed),
            challenge_frequency: bounds
                .challenge_frequency
                .scale(self.challenge_frequency, steps.challenge_frequency),
            obstacle_speed: bounds
                .obstacle_speed
                .scale(self.obstacle_speed, steps.obstacle_speed),
            gravity: bounds.gravity.scale(self.gravity, steps.gravity),
            jump_velocity: bounds
                .jump_velocity
                .scale(self.jump_velocity, steps.jump_velocity),
        }
    }

    /// Whether every tunable sits inside `bounds`.
    #[must_use]
    pub fn within(&self, bounds: &ParamBounds) -> bool {
        bounds.speed.contains(self.speed)
            && bounds.challenge_frequency.contains(self.challenge_frequency)
            && bounds.obstacle_speed.contains(self.obstacle_speed)
            && bounds.gravity.contains(self.gravity)
            && bounds.jump_velocity.contains(self.jump_velocity)
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            challenge_frequency: DEFAULT_CHALLENGE_FREQUENCY,
            obstacle_speed: DEFAULT_OBSTACLE_SPEED,
            gravity: DEFAULT_GRAVITY,
            jump_velocity: DEFAULT_JUMP_VELOCITY,
        }
    }
}

/// Closed interval a tunable is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn scale(self, value: f64, factor: f64) -> f64 {
        scale_clamped(value, factor, self.min, self.max)
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    #[must_use]
    pub fn is_ordered(self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Hard limits for every tunable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    #[serde(default = "ParamBounds::default_speed")]
    pub speed: ParamRange,
    #[serde(default = "ParamBounds::default_challenge_frequency")]
    pub challenge_frequency: ParamRange,
    #[serde(default = "ParamBounds::default_obstacle_speed")]
    pub obstacle_speed: ParamRange,
    #[serde(default = "ParamBounds::default_gravity")]
    pub gravity: ParamRange,
    #[serde(default = "ParamBounds::default_jump_velocity")]
    pub jump_velocity: ParamRange,
}

impl ParamBounds {
    const fn default_speed() -> ParamRange {
        ParamRange::new(SPEED_MIN, SPEED_MAX)
    }

    const fn default_challenge_frequency() -> ParamRange {
        ParamRange::new(CHALLENGE_FREQUENCY_MIN, CHALLENGE_FREQUENCY_MAX)
    }

    const fn default_obstacle_speed() -> ParamRange {
        ParamRange::new(OBSTACLE_SPEED_MIN, OBSTACLE_SPEED_MAX)
    }

    const fn default_gravity() -> ParamRange {
        ParamRange::new(GRAVITY_MIN, GRAVITY_MAX)
    }

    const fn default_jump_velocity() -> ParamRange {
        ParamRange::new(JUMP_VELOCITY_MIN, JUMP_VELOCITY_MAX)
    }

    /// Named ranges, for validation and reporting.
    #[must_use]
    pub const fn named(&self) -> [(&'static str, ParamRange); 5] {
        [
            ("bounds.speed", self.speed),
            ("bounds.challenge_frequency", self.challenge_frequency),
            ("bounds.obstacle_speed", self.obstacle_speed),
            ("bounds.gravity", self.gravity),
            ("bounds.jump_velocity", self.jump_velocity),
        ]
    }
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            speed: Self::default_speed(),
            challenge_frequency: Self::default_challenge_frequency(),
            obstacle_speed: Self::default_obstacle_speed(),
            gravity: Self::default_gravity(),
            jump_velocity: Self::default_jump_velocity(),
        }
    }
}

/// Multiplicative factors applied to each tunable by one adjustment pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamSteps {
    #[serde(default = "ParamSteps::neutral_factor")]
    pub speed: f64,
    #[serde(default = "ParamSteps::neutral_factor")]
    pub challenge_frequency: f64,
    #[serde(default = "ParamSteps::neutral_factor")]
    pub obstacle_speed: f64,
    #[serde(default = "ParamSteps::neutral_factor")]
    pub gravity: f64,
    #[serde(default = "ParamSteps::neutral_factor")]
    pub jump_velocity: f64,
}

impl ParamSteps {
    const fn neutral_factor() -> f64 {
        NEUTRAL_FACTOR
    }

    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            speed: NEUTRAL_FACTOR,
            challenge_frequency: NEUTRAL_FACTOR,
            obstacle_speed: NEUTRAL_FACTOR,
            gravity: NEUTRAL_FACTOR,
            jump_velocity: NEUTRAL_FACTOR,
        }
    }

    /// Reference step used when the player is above the target band.
    #[must_use]
    pub const fn increase() -> Self {
        Self {
            speed: INCREASE_SPEED_FACTOR,
            challenge_frequency: INCREASE_CHALLENGE_FACTOR,
            obstacle_speed: INCREASE_OBSTACLE_FACTOR,
            gravity: NEUTRAL_FACTOR,
            jump_velocity: NEUTRAL_FACTOR,
        }
    }

    /// Reference step used when the player is below the target band.
    #[must_use]
    pub const fn decrease() -> Self {
        Self {
            speed: DECREASE_SPEED_FACTOR,
            challenge_frequency: DECREASE_CHALLENGE_FACTOR,
            obstacle_speed: DECREASE_OBSTACLE_FACTOR,
            gravity: DECREASE_GRAVITY_FACTOR,
            jump_velocity: NEUTRAL_FACTOR,
        }
    }

    pub(crate) fn deserialize_increase<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        StepOverrides::deserialize(deserializer).map(|o| o.over(Self::increase()))
    }

    pub(crate) fn deserialize_decrease<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        StepOverrides::deserialize(deserializer).map(|o| o.over(Self::decrease()))
    }

    #[must_use]
    pub const fn factors(&self) -> [(&'static str, f64); 5] {
        [
            ("speed", self.speed),
            ("challenge_frequency", self.challenge_frequency),
            ("obstacle_speed", self.obstacle_speed),
            ("gravity", self.gravity),
            ("jump_velocity", self.jump_velocity),
        ]
    }
}

/// Factors named in a configuration document; the rest come from a base step.
#[derive(Deserialize)]
struct StepOverrides {
    speed: Option<f64>,
    challenge_frequency: Option<f64>,
    obstacle_speed: Option<f64>,
    gravity: Option<f64>,
    jump_velocity: Option<f64>,
}

impl StepOverrides {
    fn over(self, base: ParamSteps) -> ParamSteps {
        ParamSteps {
            speed: self.speed.unwrap_or(base.speed),
            challenge_frequency: self.challenge_frequency.unwrap_or(base.challenge_frequency),
            obstacle_speed: self.obstacle_speed.unwrap_or(base.obstacle_speed),
            gravity: self.gravity.unwrap_or(base.gravity),
            jump_velocity: self.jump_velocity.unwrap_or(base.jump_velocity),
        }
    }
}
