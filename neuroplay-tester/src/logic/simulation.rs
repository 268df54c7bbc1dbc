use anyhow::{Context, Result};
use std::sync::Arc;

use neuroplay_engine::{
    ControllerStats, Decision, EngineConfig, ManualClock, ParamBounds, ParamSteps, ParameterSet,
    SessionSummary, TrainingSession,
};

use crate::logic::player::PlayerProfile;

/// Attempts per run when neither the plan nor the CLI says otherwise.
pub const DEFAULT_ATTEMPTS: usize = 200;

/// Simulated wall-clock start for every run.
const SIMULATION_EPOCH_MS: i64 = 1_700_000_000_000;
/// Gap between challenges on top of the player's reaction time.
const INTER_CHALLENGE_GAP_MS: i64 = 1_500;

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn = Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Everything needed to reproduce one simulated session.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub profile: PlayerProfile,
    pub attempts: Option<usize>,
    /// Reset the session after this many attempts.
    pub reset_after: Option<usize>,
    pub configure: Option<fn(&mut EngineConfig)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(profile: PlayerProfile) -> Self {
        Self {
            profile,
            attempts: None,
            reset_after: None,
            configure: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = Some(attempts);
        self
    }

    #[must_use]
    pub fn with_reset_after(mut self, attempts: usize) -> Self {
        self.reset_after = Some(attempts);
        self
    }

    #[must_use]
    pub fn with_configure(mut self, configure: fn(&mut EngineConfig)) -> Self {
        self.configure = Some(configure);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// One adjustment observed during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentTrace {
    /// 1-based call number since the last reset.
    pub call: usize,
    pub decision: Decision,
    pub params: ParameterSet,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub profile: PlayerProfile,
    pub attempts: usize,
    pub window_size: usize,
    pub reset_after: Option<usize>,
    /// Adjustments since the last reset.
    pub adjustments: Vec<AdjustmentTrace>,
    pub session: SessionSummary,
    pub controller: ControllerStats,
    pub bounds: ParamBounds,
    pub defaults: ParameterSet,
    pub increase_step: ParamSteps,
}

impl SimulationSummary {
    #[must_use]
    pub fn count(&self, decision: Decision) -> usize {
        self.adjustments
            .iter()
            .filter(|trace| trace.decision == decision)
            .count()
    }

    #[must_use]
    pub fn final_params(&self) -> ParameterSet {
        self.controller.current_params
    }
}

/// Headless deterministic runner binding a synthetic player to a training session.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    base_config: EngineConfig,
    attempts_override: Option<usize>,
    verbose: bool,
}

impl Simulator {
    #[must_use]
    pub fn new(base_config: EngineConfig, verbose: bool) -> Self {
        Self {
            base_config,
            attempts_override: None,
            verbose,
        }
    }

    #[must_use]
    pub const fn with_attempts_override(mut self, attempts: Option<usize>) -> Self {
        self.attempts_override = attempts;
        self
    }

    /// Configuration a plan runs with after its own tweaks.
    #[must_use]
    pub fn config_for(&self, plan: &SimulationPlan) -> EngineConfig {
        let mut config = self.base_config;
        if let Some(configure) = plan.configure {
            configure(&mut config);
        }
        config
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let config = self.config_for(plan);
        let attempts = self
            .attempts_override
            .or(plan.attempts)
            .unwrap_or(DEFAULT_ATTEMPTS);
        let clock = ManualClock::starting_at(SIMULATION_EPOCH_MS);
        let mut session = TrainingSession::with_clock(config, clock.clone())
            .with_context(|| format!("invalid engine configuration for {}", plan.profile))?;
        let mut player = plan.profile.create_policy(seed);

        if self.verbose {
            println!(
                "🎮 Starting simulation | seed:{seed} profile:{} attempts:{attempts} window:{}",
                player.name(),
                config.adaptive.window_size
            );
        }

        let mut adjustments = Vec::new();
        let mut call = 0;
        for index in 0..attempts {
            if plan.reset_after == Some(index) {
                session.reset();
                adjustments.clear();
                call = 0;
                log::debug!("session reset after {index} attempts");
            }

            let input = player.respond(&session.params(), index);
            clock.advance(elapsed_ms(input.reaction_time_ms));
            call += 1;
            if let Some(result) = session.respond(input).adjustment {
                if self.verbose {
                    println!(
                        "  ↳ call {call}: {} speed {:.2} challenge {:.5}",
                        result.decision, result.params.speed, result.params.challenge_frequency
                    );
                }
                adjustments.push(AdjustmentTrace {
                    call,
                    decision: result.decision,
                    params: result.params,
                });
            }
        }

        Ok(SimulationSummary {
            seed,
            profile: plan.profile,
            attempts,
            window_size: config.adaptive.window_size,
            reset_after: plan.reset_after.filter(|&at| at < attempts),
            adjustments,
            session: session.summary(),
            controller: session.controller().stats(),
            bounds: config.adaptive.bounds,
            defaults: config.adaptive.defaults,
            increase_step: config.adaptive.increase_step,
        })
    }
}

// Synthetic reaction times are a few seconds at most.
#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(reaction_time_ms: f64) -> i64 {
    let reaction = if reaction_time_ms.is_finite() && reaction_time_ms > 0.0 {
        reaction_time_ms.round() as i64
    } else {
        0
    };
    reaction + INTER_CHALLENGE_GAP_MS
}
