use anyhow::{Result, ensure};

use neuroplay_engine::{Decision, EngineConfig, ParamRange, ParameterSet};

use crate::logic::{PlayerProfile, SimulationPlan, SimulationSummary};

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

struct CatalogEntry {
    key: &'static str,
    description: &'static str,
    build: fn() -> TestScenario,
}

const CATALOG: [CatalogEntry; 8] = [
    CatalogEntry {
        key: "smoke",
        description: "Short expert run; cadence and bounds sanity",
        build: smoke,
    },
    CatalogEntry {
        key: "expert-ramp",
        description: "Expert player drives every tunable to its ceiling",
        build: expert_ramp,
    },
    CatalogEntry {
        key: "novice-floor",
        description: "Struggling player drives every tunable to its floor",
        build: novice_floor,
    },
    CatalogEntry {
        key: "learner-zone",
        description: "Closed-loop learner settles between floor and ceiling",
        build: learner_zone,
    },
    CatalogEntry {
        key: "erratic-timing",
        description: "Accurate but inconsistent timing still eases difficulty",
        build: erratic_timing,
    },
    CatalogEntry {
        key: "untimed-maintain",
        description: "No timing data and mid-band accuracy never move parameters",
        build: untimed_maintain,
    },
    CatalogEntry {
        key: "reset-midway",
        description: "Reset mid-session restores defaults and restarts the cadence",
        build: reset_midway,
    },
    CatalogEntry {
        key: "cadence",
        description: "Adjustments land exactly on multiples of a custom window",
        build: cadence,
    },
];

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let name = name.to_lowercase();
    CATALOG
        .iter()
        .find(|entry| entry.key == name)
        .map(|entry| (entry.build)())
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|entry| (entry.key, entry.description))
        .collect()
}

#[must_use]
pub fn all_scenario_keys() -> Vec<&'static str> {
    CATALOG.iter().map(|entry| entry.key).collect()
}

fn smoke() -> TestScenario {
    TestScenario::simulation(
        "Smoke",
        SimulationPlan::new(PlayerProfile::Expert)
            .with_attempts(30)
            .with_expectation(cadence_expectation)
            .with_expectation(bounds_expectation),
    )
}

fn expert_ramp() -> TestScenario {
    TestScenario::simulation(
        "Expert Ramp",
        SimulationPlan::new(PlayerProfile::Expert)
            .with_attempts(200)
            .with_expectation(only_decision(Decision::Increase))
            .with_expectation(ceiling_expectation)
            .with_expectation(no_cascade_expectation),
    )
}

fn novice_floor() -> TestScenario {
    TestScenario::simulation(
        "Novice Floor",
        SimulationPlan::new(PlayerProfile::Novice)
            .with_attempts(200)
            .with_expectation(only_decision(Decision::Decrease))
            .with_expectation(floor_expectation),
    )
}

fn learner_zone() -> TestScenario {
    TestScenario::simulation(
        "Learner Zone",
        SimulationPlan::new(PlayerProfile::Learner)
            .with_attempts(300)
            .with_expectation(bounds_expectation)
            .with_expectation(learner_zone_expectation),
    )
}

fn erratic_timing() -> TestScenario {
    TestScenario::simulation(
        "Erratic Timing",
        SimulationPlan::new(PlayerProfile::Erratic)
            .with_attempts(100)
            .with_expectation(only_decision(Decision::Decrease))
            .with_expectation(no_cascade_expectation),
    )
}

fn untimed_maintain() -> TestScenario {
    TestScenario::simulation(
        "Untimed Maintain",
        SimulationPlan::new(PlayerProfile::Untimed)
            .with_attempts(100)
            .with_expectation(only_decision(Decision::Maintain))
            .with_expectation(untimed_expectation),
    )
}

fn reset_midway() -> TestScenario {
    TestScenario::simulation(
        "Reset Midway",
        SimulationPlan::new(PlayerProfile::Expert)
            .with_attempts(100)
            .with_reset_after(55)
            .with_expectation(reset_expectation)
            .with_expectation(cadence_expectation),
    )
}

fn cadence() -> TestScenario {
    TestScenario::simulation(
        "Cadence",
        SimulationPlan::new(PlayerProfile::Learner)
            .with_attempts(100)
            .with_configure(odd_window)
            .with_expectation(cadence_expectation),
    )
}

fn odd_window(config: &mut EngineConfig) {
    config.adaptive.window_size = 7;
}

fn attempts_since_reset(summary: &SimulationSummary) -> usize {
    summary.attempts - summary.reset_after.unwrap_or(0)
}

fn cadence_expectation(summary: &SimulationSummary) -> Result<()> {
    let window = summary.window_size;
    let expected: Vec<usize> = (1..=attempts_since_reset(summary) / window)
        .map(|k| k * window)
        .collect();
    let actual: Vec<usize> = summary.adjustments.iter().map(|t| t.call).collect();
    ensure!(
        actual == expected,
        "adjustments at calls {actual:?}, expected {expected:?}"
    );
    ensure!(
        summary.controller.adjustment_count == u64::try_from(expected.len())?,
        "controller counted {} adjustments, trace has {}",
        summary.controller.adjustment_count,
        expected.len()
    );
    Ok(())
}

fn bounds_expectation(summary: &SimulationSummary) -> Result<()> {
    for trace in &summary.adjustments {
        ensure!(
            trace.params.within(&summary.bounds),
            "parameters left their bounds at call {}: {:?}",
            trace.call,
            trace.params
        );
    }
    Ok(())
}

fn only_decision(
    decision: Decision,
) -> impl Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static {
    move |summary: &SimulationSummary| {
        if let Some(other) = summary.adjustments.iter().find(|t| t.decision != decision) {
            anyhow::bail!(
                "expected only {decision} decisions, saw {} at call {}",
                other.decision,
                other.call
            );
        }
        Ok(())
    }
}

fn at_limit(value: f64, limit: f64, label: &str) -> Result<()> {
    ensure!(
        (value - limit).abs() < 1e-9,
        "{label} is {value}, expected {limit}"
    );
    Ok(())
}

fn ceiling_expectation(summary: &SimulationSummary) -> Result<()> {
    let params = summary.final_params();
    for pair in summary.adjustments.windows(2) {
        ensure!(
            pair[1].params.speed >= pair[0].params.speed,
            "speed fell between calls {} and {}",
            pair[0].call,
            pair[1].call
        );
    }
    ensure!(
        params.gravity == summary.defaults.gravity
            && params.jump_velocity == summary.defaults.jump_velocity,
        "increase passes must not touch gravity or jump velocity"
    );
    // Slowest default ramp (obstacle speed) saturates after 18 passes.
    if summary.adjustments.len() >= 18 {
        let b = &summary.bounds;
        at_limit(params.speed, b.speed.max, "speed")?;
        at_limit(
            params.challenge_frequency,
            b.challenge_frequency.max,
            "challenge_frequency",
        )?;
        at_limit(params.obstacle_speed, b.obstacle_speed.max, "obstacle_speed")?;
    }
    Ok(())
}

fn floor_expectation(summary: &SimulationSummary) -> Result<()> {
    let params = summary.final_params();
    // Slowest default descent (obstacle speed) bottoms out after 10 passes.
    if summary.adjustments.len() >= 10 {
        let b = &summary.bounds;
        at_limit(params.speed, b.speed.min, "speed")?;
        at_limit(
            params.challenge_frequency,
            b.challenge_frequency.min,
            "challenge_frequency",
        )?;
        at_limit(params.obstacle_speed, b.obstacle_speed.min, "obstacle_speed")?;
        at_limit(params.gravity, b.gravity.min, "gravity")?;
    }
    Ok(())
}

fn strictly_inside(value: f64, range: ParamRange) -> bool {
    value > range.min && value < range.max
}

fn learner_zone_expectation(summary: &SimulationSummary) -> Result<()> {
    let params = summary.final_params();
    ensure!(
        strictly_inside(params.speed, summary.bounds.speed),
        "learner speed pinned at a limit: {:.2}",
        params.speed
    );
    if summary.adjustments.len() >= 10 {
        ensure!(
            summary.count(Decision::Increase) > 0,
            "learner never earned an increase"
        );
        let accuracy = summary.session.accuracy;
        ensure!(
            (0.55..=0.97).contains(&accuracy),
            "learner accuracy {accuracy:.2} outside the training band"
        );
    }
    Ok(())
}

fn no_cascade_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.session.cascades_detected == 0,
        "{} cascades detected for an accurate player",
        summary.session.cascades_detected
    );
    Ok(())
}

fn untimed_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.final_params() == summary.defaults,
        "parameters drifted without timing data: {:?}",
        summary.final_params()
    );
    ensure!(
        (summary.controller.avg_reaction_time_ms - 1_000.0).abs() < 1e-9,
        "untimed window should report the neutral reaction time"
    );
    Ok(())
}

fn reset_expectation(summary: &SimulationSummary) -> Result<()> {
    let since_reset = attempts_since_reset(summary);
    ensure!(
        summary.controller.total_attempts == u64::try_from(since_reset)?,
        "controller counted {} attempts, {since_reset} happened after reset",
        summary.controller.total_attempts
    );
    ensure!(
        summary.session.total_attempts == u64::try_from(since_reset)?,
        "session tallies survived the reset"
    );
    let passes = since_reset / summary.window_size;
    let expected = replay_increases(summary, passes);
    ensure!(
        (summary.final_params().speed - expected.speed).abs() < 1e-9,
        "speed {:.4} after reset, expected {:.4}",
        summary.final_params().speed,
        expected.speed
    );
    Ok(())
}

fn replay_increases(summary: &SimulationSummary, passes: usize) -> ParameterSet {
    (0..passes).fold(summary.defaults, |params, _| {
        params.scaled(&summary.increase_step, &summary.bounds)
    })
}
