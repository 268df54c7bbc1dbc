use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use neuroplay_engine::Decision;

use crate::logic::simulation::{SimulationPlan, SimulationSummary, Simulator};
use crate::scenario::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
    pub runs: Vec<RunRecord>,
}

/// Flattened metrics for one simulated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub scenario: String,
    pub profile: String,
    pub seed: u64,
    pub attempts: usize,
    pub accuracy: f64,
    pub adjustments: usize,
    pub increases: usize,
    pub decreases: usize,
    pub maintains: usize,
    pub cascades: u64,
    pub breaks_suggested: u64,
    pub final_speed: f64,
    pub final_challenge_frequency: f64,
    pub final_obstacle_speed: f64,
    pub final_gravity: f64,
}

impl RunRecord {
    #[must_use]
    pub fn from_summary(scenario: &str, summary: &SimulationSummary) -> Self {
        let params = summary.final_params();
        Self {
            scenario: scenario.to_string(),
            profile: summary.profile.label().to_string(),
            seed: summary.seed,
            attempts: summary.attempts,
            accuracy: summary.session.accuracy,
            adjustments: summary.adjustments.len(),
            increases: summary.count(Decision::Increase),
            decreases: summary.count(Decision::Decrease),
            maintains: summary.count(Decision::Maintain),
            cascades: summary.session.cascades_detected,
            breaks_suggested: summary.session.breaks_suggested,
            final_speed: params.speed,
            final_challenge_frequency: params.challenge_frequency,
            final_obstacle_speed: params.obstacle_speed,
            final_gravity: params.gravity,
        }
    }
}

pub struct LogicTester {
    simulator: Simulator,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(simulator: Simulator, verbose: bool) -> Self {
        Self { simulator, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (profile: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.profile,
                    seed
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let outcome = self.run_simulation_iterations(&scenario.name, &scenario.plan, seed, iterations);

        let average_duration = if outcome.durations.is_empty() {
            Duration::ZERO
        } else {
            outcome.durations.iter().sum::<Duration>()
                / u32::try_from(outcome.durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: outcome.failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: outcome.successes,
            failures: outcome.failures,
            average_duration,
            performance_data: outcome.durations,
            runs: outcome.runs,
        }
    }

    fn run_simulation_iterations(
        &self,
        scenario_name: &str,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> IterationOutcome {
        let mut outcome = IterationOutcome::default();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = match self.simulator.run_plan(plan, iteration_seed) {
                Ok(summary) => summary,
                Err(err) => {
                    outcome
                        .failures
                        .push(format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1));
                    continue;
                }
            };
            outcome
                .runs
                .push(RunRecord::from_summary(scenario_name, &summary));

            if let Some(err) = evaluate_expectations(plan, &summary) {
                let context = summarize_adjustments(&summary);
                outcome.failures.push(format!(
                    "Iteration {} (profile {}, seed {}, attempts {}, accuracy {:.2}): {} | {}",
                    i + 1,
                    summary.profile,
                    summary.seed,
                    summary.attempts,
                    summary.session.accuracy,
                    err,
                    context
                ));

                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                    println!("     ↳ Seed {} | {}", summary.seed, context);
                }
            } else {
                outcome.successes += 1;
                let duration = start_time.elapsed();
                outcome.durations.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) adjustments:{} final speed:{:.2}",
                        i + 1,
                        iterations,
                        summary.adjustments.len(),
                        summary.final_params().speed
                    );
                }
            }
        }

        outcome
    }
}

#[derive(Default)]
struct IterationOutcome {
    successes: usize,
    failures: Vec<String>,
    durations: Vec<Duration>,
    runs: Vec<RunRecord>,
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation.evaluate(summary) {
            return Some(err.to_string());
        }
    }
    None
}

fn summarize_adjustments(summary: &SimulationSummary) -> String {
    if summary.adjustments.is_empty() {
        return "no adjustments recorded".to_string();
    }

    summary
        .adjustments
        .iter()
        .rev()
        .take(3)
        .map(|trace| {
            format!(
                "call {}: {} -> speed {:.2} gravity {:.2}",
                trace.call, trace.decision, trace.params.speed, trace.params.gravity
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let micros: Vec<u128> = durations.iter().map(Duration::as_micros).collect();
        micros.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = Vec::<u128>::deserialize(deserializer)?;
        Ok(micros
            .into_iter()
            .map(|m| Duration::from_micros(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::player::PlayerProfile;

    fn scenario(plan: SimulationPlan) -> TestScenario {
        TestScenario::simulation("Probe", plan)
    }

    fn two_passes(summary: &SimulationSummary) -> anyhow::Result<()> {
        anyhow::ensure!(summary.adjustments.len() == 2, "expected two passes");
        Ok(())
    }

    fn always_fails(_summary: &SimulationSummary) -> anyhow::Result<()> {
        anyhow::bail!("always fails")
    }

    #[test]
    fn passing_expectations_count_as_successes() {
        let plan = SimulationPlan::new(PlayerProfile::Expert)
            .with_attempts(20)
            .with_expectation(two_passes);
        let tester = LogicTester::new(Simulator::default(), false);
        let results = tester.run_scenario(&scenario(plan), &[1, 2], 3);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed && r.successful_iterations == 3));
        assert_eq!(results[0].runs.len(), 3);
        assert_eq!(results[0].runs[0].increases, 2);
    }

    #[test]
    fn failing_expectation_is_reported_with_context() {
        let plan = SimulationPlan::new(PlayerProfile::Novice)
            .with_attempts(10)
            .with_expectation(always_fails);
        let tester = LogicTester::new(Simulator::default(), false);
        let result = &tester.run_scenario(&scenario(plan), &[9], 1)[0];
        assert!(!result.passed);
        assert_eq!(result.successful_iterations, 0);
        assert!(result.failures[0].contains("always fails"));
        assert!(result.failures[0].contains("call 10: decrease"));
    }

    #[test]
    fn scenario_result_serializes_durations_as_micros() {
        let result = ScenarioResult {
            scenario_name: "Probe".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_micros(1_500),
            performance_data: vec![Duration::from_micros(1_500)],
            runs: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 1_500);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_duration, Duration::from_micros(1_500));
    }
}
