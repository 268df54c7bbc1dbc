use serde::Serialize;

use crate::logic::tester::{RunRecord, ScenarioResult};

/// Per-scenario statistics across every seed and iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioAggregate {
    pub scenario_name: String,
    pub profile: String,
    pub runs: u32,
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
    pub mean_adjustments: f64,
    pub increase_share: f64,
    pub decrease_share: f64,
    pub mean_final_speed: f64,
    pub std_final_speed: f64,
    pub mean_final_gravity: f64,
    pub mean_cascades: f64,
}

/// Group run records by scenario, preserving first-seen order.
#[must_use]
pub fn aggregate_runs(results: &[ScenarioResult]) -> Vec<ScenarioAggregate> {
    let mut builders: Vec<AggregateBuilder> = Vec::new();

    for record in results.iter().flat_map(|result| &result.runs) {
        let existing = builders
            .iter()
            .position(|b| b.scenario_name == record.scenario);
        let index = if let Some(index) = existing {
            index
        } else {
            builders.push(AggregateBuilder::new(record));
            builders.len() - 1
        };
        builders[index].add(record);
    }

    builders.into_iter().map(AggregateBuilder::finish).collect()
}

struct AggregateBuilder {
    scenario_name: String,
    profile: String,
    accuracy: RunningStats,
    adjustments: RunningStats,
    final_speed: RunningStats,
    final_gravity: RunningStats,
    cascades: RunningStats,
    increases: usize,
    decreases: usize,
    total_adjustments: usize,
}

impl AggregateBuilder {
    fn new(record: &RunRecord) -> Self {
        Self {
            scenario_name: record.scenario.clone(),
            profile: record.profile.clone(),
            accuracy: RunningStats::default(),
            adjustments: RunningStats::default(),
            final_speed: RunningStats::default(),
            final_gravity: RunningStats::default(),
            cascades: RunningStats::default(),
            increases: 0,
            decreases: 0,
            total_adjustments: 0,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn add(&mut self, record: &RunRecord) {
        self.accuracy.add(record.accuracy);
        self.adjustments.add(record.adjustments as f64);
        self.final_speed.add(record.final_speed);
        self.final_gravity.add(record.final_gravity);
        self.cascades.add(record.cascades as f64);
        self.increases += record.increases;
        self.decreases += record.decreases;
        self.total_adjustments += record.adjustments;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> ScenarioAggregate {
        let share = |count: usize| {
            if self.total_adjustments == 0 {
                0.0
            } else {
                count as f64 / self.total_adjustments as f64
            }
        };
        ScenarioAggregate {
            increase_share: share(self.increases),
            decrease_share: share(self.decreases),
            runs: self.accuracy.count,
            mean_accuracy: self.accuracy.mean(),
            std_accuracy: self.accuracy.std_dev(),
            mean_adjustments: self.adjustments.mean(),
            mean_final_speed: self.final_speed.mean(),
            std_final_speed: self.final_speed.std_dev(),
            mean_final_gravity: self.final_gravity.mean(),
            mean_cascades: self.cascades.mean(),
            scenario_name: self.scenario_name,
            profile: self.profile,
        }
    }
}

/// Welford accumulator; reports the sample standard deviation.
#[derive(Debug, Default, Clone, Copy)]
struct RunningStats {
    count: u32,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let count = f64::from(self.count);
        let delta = value - self.mean;
        self.mean += delta / count;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    const fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / f64::from(self.count - 1)
        } else {
            0.0
        }
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
