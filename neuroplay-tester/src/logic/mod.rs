pub mod analysis;
pub mod player;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use analysis::aggregate_runs;
pub use player::PlayerProfile;
pub use seeds::resolve_seed_inputs;
pub use simulation::{SimulationPlan, SimulationSummary, Simulator};
pub use tester::*;
