use std::fmt;

use neuroplay_engine::{AttemptInput, ParameterSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const CHALLENGE_KIND: &str = "obstacle";

/// Interface for synthetic players driving a simulation.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Produce the response to the `index`-th challenge under the current parameters.
    fn respond(&mut self, params: &ParameterSet, index: usize) -> AttemptInput;
}

/// Built-in player profiles for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerProfile {
    Expert,
    Novice,
    Learner,
    Erratic,
    Untimed,
}

impl PlayerProfile {
    #[cfg(test)]
    pub const ALL: [Self; 5] = [
        Self::Expert,
        Self::Novice,
        Self::Learner,
        Self::Erratic,
        Self::Untimed,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expert => "expert",
            Self::Novice => "novice",
            Self::Learner => "learner",
            Self::Erratic => "erratic",
            Self::Untimed => "untimed",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        match self {
            Self::Expert => Box::new(ExpertPlayer { rng }),
            Self::Novice => Box::new(NovicePlayer { rng }),
            Self::Learner => Box::new(LearnerPlayer { rng }),
            Self::Erratic => Box::new(ErraticPlayer { rng }),
            Self::Untimed => Box::new(UntimedPlayer),
        }
    }
}

impl fmt::Display for PlayerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Always right, always quick.
struct ExpertPlayer {
    rng: ChaCha20Rng,
}

/// Mostly wrong and slow.
struct NovicePlayer {
    rng: ChaCha20Rng,
}

/// Skill falls off as the game speeds up, so difficulty settles mid-range.
struct LearnerPlayer {
    rng: ChaCha20Rng,
}

/// Accurate but alternates between snap and hesitant responses.
struct ErraticPlayer {
    rng: ChaCha20Rng,
}

/// Plays on a device without timing; three hits in every four.
struct UntimedPlayer;

impl PlayerPolicy for ExpertPlayer {
    fn name(&self) -> &'static str {
        "Expert"
    }

    fn respond(&mut self, _params: &ParameterSet, _index: usize) -> AttemptInput {
        AttemptInput::new(true, self.rng.gen_range(350.0..650.0), CHALLENGE_KIND)
    }
}

impl PlayerPolicy for NovicePlayer {
    fn name(&self) -> &'static str {
        "Novice"
    }

    fn respond(&mut self, _params: &ParameterSet, _index: usize) -> AttemptInput {
        let correct = self.rng.gen_bool(0.35);
        AttemptInput::new(correct, self.rng.gen_range(2_200.0..3_200.0), CHALLENGE_KIND)
    }
}

impl PlayerPolicy for LearnerPlayer {
    fn name(&self) -> &'static str {
        "Learner"
    }

    fn respond(&mut self, params: &ParameterSet, _index: usize) -> AttemptInput {
        let hit_chance = learner_hit_chance(params.speed);
        let correct = self.rng.gen_bool(hit_chance);
        let reaction = 300.0 + 50.0 * params.speed + self.rng.gen_range(-80.0..80.0);
        AttemptInput::new(correct, reaction, CHALLENGE_KIND)
    }
}

impl PlayerPolicy for ErraticPlayer {
    fn name(&self) -> &'static str {
        "Erratic"
    }

    fn respond(&mut self, _params: &ParameterSet, index: usize) -> AttemptInput {
        let reaction = if index % 2 == 0 {
            self.rng.gen_range(250.0..350.0)
        } else {
            self.rng.gen_range(1_600.0..1_900.0)
        };
        AttemptInput::new(true, reaction, CHALLENGE_KIND)
    }
}

impl PlayerPolicy for UntimedPlayer {
    fn name(&self) -> &'static str {
        "Untimed"
    }

    fn respond(&mut self, _params: &ParameterSet, index: usize) -> AttemptInput {
        AttemptInput::untimed(index % 4 != 3, CHALLENGE_KIND)
    }
}

fn learner_hit_chance(speed: f64) -> f64 {
    (1.4 - 0.1 * speed).clamp(0.05, 0.97)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses(profile: PlayerProfile, count: usize) -> Vec<AttemptInput> {
        let mut policy = profile.create_policy(7);
        let params = ParameterSet::default();
        (0..count).map(|i| policy.respond(&params, i)).collect()
    }

    #[test]
    fn expert_is_fast_and_accurate() {
        let inputs = responses(PlayerProfile::Expert, 50);
        assert!(inputs.iter().all(|a| a.correct));
        assert!(inputs.iter().all(|a| a.reaction_time_ms < 800.0));
    }

    #[test]
    fn novice_is_always_slow() {
        let inputs = responses(PlayerProfile::Novice, 50);
        assert!(inputs.iter().all(|a| a.reaction_time_ms > 2_000.0));
    }

    #[test]
    fn untimed_player_reports_no_timing() {
        let inputs = responses(PlayerProfile::Untimed, 8);
        assert!(inputs.iter().all(|a| a.reaction_time_ms <= 0.0));
        assert_eq!(inputs.iter().filter(|a| a.correct).count(), 6);
    }

    #[test]
    fn erratic_player_alternates() {
        let inputs = responses(PlayerProfile::Erratic, 4);
        assert!(inputs[0].reaction_time_ms < 400.0);
        assert!(inputs[1].reaction_time_ms > 1_500.0);
    }

    #[test]
    fn learner_struggles_as_speed_rises() {
        assert!(learner_hit_chance(5.0) > 0.85);
        assert!(learner_hit_chance(9.0) < 0.6);
        assert!(learner_hit_chance(15.0) >= 0.05);
    }

    #[test]
    fn same_seed_same_responses() {
        let a = responses(PlayerProfile::Learner, 20);
        let b = responses(PlayerProfile::Learner, 20);
        assert_eq!(a, b);
    }

    #[test]
    fn labels_are_unique() {
        let labels: std::collections::HashSet<_> =
            PlayerProfile::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels.len(), PlayerProfile::ALL.len());
    }
}
