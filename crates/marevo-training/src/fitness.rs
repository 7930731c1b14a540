//! Fitness evaluation: replaying a genome through one environment episode.
//!
//! # How It Works
//!
//! 1. **Reset** - Start a fresh episode on the given environment
//! 2. **Replay** - Step through the genes in order until the genome is exhausted
//!    or the environment reports the episode is over
//! 3. **Shape** - Add the survival and right-move bonuses to the accumulated reward
//! 4. **Normalize** - Divide by a fixed constant
//!
//! ```text
//! score   = Σ reward + survival_bonus·[max_time_remaining > 0] + right_move_bonus·right_moves
//! fitness = score / normalization
//! ```
//!
//! Only steps actually taken count toward `right_moves`; genes left over after the
//! episode ends are ignored. An environment that is already terminal after reset
//! yields the all-zero [`Evaluation`].

use marevo_env::{Action, Environment, EnvironmentError};
use serde::{Deserialize, Serialize};

use crate::genome::Genome;

/// Reward shaping constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessParams {
    /// Added once when any step reported time remaining.
    pub survival_bonus: f64,
    /// Added per step taken with [`Action::Right`].
    pub right_move_bonus: f64,
    /// Divisor applied to the shaped score.
    pub normalization: f64,
}

impl Default for FitnessParams {
    fn default() -> Self {
        Self {
            survival_bonus: 500.0,
            right_move_bonus: 5.0,
            normalization: 10_000.0,
        }
    }
}

/// Summary of one evaluated episode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Evaluation {
    /// Sum of the rewards reported by every step taken.
    pub reward_total: f64,
    pub max_time_remaining: f64,
    pub right_moves: usize,
    /// Number of genes consumed before the episode ended.
    pub steps: usize,
    /// Reward total plus bonuses.
    pub score: f64,
    /// `score / normalization`.
    pub fitness: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FitnessEvaluator {
    params: FitnessParams,
}

impl FitnessEvaluator {
    #[must_use]
    pub fn new(params: FitnessParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &FitnessParams {
        &self.params
    }

    /// Replays `genome` through a fresh episode of `env`.
    ///
    /// Errors only when the environment itself fails; an exhausted episode simply
    /// stops the replay.
    pub fn evaluate<E>(&self, genome: &Genome, env: &mut E) -> Result<Evaluation, EnvironmentError>
    where
        E: Environment + ?Sized,
    {
        env.reset()?;

        let mut reward_total = 0.0;
        let mut max_time_remaining: f64 = 0.0;
        let mut right_moves = 0;
        let mut steps = 0;
        for gene in genome.genes() {
            if env.is_terminal() {
                break;
            }
            let step = env.step(gene.action(), gene.duration())?;
            steps += 1;
            reward_total += step.reward;
            max_time_remaining = max_time_remaining.max(step.time_remaining);
            if gene.action() == Action::Right {
                right_moves += 1;
            }
            if step.signal.is_game_over() {
                break;
            }
        }

        let score = self.score(reward_total, max_time_remaining, right_moves);
        Ok(Evaluation {
            reward_total,
            max_time_remaining,
            right_moves,
            steps,
            score,
            fitness: score / self.params.normalization,
        })
    }

    #[expect(clippy::cast_precision_loss)]
    fn score(&self, reward_total: f64, max_time_remaining: f64, right_moves: usize) -> f64 {
        let survival_bonus = if max_time_remaining > 0.0 {
            self.params.survival_bonus
        } else {
            0.0
        };
        reward_total + survival_bonus + right_moves as f64 * self.params.right_move_bonus
    }
}
