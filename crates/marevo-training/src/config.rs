//! Training configuration.
//!
//! Every constant of the search is a field of [`TrainingConfig`] so runs can be
//! tuned from a config file or the command line and tests can shrink the problem.
//! [`TrainingConfig::validate`] rejects settings the generational loop cannot run
//! with; [`Trainer::new`](crate::driver::Trainer::new) calls it before anything
//! else happens.
//!
//! ```
//! use marevo_training::config::TrainingConfig;
//!
//! let config: TrainingConfig =
//!     serde_json::from_str(r#"{ "population_size": 20, "mutation_rate": 0.05 }"#).unwrap();
//! assert_eq!(config.population_size, 20);
//! assert_eq!(config.tournament_size, 5);
//! config.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    fitness::FitnessParams,
    genetic::PopulationEvolver,
    genome::{ActionWeights, MIN_CROSSOVER_LEN},
    selection::TournamentSelector,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Genes per genome.
    pub genome_len: usize,
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    /// Probability that a tournament's fittest member wins.
    pub exploit_probability: f64,
    /// Per-gene mutation probability for offspring.
    pub mutation_rate: f64,
    /// Fraction of the population carried over unchanged from selection.
    pub survivor_fraction: f64,
    /// Number of environment instances evaluated in parallel.
    pub workers: usize,
    /// Seed for all stochastic operators; random when absent.
    pub seed: Option<u64>,
    /// Action distribution of the initial population.
    pub initial_action_weights: ActionWeights,
    pub fitness: FitnessParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            genome_len: 5000,
            population_size: 10,
            generations: 100,
            tournament_size: 5,
            exploit_probability: 0.75,
            mutation_rate: 0.1,
            survivor_fraction: 0.5,
            workers: 4,
            seed: None,
            initial_action_weights: ActionWeights::default(),
            fitness: FitnessParams::default(),
        }
    }
}

impl TrainingConfig {
    /// Checks that the generational loop can run with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall {
                population_size: self.population_size,
                required: 2,
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if self.population_size < self.tournament_size {
            return Err(ConfigError::PopulationTooSmall {
                population_size: self.population_size,
                required: self.tournament_size,
            });
        }
        if self.genome_len < MIN_CROSSOVER_LEN {
            return Err(ConfigError::GenomeTooShort {
                genome_len: self.genome_len,
                required: MIN_CROSSOVER_LEN,
            });
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        for (name, value) in [
            ("exploit_probability", self.exploit_probability),
            ("mutation_rate", self.mutation_rate),
            ("survivor_fraction", self.survivor_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }
        let normalization = self.fitness.normalization;
        if !normalization.is_finite() || normalization <= 0.0 {
            return Err(ConfigError::InvalidNormalization { normalization });
        }
        Ok(())
    }

    /// Number of selected individuals carried over unchanged each generation.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn survivor_count(&self) -> usize {
        let count = (self.population_size as f64 * self.survivor_fraction).floor() as usize;
        count.min(self.population_size)
    }

    /// Number of environment instances to provision (at most one per individual).
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.clamp(1, self.population_size.max(1))
    }

    #[must_use]
    pub fn selector(&self) -> TournamentSelector {
        TournamentSelector {
            tournament_size: self.tournament_size,
            exploit_probability: self.exploit_probability,
        }
    }

    #[must_use]
    pub fn evolver(&self) -> PopulationEvolver {
        PopulationEvolver {
            selector: self.selector(),
            mutation_rate: self.mutation_rate,
            survivor_count: self.survivor_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size {population_size} is too small (need at least {required})")]
    PopulationTooSmall {
        population_size: usize,
        required: usize,
    },
    #[display("tournament size must be at least 1")]
    EmptyTournament,
    #[display("genome length {genome_len} is too short (need at least {required})")]
    GenomeTooShort { genome_len: usize, required: usize },
    #[display("generation count must be at least 1")]
    NoGenerations,
    #[display("worker count must be at least 1")]
    NoWorkers,
    #[display("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[display("normalization divisor must be positive and finite, got {normalization}")]
    InvalidNormalization { normalization: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TrainingConfig::default();
        config.validate().unwrap();
        assert_eq!(config.survivor_count(), 5);
        assert_eq!(config.worker_count(), 4);
    }

    #[test]
    fn test_population_smaller_than_tournament() {
        let config = TrainingConfig {
            population_size: 4,
            ..TrainingConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::PopulationTooSmall {
                population_size: 4,
                required: 5
            })
        );
    }

    #[test]
    fn test_population_too_small_for_crossover() {
        let config = TrainingConfig {
            population_size: 1,
            tournament_size: 1,
            ..TrainingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PopulationTooSmall { required: 2, .. })
        ));
    }

    #[test]
    fn test_genome_too_short() {
        let config = TrainingConfig {
            genome_len: 2,
            ..TrainingConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GenomeTooShort {
                genome_len: 2,
                required: 3
            })
        );
    }

    #[test]
    fn test_rates_out_of_range() {
        let config = TrainingConfig {
            mutation_rate: 1.5,
            ..TrainingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange {
                name: "mutation_rate",
                ..
            })
        ));

        let config = TrainingConfig {
            exploit_probability: f64::NAN,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_normalization() {
        let mut config = TrainingConfig::default();
        config.fitness.normalization = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNormalization { .. })
        ));
    }

    #[test]
    fn test_worker_count_clamped_to_population() {
        let config = TrainingConfig {
            population_size: 3,
            tournament_size: 2,
            workers: 16,
            ..TrainingConfig::default()
        };
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_survivor_count_rounds_down() {
        let config = TrainingConfig {
            population_size: 7,
            survivor_fraction: 0.5,
            ..TrainingConfig::default()
        };
        assert_eq!(config.survivor_count(), 3);
        let config = TrainingConfig {
            survivor_fraction: 1.0,
            ..config
        };
        assert_eq!(config.survivor_count(), 7);
    }

    #[test]
    fn test_json_roundtrip_keeps_action_weights() {
        let config = TrainingConfig {
            seed: Some(9),
            ..TrainingConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: TrainingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, Some(9));
        assert_eq!(
            back.initial_action_weights.weights().map(f64::to_bits),
            ActionWeights::BIASED.map(f64::to_bits)
        );
    }

    #[test]
    fn test_json_rejects_invalid_action_weights() {
        let result: Result<TrainingConfig, _> =
            serde_json::from_str(r#"{ "initial_action_weights": [0, 0, 0, 0, 0] }"#);
        assert!(result.is_err());
    }
}
