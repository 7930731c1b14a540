//! Evolutionary search over fixed-length action plans.
//!
//! This crate evolves open-loop controllers for a black-box environment. A
//! controller is a [`genome::Genome`]: a fixed sequence of (action, hold duration)
//! genes that is replayed blindly against the environment from its reset state.
//! Nothing in the search looks at observations; the environment only reports
//! rewards, remaining time and whether the episode is over.
//!
//! # How Training Works
//!
//! 1. **Population** - Create random genomes, biased toward moving right
//! 2. **Evaluation** - Replay every genome against its own environment instance
//! 3. **Fitness** - Shape the accumulated reward with survival and progress bonuses
//! 4. **Selection** - Stochastic tournaments pick a selected pool
//! 5. **Reproduction** - Two-point crossover and per-gene mutation fill the next generation
//! 6. **Repeat** - Keep the best genome ever seen until the generation budget runs out
//!
//! # Architecture
//!
//! ```text
//! Trainer (driver)
//!     ↓ owns
//! Population of Genomes
//!     ↓ replayed by
//! FitnessEvaluator ── steps ──→ Environment (marevo-env)
//!     ↓ produces
//! Fitness
//!     ↓ guides
//! TournamentSelector → crossover → mutation → replacement
//! ```
//!
//! # Modules
//!
//! - [`genome`] - Genes, genomes and the crossover and mutation operators
//! - [`fitness`] - Episode rollout and fitness shaping
//! - [`selection`] - Tournament selection
//! - [`genetic`] - Population, parallel evaluation and generational replacement
//! - [`driver`] - The generation loop and best-ever tracking
//! - [`config`] - Tunable parameters and their validation
//! - [`stats`] - Per-generation fitness statistics
//!
//! # Example
//!
//! ```
//! use marevo_env::scripted::ScriptedEnvironment;
//! use marevo_training::{config::TrainingConfig, driver};
//! use rand::SeedableRng as _;
//!
//! let config = TrainingConfig {
//!     genome_len: 8,
//!     population_size: 6,
//!     generations: 2,
//!     tournament_size: 3,
//!     ..TrainingConfig::default()
//! };
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let outcome = driver::run(config, ScriptedEnvironment::new, &mut rng).unwrap();
//! assert_eq!(outcome.history.len(), 2);
//! assert_eq!(outcome.best.genome().len(), 8);
//! ```

pub mod config;
pub mod driver;
pub mod fitness;
pub mod genetic;
pub mod genome;
pub mod selection;
pub mod stats;
