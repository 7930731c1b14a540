use chrono::{DateTime, Utc};
use marevo_env::simulator::SimulatorConfig;
use marevo_training::{fitness::FitnessParams, genome::Genome};
use serde::{Deserialize, Serialize};

/// The best action plan found by a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestGenomeRecord {
    /// Timestamp when training finished (ISO 8601 format)
    pub trained_at: DateTime<Utc>,
    /// Normalized fitness of the plan
    pub fitness: f64,
    /// Shaped score before normalization
    pub score: f64,
    /// Number of generations the run went through
    pub generations: usize,
    /// Seed of the run's random generator
    pub seed: u64,
    /// Number of genes in `genes`
    pub genome_len: usize,
    /// Simulator the plan was trained against
    pub simulator: SimulatorConfig,
    /// Reward shaping used during training
    pub fitness_params: FitnessParams,
    /// The plan itself, as `[action, duration]` pairs
    pub genes: Genome,
}
