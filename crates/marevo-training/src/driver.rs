//! The generational driver.
//!
//! [`Trainer`] owns the population and a pool of environment instances and runs
//! generations strictly one after another:
//!
//! ```text
//! Initialized → Evaluating → Selecting → Recombining → Mutating → Replacing
//!                   ↑                                                  │
//!                   └──────────── next generation ─────────────────────┤
//!                                                                      ↓
//!                                                                  Terminal
//! ```
//!
//! After every evaluation the trainer compares the generation's best individual
//! with the best seen so far and keeps a detached copy when it is strictly
//! better. The reported best-ever fitness therefore never decreases.
//!
//! All randomness comes from the generator passed in by the caller, so a run is
//! reproducible from its seed regardless of how evaluation is spread over threads.

use marevo_env::Environment;
use rand::Rng;

use crate::{
    config::{ConfigError, TrainingConfig},
    fitness::FitnessEvaluator,
    genetic::{Individual, Population, PopulationEvolver},
    stats::FitnessStats,
};

/// Where the driver is in the generational cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    Initialized,
    Evaluating,
    Selecting,
    Recombining,
    Mutating,
    Replacing,
    Terminal,
}

/// Per-generation progress summary.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generation: usize,
    pub stats: FitnessStats,
    /// Best fitness within this generation.
    pub generation_best: f64,
    /// Best fitness across all generations so far.
    pub best_fitness: f64,
    /// Whether this generation produced a new best-ever individual.
    pub improved: bool,
    pub evaluation_failures: usize,
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Best individual observed across all generations.
    pub best: Individual,
    pub history: Vec<GenerationReport>,
    /// Population left after the last replacement.
    pub final_population: Population,
}

#[derive(Debug)]
pub struct Trainer<E> {
    config: TrainingConfig,
    evaluator: FitnessEvaluator,
    evolver: PopulationEvolver,
    environments: Vec<E>,
    population: Population,
    best: Option<Individual>,
    generation: usize,
    phase: DriverPhase,
}

impl<E> Trainer<E>
where
    E: Environment,
{
    /// Validates `config`, provisions the environment pool and creates the initial
    /// random population.
    pub fn new<F, R>(config: TrainingConfig, mut make_env: F, rng: &mut R) -> Result<Self, ConfigError>
    where
        F: FnMut() -> E,
        R: Rng + ?Sized,
    {
        config.validate()?;
        let environments = (0..config.worker_count()).map(|_| make_env()).collect();
        let population = Population::random(
            rng,
            config.population_size,
            config.genome_len,
            &config.initial_action_weights,
        );
        log::debug!(
            "initialized population of {} genomes with {} genes",
            config.population_size,
            config.genome_len
        );
        Ok(Self {
            evaluator: FitnessEvaluator::new(config.fitness),
            evolver: config.evolver(),
            environments,
            population,
            best: None,
            generation: 0,
            phase: DriverPhase::Initialized,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Best individual observed so far, if any generation has been evaluated.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    fn enter(&mut self, phase: DriverPhase) {
        log::trace!("generation {}: {:?} -> {phase:?}", self.generation, self.phase);
        self.phase = phase;
    }

    /// Runs one full generation: evaluate, track the best, then replace the
    /// population.
    pub fn run_generation<R>(&mut self, rng: &mut R) -> GenerationReport
    where
        R: Rng + ?Sized,
    {
        self.enter(DriverPhase::Evaluating);
        let evaluation_failures = self
            .population
            .evaluate_fitness(&self.evaluator, &mut self.environments);

        let stats = self
            .population
            .compute_fitness_stats()
            .expect("validated population is never empty");
        let generation_best = self
            .population
            .best()
            .expect("validated population is never empty");

        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| generation_best.fitness() > best.fitness());
        if improved {
            log::debug!(
                "generation {}: new best fitness {:.4}",
                self.generation,
                generation_best.fitness()
            );
            self.best = Some(generation_best.clone());
        }
        let report = GenerationReport {
            generation: self.generation,
            stats,
            generation_best: generation_best.fitness(),
            best_fitness: self.best.as_ref().map_or(f64::NEG_INFINITY, Individual::fitness),
            improved,
            evaluation_failures,
        };
        log::info!(
            "generation {}: best {:.4} (all-time {:.4}), mean {:.4}, failures {}",
            report.generation,
            report.generation_best,
            report.best_fitness,
            report.stats.mean,
            report.evaluation_failures
        );

        let phase = &mut self.phase;
        let generation = self.generation;
        self.population = self
            .evolver
            .evolve(&self.population, rng, |next| {
                log::trace!("generation {generation}: {:?} -> {next:?}", *phase);
                *phase = next;
            })
            .expect("genomes of a validated population share one length of at least 3");

        self.generation += 1;
        report
    }

    /// Runs the configured number of generations and returns the best individual.
    ///
    /// `observer` is called with every generation's report.
    pub fn run<R, O>(mut self, rng: &mut R, mut observer: O) -> TrainingOutcome
    where
        R: Rng + ?Sized,
        O: FnMut(&GenerationReport),
    {
        let mut history = Vec::with_capacity(self.config.generations);
        while self.generation < self.config.generations {
            let report = self.run_generation(rng);
            observer(&report);
            history.push(report);
        }
        self.enter(DriverPhase::Terminal);

        TrainingOutcome {
            best: self
                .best
                .expect("at least one generation has been evaluated"),
            history,
            final_population: self.population,
        }
    }
}

/// Builds a [`Trainer`] from `config` and runs it to completion.
pub fn run<E, F, R>(
    config: TrainingConfig,
    make_env: F,
    rng: &mut R,
) -> Result<TrainingOutcome, ConfigError>
where
    E: Environment,
    F: FnMut() -> E,
    R: Rng + ?Sized,
{
    let trainer = Trainer::new(config, make_env, rng)?;
    Ok(trainer.run(rng, |_| {}))
}

#[cfg(test)]
mod tests {
    use marevo_env::{
        scripted::ScriptedEnvironment,
        simulator::{CourseSimulator, SimulatorConfig},
    };
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    /// Small, deterministic setup: 4 individuals of 6 genes, no mutation,
    /// tournaments of 2, three generations.
    fn scenario_config() -> TrainingConfig {
        TrainingConfig {
            genome_len: 6,
            population_size: 4,
            generations: 3,
            tournament_size: 2,
            mutation_rate: 0.0,
            workers: 2,
            seed: Some(7),
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_with_scripted_environment() {
        let mut rng = Pcg64::seed_from_u64(7);
        let trainer = Trainer::new(scenario_config(), ScriptedEnvironment::new, &mut rng).unwrap();
        assert_eq!(trainer.phase(), DriverPhase::Initialized);

        let mut reports = vec![];
        let outcome = trainer.run(&mut rng, |report| reports.push(report.clone()));

        assert_eq!(reports.len(), 3);
        assert_eq!(outcome.history.len(), 3);
        assert_eq!(outcome.final_population.len(), 4);
        assert!(
            outcome
                .final_population
                .individuals()
                .iter()
                .all(|i| i.genome().len() == 6)
        );

        let eval = outcome.best.evaluation().unwrap();
        assert_eq!(eval.steps, 6);
        assert!((eval.reward_total - 6.0).abs() < f64::EPSILON);
        assert!(eval.max_time_remaining > 0.0);
        #[expect(clippy::cast_precision_loss)]
        let expected = 6.0 + 500.0 + 5.0 * eval.right_moves as f64;
        assert!((eval.score - expected).abs() < 1e-9);
        assert!((outcome.best.fitness() - expected / 10_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_every_individual_replays_whole_genome() {
        let mut rng = Pcg64::seed_from_u64(11);
        let mut trainer =
            Trainer::new(scenario_config(), ScriptedEnvironment::new, &mut rng).unwrap();
        trainer.run_generation(&mut rng);
        assert_eq!(trainer.generation(), 1);
        assert_eq!(trainer.phase(), DriverPhase::Replacing);
        assert_eq!(trainer.population().len(), 4);
        // survivors keep their evaluation from the generation they were selected in
        for survivor in &trainer.population().individuals()[..2] {
            let eval = survivor.evaluation().unwrap();
            assert_eq!(eval.steps, 6);
            assert!((eval.reward_total - 6.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_best_fitness_is_monotonic() {
        let config = TrainingConfig {
            genome_len: 40,
            population_size: 8,
            generations: 6,
            tournament_size: 3,
            workers: 3,
            ..TrainingConfig::default()
        };
        let mut rng = Pcg64::seed_from_u64(3);
        let outcome = run(
            config,
            || {
                CourseSimulator::new(SimulatorConfig {
                    course_length: 800,
                    ..SimulatorConfig::default()
                })
            },
            &mut rng,
        )
        .unwrap();

        assert!(outcome.history[0].improved);
        for pair in outcome.history.windows(2) {
            assert!(pair[1].best_fitness >= pair[0].best_fitness);
            if !pair[1].improved {
                assert!((pair[1].best_fitness - pair[0].best_fitness).abs() < f64::EPSILON);
            }
        }
        let last = outcome.history.last().unwrap();
        assert!((outcome.best.fitness() - last.best_fitness).abs() < f64::EPSILON);
        for report in &outcome.history {
            assert!(report.generation_best <= last.best_fitness);
        }
    }

    #[test]
    fn test_best_snapshot_is_detached() {
        let mut rng = Pcg64::seed_from_u64(5);
        let mut trainer =
            Trainer::new(scenario_config(), ScriptedEnvironment::new, &mut rng).unwrap();
        trainer.run_generation(&mut rng);
        let mut snapshot = trainer.best().unwrap().clone();
        for _ in 0..2 {
            let report = trainer.run_generation(&mut rng);
            let best = trainer.best().unwrap();
            if report.improved {
                assert!(best.fitness() > snapshot.fitness());
            } else {
                // the stored copy survives replacement of the population
                assert_eq!(best.genome(), snapshot.genome());
                assert!((best.fitness() - snapshot.fitness()).abs() < f64::EPSILON);
            }
            snapshot = best.clone();
        }
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let run_once = || {
            let mut rng = Pcg64::seed_from_u64(99);
            run(
                TrainingConfig {
                    genome_len: 30,
                    population_size: 6,
                    generations: 3,
                    tournament_size: 3,
                    workers: 3,
                    ..TrainingConfig::default()
                },
                || CourseSimulator::new(SimulatorConfig::default()),
                &mut rng,
            )
            .unwrap()
        };
        let a = run_once();
        let b = run_once();
        assert_eq!(a.best.genome(), b.best.genome());
        assert_eq!(a.best.fitness().to_bits(), b.best.fitness().to_bits());
    }

    #[test]
    fn test_invalid_config_rejected_before_loop() {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut created = 0;
        let result = Trainer::new(
            TrainingConfig {
                population_size: 3,
                ..TrainingConfig::default()
            },
            || {
                created += 1;
                ScriptedEnvironment::new()
            },
            &mut rng,
        );
        assert!(matches!(result, Err(ConfigError::PopulationTooSmall { .. })));
        assert_eq!(created, 0);
    }

    #[test]
    fn test_failing_environment_does_not_abort() {
        let mut rng = Pcg64::seed_from_u64(2);
        let outcome = run(
            scenario_config(),
            || ScriptedEnvironment::new().failing_reset(),
            &mut rng,
        )
        .unwrap();
        assert!(outcome.history.iter().all(|r| r.evaluation_failures == 4));
        assert!(outcome.best.fitness().abs() < f64::EPSILON);
    }
}
