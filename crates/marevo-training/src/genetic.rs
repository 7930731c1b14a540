//! Population management and generational replacement.
//!
//! # Key Components
//!
//! - [`Individual`] - A genome with its fitness for the current generation
//! - [`Population`] - The individuals evaluated together in one generation
//! - [`PopulationEvolver`] - Produces the next generation from an evaluated one
//!
//! # Replacement Scheme
//!
//! Tournament selection fills a selected pool as large as the population. The
//! first `survivor_count` members of that pool pass unchanged into the next
//! generation. The remaining slots are filled with offspring: pairs of distinct
//! positions in the selected pool are crossed over until enough children exist,
//! the surplus child of an odd slot count is dropped, and every child is mutated.
//! Survivors are never mutated.
//!
//! With `survivor_count == population size` no offspring are produced and the
//! population only ever reshuffles its selected members.
//!
//! # Parallelization
//!
//! Fitness evaluation runs on scoped threads, one per environment instance. Each
//! thread evaluates a contiguous chunk of the population against its own
//! environment, and [`Population::evaluate_fitness`] returns only once every
//! individual has been evaluated. Because every evaluation starts from a reset,
//! results do not depend on which thread evaluated which individual.

use std::{iter, panic, thread};

use marevo_env::Environment;
use rand::{Rng, seq::index};

use crate::{
    driver::DriverPhase,
    fitness::{Evaluation, FitnessEvaluator},
    genome::{self, ActionWeights, Genome, GenomeError},
    selection::TournamentSelector,
    stats::FitnessStats,
};

/// A candidate action plan and its most recent fitness.
///
/// Fitness is a per-generation measurement: it is `0.0` until the individual is
/// evaluated and is overwritten by every later evaluation.
#[derive(Debug, Clone)]
pub struct Individual {
    genome: Genome,
    fitness: f64,
    evaluation: Option<Evaluation>,
}

impl Individual {
    #[must_use]
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            fitness: 0.0,
            evaluation: None,
        }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Normalized fitness from the last evaluation.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Details of the last successful evaluation, if any.
    #[must_use]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn record(&mut self, evaluation: Evaluation) {
        self.fitness = evaluation.fitness;
        self.evaluation = Some(evaluation);
    }

    fn record_failure(&mut self) {
        self.fitness = 0.0;
        self.evaluation = None;
    }
}

/// The individuals of one generation.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` individuals with random genomes of `genome_len` genes.
    #[must_use]
    pub fn random<R>(rng: &mut R, count: usize, genome_len: usize, weights: &ActionWeights) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::new(Genome::random(rng, genome_len, weights)))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Returns the individual with the highest fitness (first one on ties).
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .reduce(|best, ind| if ind.fitness > best.fitness { ind } else { best })
    }

    /// Evaluates every individual, spreading the work over `environments`.
    ///
    /// Each environment instance is used by exactly one thread. An individual whose
    /// evaluation fails gets fitness `0.0`; the failure is logged and counted but
    /// does not affect the rest of the population.
    ///
    /// Returns the number of failed evaluations.
    ///
    /// # Panics
    ///
    /// Panics if `environments` is empty.
    pub fn evaluate_fitness<E>(
        &mut self,
        evaluator: &FitnessEvaluator,
        environments: &mut [E],
    ) -> usize
    where
        E: Environment,
    {
        assert!(!environments.is_empty(), "at least one environment required");
        if self.individuals.is_empty() {
            return 0;
        }
        let chunk_size = self.individuals.len().div_ceil(environments.len());

        thread::scope(|s| {
            let workers = iter::zip(environments.iter_mut(), self.individuals.chunks_mut(chunk_size))
                .map(|(env, chunk)| s.spawn(move || evaluate_chunk(evaluator, chunk, env)))
                .collect::<Vec<_>>();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .sum()
        })
    }

    /// Computes statistics over the current fitness values.
    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().map(Individual::fitness))
    }
}

fn evaluate_chunk<E>(evaluator: &FitnessEvaluator, chunk: &mut [Individual], env: &mut E) -> usize
where
    E: Environment,
{
    let mut failures = 0;
    for ind in chunk {
        match evaluator.evaluate(&ind.genome, env) {
            Ok(evaluation) => ind.record(evaluation),
            Err(e) => {
                log::warn!("evaluation failed, scoring individual as 0: {e}");
                ind.record_failure();
                failures += 1;
            }
        }
    }
    failures
}

/// Controls how one generation turns into the next.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    pub selector: TournamentSelector,
    /// Per-gene mutation probability applied to offspring.
    pub mutation_rate: f64,
    /// Selected individuals carried over unchanged.
    pub survivor_count: usize,
}

impl PopulationEvolver {
    /// Builds the next generation from an evaluated population.
    ///
    /// `on_phase` is called as the evolver enters each of the selecting,
    /// recombining, mutating and replacing phases.
    ///
    /// # Panics
    ///
    /// Panics if the population is smaller than 2 or than the tournament size, or
    /// if `survivor_count` exceeds the population size.
    pub fn evolve<R, F>(
        &self,
        population: &Population,
        rng: &mut R,
        mut on_phase: F,
    ) -> Result<Population, GenomeError>
    where
        R: Rng + ?Sized,
        F: FnMut(DriverPhase),
    {
        let size = population.len();
        assert!(size >= 2, "population must have at least 2 individuals");
        assert!(self.survivor_count <= size);

        on_phase(DriverPhase::Selecting);
        let selected = self.selector.select(&population.individuals, rng);

        on_phase(DriverPhase::Recombining);
        let mut offspring = recombine(
            &population.individuals,
            &selected,
            size - self.survivor_count,
            rng,
        )?;

        on_phase(DriverPhase::Mutating);
        for child in &mut offspring {
            genome::mutate(&mut child.genome, self.mutation_rate, rng);
        }

        on_phase(DriverPhase::Replacing);
        let mut next = Vec::with_capacity(size);
        next.extend(
            selected[..self.survivor_count]
                .iter()
                .map(|&i| population.individuals[i].clone()),
        );
        next.append(&mut offspring);
        assert_eq!(next.len(), size, "replacement must preserve population size");

        Ok(Population { individuals: next })
    }
}

/// Crosses over pairs of distinct selected positions until `count` children exist.
fn recombine<R>(
    individuals: &[Individual],
    selected: &[usize],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Individual>, GenomeError>
where
    R: Rng + ?Sized,
{
    let mut offspring = Vec::with_capacity(count + 1);
    while offspring.len() < count {
        let parents = index::sample(rng, selected.len(), 2);
        let p1 = &individuals[selected[parents.index(0)]];
        let p2 = &individuals[selected[parents.index(1)]];
        let (c1, c2) = genome::two_point_crossover(&p1.genome, &p2.genome, rng)?;
        offspring.push(Individual::new(c1));
        offspring.push(Individual::new(c2));
    }
    offspring.truncate(count);
    Ok(offspring)
}
