//! Stochastic tournament selection.
//!
//! Each tournament samples `tournament_size` distinct individuals, ranks them by
//! fitness and returns the fittest with probability `exploit_probability`;
//! otherwise one of the other members wins uniformly at random. Selection
//! pressure is controlled only through these two parameters.

use rand::{
    Rng,
    seq::{IndexedRandom as _, index},
};

use crate::genetic::Individual;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TournamentSelector {
    /// Members per tournament (larger = stronger selection pressure).
    pub tournament_size: usize,
    /// Probability that the fittest member wins.
    pub exploit_probability: f64,
}

impl Default for TournamentSelector {
    fn default() -> Self {
        Self {
            tournament_size: 5,
            exploit_probability: 0.75,
        }
    }
}

impl TournamentSelector {
    /// Runs one tournament per individual and returns the winners' indices.
    ///
    /// The result has the same length as `individuals`. An index may appear more
    /// than once; tournaments draw independently of each other.
    ///
    /// # Panics
    ///
    /// Panics if `tournament_size` is zero or larger than the population.
    pub fn select<R>(&self, individuals: &[Individual], rng: &mut R) -> Vec<usize>
    where
        R: Rng + ?Sized,
    {
        (0..individuals.len())
            .map(|_| self.tournament(individuals, rng))
            .collect()
    }

    /// Runs a single tournament and returns the winner's index.
    pub fn tournament<R>(&self, individuals: &[Individual], rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        assert!(self.tournament_size > 0);
        assert!(
            self.tournament_size <= individuals.len(),
            "tournament size {} exceeds population size {}",
            self.tournament_size,
            individuals.len()
        );

        let mut group = index::sample(rng, individuals.len(), self.tournament_size).into_vec();
        // stable: equal fitness keeps sampling order
        group.sort_by(|&a, &b| individuals[b].fitness().total_cmp(&individuals[a].fitness()));

        let (best, rest) = (group[0], &group[1..]);
        if rng.random_bool(self.exploit_probability) {
            best
        } else {
            rest.choose(rng).copied().unwrap_or(best)
        }
    }
}
