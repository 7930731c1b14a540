//! Genes, genomes and the genome-level genetic operators.
//!
//! A [`Genome`] is a fixed-length plan of timed controller inputs. Each [`Gene`]
//! holds one [`Action`] for a number of [`HoldTicks`]. The operators in this
//! module only ever change gene *contents*; a genome's length is fixed when it is
//! built and preserved by crossover and mutation.
//!
//! # Operations
//!
//! - **Initialization**: [`Genome::random`] samples genes with a weighted action
//!   distribution ([`ActionWeights`]) and uniform durations
//! - **Crossover**: [`two_point_crossover`] swaps the segment between two cut points
//! - **Mutation**: [`mutate`] resamples genes independently per position
//!
//! # Design Decisions
//!
//! ## Mutation Always Alters
//!
//! A mutated position is replaced by a gene drawn uniformly from the 49 genes that
//! differ from the current one. The mutation rate is therefore exactly the expected
//! fraction of altered positions; with rate 1.0 every gene changes.

use std::fmt;

use marevo_env::{Action, ActionError, HoldTicks};
use rand::{Rng, distr::weighted::WeightedIndex, seq::index};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One timed controller input: hold `action` for `duration` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gene {
    action: Action,
    duration: HoldTicks,
}

impl Gene {
    /// Number of distinct genes.
    pub const COUNT: usize = Action::LEN * HoldTicks::ALL.len();

    #[must_use]
    pub const fn new(action: Action, duration: HoldTicks) -> Self {
        Self { action, duration }
    }

    /// Builds a gene from its raw `(action_index, duration)` pair.
    pub fn from_raw(action_index: u8, duration: u8) -> Result<Self, ActionError> {
        Ok(Self {
            action: Action::from_index(action_index)?,
            duration: HoldTicks::new(duration)?,
        })
    }

    #[must_use]
    pub const fn action(self) -> Action {
        self.action
    }

    #[must_use]
    pub const fn duration(self) -> HoldTicks {
        self.duration
    }

    /// Samples a gene whose action follows `weights` and whose duration is uniform.
    pub fn random_with<R>(rng: &mut R, weights: &ActionWeights) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            action: Action::ALL[rng.sample(&weights.distribution)],
            duration: HoldTicks::ALL[rng.random_range(0..HoldTicks::ALL.len())],
        }
    }

    /// Samples uniformly among the genes different from `self`.
    pub fn random_other<R>(self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut index = rng.random_range(0..Self::COUNT - 1);
        if index >= self.index() {
            index += 1;
        }
        Self::from_index(index)
    }

    fn index(self) -> usize {
        usize::from(self.action.index()) * HoldTicks::ALL.len()
            + usize::from(self.duration.get() - HoldTicks::MIN)
    }

    fn from_index(index: usize) -> Self {
        let ticks = HoldTicks::ALL.len();
        Self {
            action: Action::ALL[index / ticks],
            duration: HoldTicks::ALL[index % ticks],
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {} ticks", self.action, self.duration)
    }
}

/// Genes are stored as `[action_index, duration]` pairs.
impl Serialize for Gene {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.action.index(), self.duration.get()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Gene {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (action, duration) = <(u8, u8)>::deserialize(deserializer)?;
        Self::from_raw(action, duration).map_err(serde::de::Error::custom)
    }
}

/// Relative weights of each [`Action`] when sampling initial genomes.
///
/// Serialized as an array of five weights in action index order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "[f64; 5]", into = "[f64; 5]")]
pub struct ActionWeights {
    weights: [f64; Action::LEN],
    distribution: WeightedIndex<f64>,
}

impl ActionWeights {
    /// Weights biased toward moving right, as used for initial populations.
    pub const BIASED: [f64; Action::LEN] = [0.3, 0.5, 0.1, 0.1, 0.2];

    pub fn new(weights: [f64; Action::LEN]) -> Result<Self, GenomeError> {
        let distribution =
            WeightedIndex::new(weights).map_err(|e| GenomeError::InvalidActionWeights {
                reason: e.to_string(),
            })?;
        Ok(Self {
            weights,
            distribution,
        })
    }

    /// Equal weight for every action.
    #[must_use]
    pub fn uniform() -> Self {
        Self::from_valid([1.0; Action::LEN])
    }

    #[must_use]
    pub fn weights(&self) -> [f64; Action::LEN] {
        self.weights
    }

    fn from_valid(weights: [f64; Action::LEN]) -> Self {
        Self::new(weights).expect("constant action weights must be valid")
    }
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self::from_valid(Self::BIASED)
    }
}

impl TryFrom<[f64; Action::LEN]> for ActionWeights {
    type Error = GenomeError;

    fn try_from(weights: [f64; Action::LEN]) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<ActionWeights> for [f64; Action::LEN] {
    fn from(weights: ActionWeights) -> Self {
        weights.weights
    }
}

/// A fixed-length sequence of genes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    genes: Vec<Gene>,
}

impl Genome {
    #[must_use]
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Creates a genome of `len` genes sampled with [`Gene::random_with`].
    pub fn random<R>(rng: &mut R, len: usize, weights: &ActionWeights) -> Self
    where
        R: Rng + ?Sized,
    {
        let genes = (0..len).map(|_| Gene::random_with(rng, weights)).collect();
        Self { genes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Checks that the genome has exactly `expected` genes.
    pub fn ensure_len(&self, expected: usize) -> Result<(), GenomeError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(GenomeError::WrongLength {
                expected,
                actual: self.len(),
            })
        }
    }
}

/// Minimum genome length for two-point crossover (two distinct interior cuts).
pub const MIN_CROSSOVER_LEN: usize = 3;

/// Performs two-point crossover at random cut points.
///
/// Two distinct cut points are drawn uniformly from `1..len`, sorted, and passed
/// to [`crossover_at`].
pub fn two_point_crossover<R>(
    p1: &Genome,
    p2: &Genome,
    rng: &mut R,
) -> Result<(Genome, Genome), GenomeError>
where
    R: Rng + ?Sized,
{
    check_crossover_parents(p1, p2)?;
    let cuts = index::sample(rng, p1.len() - 1, 2);
    let (a, b) = (cuts.index(0) + 1, cuts.index(1) + 1);
    crossover_at(p1, p2, a.min(b), a.max(b))
}

/// Swaps the segment `cut1..cut2` between two parents.
///
/// ```text
/// child1 = p1[..cut1] ++ p2[cut1..cut2] ++ p1[cut2..]
/// child2 = p2[..cut1] ++ p1[cut1..cut2] ++ p2[cut2..]
/// ```
///
/// Requires `1 <= cut1 < cut2 <= len - 1` and parents of equal length of at least
/// [`MIN_CROSSOVER_LEN`].
pub fn crossover_at(
    p1: &Genome,
    p2: &Genome,
    cut1: usize,
    cut2: usize,
) -> Result<(Genome, Genome), GenomeError> {
    check_crossover_parents(p1, p2)?;
    let len = p1.len();
    if cut1 == 0 || cut1 >= cut2 || cut2 >= len {
        return Err(GenomeError::InvalidCutPoints { cut1, cut2, len });
    }

    let splice = |outer: &Genome, inner: &Genome| {
        let mut genes = Vec::with_capacity(len);
        genes.extend_from_slice(&outer.genes[..cut1]);
        genes.extend_from_slice(&inner.genes[cut1..cut2]);
        genes.extend_from_slice(&outer.genes[cut2..]);
        Genome { genes }
    };
    Ok((splice(p1, p2), splice(p2, p1)))
}

fn check_crossover_parents(p1: &Genome, p2: &Genome) -> Result<(), GenomeError> {
    if p1.len() != p2.len() {
        return Err(GenomeError::LengthMismatch {
            left: p1.len(),
            right: p2.len(),
        });
    }
    if p1.len() < MIN_CROSSOVER_LEN {
        return Err(GenomeError::TooShort {
            len: p1.len(),
            min: MIN_CROSSOVER_LEN,
        });
    }
    Ok(())
}

/// Resamples each gene independently with probability `rate`.
///
/// Returns the number of altered genes.
///
/// # Panics
///
/// Panics if `rate` is not within `[0.0, 1.0]`.
pub fn mutate<R>(genome: &mut Genome, rate: f64, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    assert!(
        (0.0..=1.0).contains(&rate),
        "mutation rate must be within [0, 1], got {rate}"
    );
    let mut altered = 0;
    for gene in &mut genome.genes {
        if rng.random_bool(rate) {
            *gene = gene.random_other(rng);
            altered += 1;
        }
    }
    altered
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenomeError {
    #[display("genome has {actual} genes, expected {expected}")]
    WrongLength { expected: usize, actual: usize },
    #[display("parent genomes differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[display("genome of length {len} is too short for crossover (minimum {min})")]
    TooShort { len: usize, min: usize },
    #[display("invalid cut points {cut1}..{cut2} for genome of length {len}")]
    InvalidCutPoints { cut1: usize, cut2: usize, len: usize },
    #[display("invalid action weights: {reason}")]
    InvalidActionWeights { reason: String },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn rng() -> Pcg64 {
        Pcg64::seed_from_u64(0x5eed)
    }

    fn gene_counts(genomes: &[&Genome]) -> HashMap<Gene, usize> {
        let mut counts = HashMap::new();
        for genome in genomes {
            for gene in genome.genes() {
                *counts.entry(*gene).or_default() += 1;
            }
        }
        counts
    }

    #[test]
    fn test_gene_index_covers_all_genes() {
        for index in 0..Gene::COUNT {
            assert_eq!(Gene::from_index(index).index(), index);
        }
    }

    #[test]
    fn test_random_other_never_returns_self() {
        let mut rng = rng();
        for index in 0..Gene::COUNT {
            let gene = Gene::from_index(index);
            for _ in 0..20 {
                assert_ne!(gene.random_other(&mut rng), gene);
            }
        }
    }

    #[test]
    fn test_gene_json_is_pair() {
        let gene = Gene::new(Action::Right, HoldTicks::new(7).unwrap());
        assert_eq!(serde_json::to_string(&gene).unwrap(), "[1,7]");
        let back: Gene = serde_json::from_str("[1,7]").unwrap();
        assert_eq!(back, gene);
    }

    #[test]
    fn test_gene_json_rejects_out_of_range() {
        assert!(serde_json::from_str::<Gene>("[5,1]").is_err());
        assert!(serde_json::from_str::<Gene>("[0,0]").is_err());
        assert!(serde_json::from_str::<Gene>("[0,11]").is_err());
    }

    #[test]
    fn test_gene_display() {
        let gene = Gene::new(Action::Jump, HoldTicks::new(3).unwrap());
        assert_eq!(gene.to_string(), "A for 3 ticks");
    }

    #[test]
    fn test_action_weights_validation() {
        assert!(ActionWeights::new([0.0; Action::LEN]).is_err());
        assert!(ActionWeights::new([1.0, -1.0, 1.0, 1.0, 1.0]).is_err());
        assert_eq!(
            ActionWeights::default().weights().map(f64::to_bits),
            ActionWeights::BIASED.map(f64::to_bits)
        );
    }

    #[test]
    fn test_action_weights_bias_initial_genomes() {
        let weights = ActionWeights::new([0.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
        let genome = Genome::random(&mut rng(), 200, &weights);
        assert_eq!(genome.len(), 200);
        assert!(genome.genes().iter().all(|g| g.action() == Action::Right));
    }

    #[test]
    fn test_crossover_segments() {
        let mut rng = rng();
        let weights = ActionWeights::uniform();
        let p1 = Genome::random(&mut rng, 10, &weights);
        let p2 = Genome::random(&mut rng, 10, &weights);
        let (c1, c2) = crossover_at(&p1, &p2, 3, 7).unwrap();

        assert_eq!(c1.genes()[..3], p1.genes()[..3]);
        assert_eq!(c1.genes()[3..7], p2.genes()[3..7]);
        assert_eq!(c1.genes()[7..], p1.genes()[7..]);
        assert_eq!(c2.genes()[..3], p2.genes()[..3]);
        assert_eq!(c2.genes()[3..7], p1.genes()[3..7]);
        assert_eq!(c2.genes()[7..], p2.genes()[7..]);
    }

    #[test]
    fn test_random_crossover_preserves_length_and_genes() {
        let mut rng = rng();
        let weights = ActionWeights::uniform();
        for len in [3, 4, 17, 200] {
            for _ in 0..50 {
                let p1 = Genome::random(&mut rng, len, &weights);
                let p2 = Genome::random(&mut rng, len, &weights);
                let (c1, c2) = two_point_crossover(&p1, &p2, &mut rng).unwrap();
                assert_eq!(c1.len(), len);
                assert_eq!(c2.len(), len);
                assert_eq!(c1.genes()[0], p1.genes()[0]);
                assert_eq!(c2.genes()[0], p2.genes()[0]);
                assert_eq!(c1.genes()[len - 1], p1.genes()[len - 1]);
                assert_eq!(gene_counts(&[&c1, &c2]), gene_counts(&[&p1, &p2]));
            }
        }
    }

    #[test]
    fn test_crossover_rejects_bad_parents() {
        let mut rng = rng();
        let weights = ActionWeights::uniform();
        let short = Genome::random(&mut rng, 2, &weights);
        let long = Genome::random(&mut rng, 5, &weights);
        assert_eq!(
            two_point_crossover(&short, &short, &mut rng),
            Err(GenomeError::TooShort { len: 2, min: 3 })
        );
        assert_eq!(
            two_point_crossover(&short, &long, &mut rng),
            Err(GenomeError::LengthMismatch { left: 2, right: 5 })
        );
        assert!(matches!(
            crossover_at(&long, &long, 0, 2),
            Err(GenomeError::InvalidCutPoints { .. })
        ));
        assert!(matches!(
            crossover_at(&long, &long, 2, 5),
            Err(GenomeError::InvalidCutPoints { .. })
        ));
    }

    #[test]
    fn test_mutation_rate_zero_keeps_genome() {
        let mut rng = rng();
        let original = Genome::random(&mut rng, 500, &ActionWeights::default());
        let mut genome = original.clone();
        assert_eq!(mutate(&mut genome, 0.0, &mut rng), 0);
        assert_eq!(genome, original);
    }

    #[test]
    fn test_mutation_rate_one_changes_every_gene() {
        let mut rng = rng();
        let original = Genome::random(&mut rng, 500, &ActionWeights::default());
        let mut genome = original.clone();
        assert_eq!(mutate(&mut genome, 1.0, &mut rng), 500);
        assert_eq!(genome.len(), original.len());
        for (after, before) in genome.genes().iter().zip(original.genes()) {
            assert_ne!(after, before);
        }
    }

    #[test]
    #[expect(clippy::cast_precision_loss)]
    fn test_mutation_fraction_converges_to_rate() {
        let mut rng = rng();
        let rate = 0.3;
        let mut altered = 0;
        let mut total = 0;
        for _ in 0..200 {
            let original = Genome::random(&mut rng, 100, &ActionWeights::uniform());
            let mut genome = original.clone();
            mutate(&mut genome, rate, &mut rng);
            altered += genome
                .genes()
                .iter()
                .zip(original.genes())
                .filter(|(a, b)| a != b)
                .count();
            total += genome.len();
        }
        let fraction = altered as f64 / total as f64;
        assert!((fraction - rate).abs() < 0.02, "fraction = {fraction}");
    }

    #[test]
    fn test_ensure_len() {
        let genome = Genome::random(&mut rng(), 4, &ActionWeights::uniform());
        assert!(genome.ensure_len(4).is_ok());
        assert_eq!(
            genome.ensure_len(5),
            Err(GenomeError::WrongLength {
                expected: 5,
                actual: 4
            })
        );
    }
}
