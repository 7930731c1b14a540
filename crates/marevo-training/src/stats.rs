/// Summary statistics of a generation's fitness values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl FitnessStats {
    /// Computes statistics over `values`.
    ///
    /// Returns `None` if `values` is empty.
    ///
    /// ```
    /// # use marevo_training::stats::FitnessStats;
    /// let stats = FitnessStats::new([0.5, 0.1, 0.3]).unwrap();
    /// assert_eq!(stats.min, 0.1);
    /// assert_eq!(stats.max, 0.5);
    /// assert_eq!(stats.median, 0.3);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let median = values[values.len() / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(FitnessStats::new(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_constant_values() {
        let stats = FitnessStats::new([2.0; 4]).unwrap();
        assert!((stats.mean - 2.0).abs() < f64::EPSILON);
        assert!(stats.std_dev.abs() < f64::EPSILON);
    }

    #[test]
    fn test_spread() {
        let stats = FitnessStats::new([1.0, 3.0]).unwrap();
        assert!((stats.mean - 2.0).abs() < f64::EPSILON);
        assert!((stats.std_dev - 1.0).abs() < f64::EPSILON);
        assert!((stats.median - 3.0).abs() < f64::EPSILON);
    }
}
