//! Sample statistics

/// Summary statistics for a batch of calibration samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleStats {
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
    pub count: usize,
}

impl SampleStats {
    /// Compute statistics from a slice of values.
    pub fn compute(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;

        let min = values.iter().copied().fold(f32::MAX, f32::min);
        let max = values.iter().copied().fold(f32::MIN, f32::max);

        let m2: f32 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        Self {
            mean,
            std_dev,
            min,
            max,
            count: values.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let stats = SampleStats::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((stats.mean - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_std_dev_computation() {
        let stats = SampleStats::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.std_dev - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_min_max() {
        let stats = SampleStats::compute(&[0.31, 0.28, 0.35, 0.30]);
        assert!((stats.min - 0.28).abs() < 1e-6);
        assert!((stats.max - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_empty_values() {
        let stats = SampleStats::compute(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.count, 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// For any batch of plausible metric samples the mean stays
            /// inside [min, max] and the deviation is finite and
            /// non-negative.
            #[test]
            fn mean_bounded_and_std_non_negative(
                values in proptest::collection::vec(0.0f32..10.0, 1..200)
            ) {
                let stats = SampleStats::compute(&values);
                prop_assert!(stats.mean >= stats.min - 1e-3);
                prop_assert!(stats.mean <= stats.max + 1e-3);
                prop_assert!(stats.std_dev >= 0.0);
                prop_assert!(stats.std_dev.is_finite());
                prop_assert_eq!(stats.count, values.len());
            }

            /// A constant batch has zero spread whatever its value.
            #[test]
            fn constant_batch_has_no_spread(v in 0.0f32..10.0, n in 1usize..100) {
                let stats = SampleStats::compute(&vec![v; n]);
                prop_assert!((stats.mean - v).abs() < 1e-3);
                prop_assert!(stats.std_dev < 1e-3);
                prop_assert!((stats.min - v).abs() < 1e-6);
                prop_assert!((stats.max - v).abs() < 1e-6);
            }
        }
    }
}
