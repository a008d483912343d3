//! Fixed-capacity metric window

use std::collections::VecDeque;

/// Rolling window over one scalar metric.
///
/// Pushing beyond capacity evicts the oldest value.
#[derive(Debug, Clone)]
pub struct MetricWindow {
    values: VecDeque<f32>,
    capacity: usize,
}

impl MetricWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Simple moving average over the window contents.
    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    /// Median of the window contents. More robust than the mean against
    /// single-frame spikes, which pose solves are prone to.
    pub fn median(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f32> = self.values.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_over_partial_window() {
        let mut w = MetricWindow::new(5);
        w.push(1.0);
        w.push(2.0);
        w.push(3.0);
        assert!((w.mean() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut w = MetricWindow::new(3);
        for v in [1.0, 2.0, 3.0, 10.0] {
            w.push(v);
        }
        assert_eq!(w.len(), 3);
        assert!((w.mean() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_median_odd_and_even() {
        let mut w = MetricWindow::new(5);
        for v in [5.0, 1.0, 9.0] {
            w.push(v);
        }
        assert!((w.median() - 5.0).abs() < 1e-6);
        w.push(7.0);
        assert!((w.median() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_median_rejects_spike() {
        let mut w = MetricWindow::new(5);
        for v in [10.0, 10.0, 90.0, 10.0, 10.0] {
            w.push(v);
        }
        assert!((w.median() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_window_is_zero() {
        let w = MetricWindow::new(4);
        assert_eq!(w.mean(), 0.0);
        assert_eq!(w.median(), 0.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Whatever gets pushed, the window never grows past its
            /// capacity and only the newest values survive eviction.
            #[test]
            fn eviction_keeps_newest_values(
                values in proptest::collection::vec(0.0f32..1.0, 1..64),
                capacity in 1usize..16,
            ) {
                let mut w = MetricWindow::new(capacity);
                for &v in &values {
                    w.push(v);
                }
                prop_assert_eq!(w.len(), values.len().min(capacity));

                let kept = &values[values.len().saturating_sub(capacity)..];
                let expected = kept.iter().sum::<f32>() / kept.len() as f32;
                prop_assert!((w.mean() - expected).abs() < 1e-4);
            }

            /// Mean and median both stay inside the range of the values
            /// still in the window.
            #[test]
            fn summaries_bounded_by_contents(
                values in proptest::collection::vec(0.0f32..1.0, 1..32),
            ) {
                let mut w = MetricWindow::new(8);
                for &v in &values {
                    w.push(v);
                }
                let kept = &values[values.len().saturating_sub(8)..];
                let lo = kept.iter().copied().fold(f32::MAX, f32::min);
                let hi = kept.iter().copied().fold(f32::MIN, f32::max);
                prop_assert!(w.mean() >= lo - 1e-5 && w.mean() <= hi + 1e-5);
                prop_assert!(w.median() >= lo - 1e-5 && w.median() <= hi + 1e-5);
            }
        }
    }
}
