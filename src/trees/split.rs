//! Split selection strategies.
//!
//! A strategy only picks the feature and threshold for the rows that reached
//! a node; partitioning, stopping rules and node layout stay in the tree.

use rand::{rngs::StdRng, Rng};

use crate::data::{dataset::Dataset, stats};
use crate::seeded_rng;

/// Picks a split for the rows of a node.
pub trait SplitSelector: Send + Sync {
    /// Returns `(feature_index, threshold)` for `dataset`, which has at least
    /// two rows, at least one column and non-uniform labels.
    fn select_split(&mut self, dataset: &Dataset) -> (usize, f64);
}

/// Splits on the feature most correlated (in absolute value) with the labels,
/// at that feature's median.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorrelationSplit;

impl SplitSelector for CorrelationSplit {
    fn select_split(&mut self, dataset: &Dataset) -> (usize, f64) {
        let labels = dataset.y.as_slice();
        let mut best_feature = 0;
        let mut best_correlation = 0.0;

        for feature_index in 0..dataset.ncols() {
            let column = column_values(dataset, feature_index);
            // Undefined correlations never beat a defined one.
            let correlation = stats::pearson(&column, labels).map_or(0.0, f64::abs);
            if correlation > best_correlation {
                best_correlation = correlation;
                best_feature = feature_index;
            }
        }

        let column = column_values(dataset, best_feature);
        (best_feature, stats::median(&column))
    }
}

/// Splits on a uniformly drawn feature, at that feature's median.
#[derive(Clone, Debug)]
pub struct RandomSplit {
    rng: StdRng,
}

impl Default for RandomSplit {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RandomSplit {
    /// Seeded from `seed`, or from system entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        Self::from_rng(seeded_rng(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl SplitSelector for RandomSplit {
    fn select_split(&mut self, dataset: &Dataset) -> (usize, f64) {
        let feature_index = self.rng.gen_range(0..dataset.ncols());
        let column = column_values(dataset, feature_index);
        (feature_index, stats::median(&column))
    }
}

fn column_values(dataset: &Dataset, feature_index: usize) -> Vec<f64> {
    dataset.x.column(feature_index).iter().copied().collect()
}
