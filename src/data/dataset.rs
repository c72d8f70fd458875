use nalgebra::{DMatrix, DVector};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng};
use std::fmt::{self, Debug, Formatter};

use crate::error::LearnerError;
use crate::seeded_rng;

/// Feature matrix paired with its label vector, row for row.
#[derive(Clone, PartialEq)]
pub struct Dataset {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
}

impl Debug for Dataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    x: [\n")?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for i in 0..self.y.len() {
            write!(f, "{:?}, ", self.y[i])?;
        }
        write!(f, "]\n}}")
    }
}

impl Dataset {
    /// Pairs features and labels without checking their shapes.
    ///
    /// Learners run [`Dataset::validate`] before training, so an ill-shaped
    /// dataset is rejected there rather than here.
    pub fn new(x: DMatrix<f64>, y: DVector<f64>) -> Self {
        Self { x, y }
    }

    /// Pairs features and labels, failing if they cannot be trained on.
    pub fn try_new(x: DMatrix<f64>, y: DVector<f64>) -> Result<Self, LearnerError> {
        let dataset = Self::new(x, y);
        dataset.validate()?;
        Ok(dataset)
    }

    /// Checks that the dataset is non-empty and that features and labels
    /// have the same number of rows.
    pub fn validate(&self) -> Result<(), LearnerError> {
        if self.x.nrows() != self.y.len() {
            return Err(LearnerError::LengthMismatch {
                features: self.x.nrows(),
                labels: self.y.len(),
            });
        }
        if self.x.nrows() == 0 {
            return Err(LearnerError::EmptyDataset);
        }
        if self.x.ncols() == 0 {
            return Err(LearnerError::ZeroFeatures);
        }
        Ok(())
    }

    pub fn is_not_empty(&self) -> bool {
        !(self.x.is_empty() || self.y.is_empty())
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Copies the given rows, in the given order, into a new dataset.
    /// Indices may repeat.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let x = DMatrix::from_fn(indices.len(), self.x.ncols(), |r, c| {
            self.x[(indices[r], c)]
        });
        let y = DVector::from_iterator(indices.len(), indices.iter().map(|&i| self.y[i]));
        Self::new(x, y)
    }

    /// Routes rows with `x[feature_index] <= threshold` left and the rest right.
    /// Row order is preserved on both sides.
    pub fn split_on_threshold(&self, feature_index: usize, threshold: f64) -> (Self, Self) {
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = (0..self.x.nrows())
            .partition(|&row| self.x[(row, feature_index)] <= threshold);

        (
            self.select_rows(&left_indices),
            self.select_rows(&right_indices),
        )
    }

    /// Draws a same-size resample with replacement, rows in draw order.
    pub fn bootstrap<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let indices = bootstrap_indices(self.nrows(), rng);
        self.select_rows(&indices)
    }

    pub fn train_test_split(
        &self,
        train_size: f64,
        seed: Option<u64>,
    ) -> Result<(Self, Self), LearnerError> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(LearnerError::InvalidParameter {
                name: "train_size",
                reason: format!("must be between 0.0 and 1.0, got {train_size}"),
            });
        }
        let mut rng: StdRng = seeded_rng(seed);

        let mut indices = (0..self.x.nrows()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let train_size = (self.x.nrows() as f64 * train_size).floor() as usize;
        let (train_indices, test_indices) = indices.split_at(train_size);

        Ok((
            self.select_rows(train_indices),
            self.select_rows(test_indices),
        ))
    }
}

/// Draws `n` indices from `0..n` uniformly with replacement.
pub fn bootstrap_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn four_rows() -> Dataset {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let y = DVector::from_vec(vec![9.0, 10.0, 11.0, 12.0]);
        Dataset::new(x, y)
    }

    #[test]
    fn test_dataset_formatting() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![5.0, 6.0]);
        let dataset = Dataset::new(x, y);

        let expected_str = "\
Dataset {
    x: [
        [1.0, 2.0, ],
        [3.0, 4.0, ],
    ],
    y: [5.0, 6.0, ]
}";
        assert_eq!(format!("{:?}", dataset), expected_str);
    }

    #[test]
    fn test_try_new_rejects_length_mismatch() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let y = DVector::from_vec(vec![1.0]);
        let err = Dataset::try_new(x, y).unwrap_err();
        assert!(matches!(
            err,
            LearnerError::LengthMismatch {
                features: 2,
                labels: 1
            }
        ));
    }

    #[test]
    fn test_try_new_rejects_empty() {
        let x = DMatrix::<f64>::zeros(0, 3);
        let y = DVector::<f64>::zeros(0);
        assert!(matches!(
            Dataset::try_new(x, y).unwrap_err(),
            LearnerError::EmptyDataset
        ));
    }

    #[test]
    fn test_dataset_is_not_empty() {
        assert!(four_rows().is_not_empty());

        let empty = Dataset::new(DMatrix::zeros(0, 2), DVector::zeros(0));
        assert!(!empty.is_not_empty());
    }

    #[test]
    fn test_select_rows_keeps_order_and_repeats() {
        let dataset = four_rows();
        let picked = dataset.select_rows(&[3, 0, 3]);
        assert_eq!(picked.nrows(), 3);
        assert_eq!(picked.y.as_slice(), &[12.0, 9.0, 12.0]);
        assert_eq!(picked.x[(0, 1)], 8.0);
        assert_eq!(picked.x[(1, 0)], 1.0);
    }

    #[test]
    fn test_dataset_split_on_threshold() {
        let (left, right) = four_rows().split_on_threshold(0, 4.0);
        assert_eq!(left.nrows(), 2);
        assert_eq!(right.nrows(), 2);
        assert_eq!(left.y.as_slice(), &[9.0, 10.0]);
    }

    #[test]
    fn test_dataset_split_on_threshold_left_empty() {
        let (left, right) = four_rows().split_on_threshold(0, -1.0);
        assert_eq!(left.nrows(), 0);
        assert_eq!(left.ncols(), 2);
        assert_eq!(right.nrows(), 4);
    }

    #[test]
    fn test_dataset_split_on_threshold_right_empty() {
        let (left, right) = four_rows().split_on_threshold(0, 9.0);
        assert_eq!(left.nrows(), 4);
        assert_eq!(right.nrows(), 0);
    }

    #[test]
    fn test_bootstrap_keeps_size() {
        let dataset = four_rows();
        let mut rng = StdRng::seed_from_u64(7);
        let sample = dataset.bootstrap(&mut rng);
        assert_eq!(sample.nrows(), 4);
        assert_eq!(sample.ncols(), 2);
        for (row, label) in sample.y.iter().enumerate() {
            let original = dataset.y.iter().position(|v| v == label).unwrap();
            assert_eq!(sample.x[(row, 0)], dataset.x[(original, 0)]);
        }
    }

    #[test]
    fn test_bootstrap_indices_repeat_across_seeds() {
        let saw_duplicate = (0..20u64).any(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut indices = bootstrap_indices(10, &mut rng);
            indices.sort_unstable();
            indices.windows(2).any(|pair| pair[0] == pair[1])
        });
        assert!(saw_duplicate);
    }

    #[test]
    fn test_dataset_train_test_split() {
        let (train, test) = four_rows().train_test_split(0.75, Some(3)).unwrap();
        assert_eq!(train.nrows(), 3);
        assert_eq!(test.nrows(), 1);
    }

    #[test]
    fn test_train_test_split_rejects_bad_fraction() {
        assert!(four_rows().train_test_split(1.5, None).is_err());
    }
}
