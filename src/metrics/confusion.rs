use nalgebra::{DMatrix, DVector};

use crate::error::LearnerError;

/// Rows are true classes, columns predicted classes, both in ascending order.
pub type ConfusionMatrix = DMatrix<usize>;

pub trait ClassificationMetrics {
    /// Sorted, de-duplicated union of the labels in `y_true` and `y_pred`.
    fn classes(&self, y_true: &DVector<f64>, y_pred: &DVector<f64>) -> Vec<f64> {
        let mut classes: Vec<f64> = y_true.iter().chain(y_pred.iter()).copied().collect();
        classes.sort_by(f64::total_cmp);
        classes.dedup();
        classes
    }

    /// Computes the confusion matrix over [`ClassificationMetrics::classes`].
    ///
    /// # Errors
    ///
    /// Fails when the vectors differ in length or are empty.
    fn confusion_matrix(
        &self,
        y_true: &DVector<f64>,
        y_pred: &DVector<f64>,
    ) -> Result<ConfusionMatrix, LearnerError> {
        if y_true.len() != y_pred.len() {
            return Err(LearnerError::LengthMismatch {
                features: y_pred.len(),
                labels: y_true.len(),
            });
        }
        if y_true.is_empty() {
            return Err(LearnerError::EmptyDataset);
        }

        let classes = self.classes(y_true, y_pred);
        let position = |value: f64| {
            classes
                .binary_search_by(|c| c.total_cmp(&value))
                .unwrap_or_default()
        };

        let mut matrix = DMatrix::zeros(classes.len(), classes.len());
        for (&y_t, &y_p) in y_true.iter().zip(y_pred.iter()) {
            matrix[(position(y_t), position(y_p))] += 1;
        }
        Ok(matrix)
    }

    /// Fraction of predictions that equal the true label.
    fn accuracy(&self, y_true: &DVector<f64>, y_pred: &DVector<f64>) -> Result<f64, LearnerError> {
        let matrix = self.confusion_matrix(y_true, y_pred)?;
        let correct: usize = matrix.diagonal().iter().sum();
        Ok(correct as f64 / y_true.len() as f64)
    }
}
