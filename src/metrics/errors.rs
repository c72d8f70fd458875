use nalgebra::DVector;

use crate::data::stats;
use crate::error::LearnerError;

fn check_lengths(y_true: &DVector<f64>, y_pred: &DVector<f64>) -> Result<(), LearnerError> {
    if y_true.len() != y_pred.len() {
        return Err(LearnerError::LengthMismatch {
            features: y_pred.len(),
            labels: y_true.len(),
        });
    }
    if y_true.is_empty() {
        return Err(LearnerError::EmptyDataset);
    }
    Ok(())
}

pub trait RegressionMetrics {
    /// Root mean squared error.
    fn rmse(&self, y_true: &DVector<f64>, y_pred: &DVector<f64>) -> Result<f64, LearnerError> {
        check_lengths(y_true, y_pred)?;
        let errors = y_pred - y_true;
        Ok((errors.component_mul(&errors).sum() / y_true.len() as f64).sqrt())
    }

    fn mae(&self, y_true: &DVector<f64>, y_pred: &DVector<f64>) -> Result<f64, LearnerError> {
        check_lengths(y_true, y_pred)?;
        let abs_errors_sum = y_pred
            .iter()
            .zip(y_true.iter())
            .map(|(&y_p, &y_t)| (y_p - y_t).abs())
            .sum::<f64>();
        Ok(abs_errors_sum / y_true.len() as f64)
    }

    /// Pearson correlation between truth and predictions; `NaN` when either
    /// side is constant.
    fn correlation(
        &self,
        y_true: &DVector<f64>,
        y_pred: &DVector<f64>,
    ) -> Result<f64, LearnerError> {
        check_lengths(y_true, y_pred)?;
        Ok(stats::pearson(y_true.as_slice(), y_pred.as_slice()).unwrap_or(f64::NAN))
    }
}
