use nalgebra::{DMatrix, DVector};

use crate::data::dataset::Dataset;
use crate::error::LearnerError;

/// Capability shared by every model in the crate, and the seam the bagging
/// ensemble is generic over.
pub trait Learner: Send + Sync {
    /// Trains on `dataset`, replacing any earlier model.
    fn fit(&mut self, dataset: &Dataset) -> Result<(), LearnerError>;

    /// One prediction per row of `features`, in row order.
    fn predict(&self, features: &DMatrix<f64>) -> Result<DVector<f64>, LearnerError>;

    fn is_trained(&self) -> bool;

    /// Checks internal consistency of a model that did not come from `fit`,
    /// such as one decoded from bytes.
    fn validate(&self) -> Result<(), LearnerError> {
        Ok(())
    }
}
