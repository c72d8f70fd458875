use serde::{Deserialize, Serialize};

use crate::data::stats;
use crate::error::LearnerError;

/// How several label values collapse into one prediction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Arithmetic mean, for regression.
    #[default]
    Mean,
    /// Most frequent value, smallest among ties, for classification.
    Mode,
}

impl Aggregation {
    pub fn reduce(self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Mean => stats::mean(values),
            Aggregation::Mode => stats::mode(values),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    leaf_size: usize,
    aggregation: Aggregation,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            leaf_size: 1,
            aggregation: Aggregation::Mean,
        }
    }

    pub fn with_params(leaf_size: usize, aggregation: Aggregation) -> Result<Self, LearnerError> {
        let mut params = Self::new();
        params.set_leaf_size(leaf_size)?;
        params.set_aggregation(aggregation);
        Ok(params)
    }

    pub fn set_leaf_size(&mut self, leaf_size: usize) -> Result<(), LearnerError> {
        if leaf_size < 1 {
            return Err(LearnerError::InvalidLeafSize { leaf_size });
        }
        self.leaf_size = leaf_size;
        Ok(())
    }

    pub fn set_aggregation(&mut self, aggregation: Aggregation) {
        self.aggregation = aggregation;
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }
}
