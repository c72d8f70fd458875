use serde::{Deserialize, Serialize};

use crate::error::LearnerError;
use crate::trees::params::Aggregation;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BagParams {
    bag_count: usize,
    aggregation: Aggregation,
    seed: Option<u64>,
    bootstrap: bool,
}

impl Default for BagParams {
    fn default() -> Self {
        Self::new()
    }
}

impl BagParams {
    pub fn new() -> Self {
        Self {
            bag_count: 20,
            aggregation: Aggregation::Mean,
            seed: None,
            bootstrap: true,
        }
    }

    pub fn with_params(
        bag_count: usize,
        aggregation: Aggregation,
        seed: Option<u64>,
    ) -> Result<Self, LearnerError> {
        let mut params = Self::new();
        params.set_bag_count(bag_count)?;
        params.set_aggregation(aggregation);
        params.set_seed(seed);
        Ok(params)
    }

    pub fn set_bag_count(&mut self, bag_count: usize) -> Result<(), LearnerError> {
        if bag_count < 1 {
            return Err(LearnerError::InvalidBagCount { bag_count });
        }
        self.bag_count = bag_count;
        Ok(())
    }

    pub fn set_aggregation(&mut self, aggregation: Aggregation) {
        self.aggregation = aggregation;
    }

    /// Seed for member construction and bootstrap draws; `None` uses system
    /// entropy.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Whether each member trains on a bootstrap resample. When off, every
    /// member trains on the full dataset and the bag only aggregates.
    pub fn set_bootstrap(&mut self, bootstrap: bool) {
        self.bootstrap = bootstrap;
    }

    pub fn bag_count(&self) -> usize {
        self.bag_count
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }
}
