//! # Rusty-trees
//!
//! `rusty-trees` provides decision tree learners and a bagging ensemble for turning
//! price and indicator features into buy/sell/hold predictions.
//!
//! Trees are stored as flat pre-order node sequences, split either on the feature
//! most correlated with the labels or on a randomly drawn feature, and always at
//! that feature's median. The bagging ensemble trains any learner on bootstrap
//! resamples and combines the members by mean or by majority vote.
//!
//! ## Getting Started
//!
//! To use `rusty-trees`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! rusty-trees = "*"
//! ```
//!
//! ## Example Usage
//!
//! As a quick example, here's how you can train a bag of random trees as a classifier:
//!
//! ```rust
//!
//! use rusty_trees::bagging::{bag_learner::BagLearner, params::BagParams};
//! use rusty_trees::data::dataset::Dataset;
//! use rusty_trees::trees::params::{Aggregation, TreeParams};
//! use nalgebra::{DMatrix, DVector};
//!
//! let x = DMatrix::from_row_slice(6, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! let y = DVector::from_vec(vec![-1.0, -1.0, -1.0, 1.0, 1.0, 1.0]);
//!
//! let dataset = Dataset::try_new(x, y).unwrap();
//!
//! let tree_params = TreeParams::with_params(1, Aggregation::Mode).unwrap();
//! let bag_params = BagParams::with_params(10, Aggregation::Mode, Some(42)).unwrap();
//! let mut model = BagLearner::random_trees(bag_params, tree_params).unwrap();
//!
//! model.fit(&dataset).unwrap();
//!
//! let test_x = DMatrix::from_row_slice(2, 1, &[0.0, 10.0]);
//!
//! let predictions = model.predict(&test_x).unwrap();
//! assert_eq!(predictions.len(), 2);
//! ```

use rand::{rngs::StdRng, SeedableRng};

/// Bootstrap aggregation
pub mod bagging;
/// Dataset and data manipulation utilities
pub mod data;
/// Error type shared by all learners
pub mod error;
/// Common learner interface
pub mod learner;
/// Functions for evaluating model performance
pub mod metrics;
/// Saving and loading trained models
pub mod persist;
/// Trading signals derived from predictions
pub mod strategy;
/// Decision trees
pub mod trees;

pub use error::{ErrorKind, LearnerError};
pub use learner::Learner;
pub use persist::Persist;

/// Generator seeded from `seed`, or from system entropy when `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
