/// Bagging ensemble
pub mod bag_learner;
/// Ensemble hyperparameters
pub mod params;
