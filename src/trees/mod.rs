/// Decision tree build and query
pub mod decision_tree;
/// Flat pre-order node layout
pub mod node;
/// Tree hyperparameters and leaf aggregation
pub mod params;
/// Split selection strategies
pub mod split;
