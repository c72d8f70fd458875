/// Accuracy and confusion matrices for class labels
pub mod confusion;
/// Error and correlation measures for real-valued predictions
pub mod errors;
