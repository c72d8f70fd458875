/// Feature/label container and row selection
pub mod dataset;
/// Mean, median, correlation and mode
pub mod stats;
