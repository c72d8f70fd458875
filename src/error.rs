use std::path::PathBuf;

/// Broad category of a [`LearnerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Training data or hyperparameters are malformed.
    InvalidInput,
    /// A query point does not fit the trained model.
    OutOfRange,
    /// The model was queried before it was trained.
    NotTrained,
    /// Saving or loading a model failed.
    Persistence,
}

/// Errors from building, querying and persisting learners.
#[derive(Debug, thiserror::Error)]
pub enum LearnerError {
    /// Returned when the training dataset has zero rows.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when features and labels disagree on the row count.
    #[error("feature matrix has {features} rows but label vector has {labels}")]
    LengthMismatch {
        /// Row count of the feature matrix.
        features: usize,
        /// Length of the label vector.
        labels: usize,
    },

    /// Returned when leaf_size is zero.
    #[error("leaf_size must be at least 1, got {leaf_size}")]
    InvalidLeafSize {
        /// The invalid leaf_size value provided.
        leaf_size: usize,
    },

    /// Returned when bag_count is zero.
    #[error("bag_count must be at least 1, got {bag_count}")]
    InvalidBagCount {
        /// The invalid bag_count value provided.
        bag_count: usize,
    },

    /// Returned when a parameter outside the learners is out of its domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Returned when a query point has a different number of features than
    /// the model was trained on.
    #[error("query point has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// Feature count seen at training time.
        expected: usize,
        /// Feature count of the query point.
        got: usize,
    },

    /// Returned when a model is queried before training.
    #[error("model has not been trained")]
    NotTrained,

    /// Returned when a node sequence breaks the pre-order layout.
    #[error("corrupt node layout at index {index}: {reason}")]
    CorruptTree {
        /// Index of the offending node.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Returned when bincode encoding fails.
    #[error("failed to encode model")]
    SerializeModel {
        /// The underlying bincode error.
        #[source]
        source: bincode::Error,
    },

    /// Returned when bincode decoding fails.
    #[error("failed to decode model")]
    DeserializeModel {
        /// The underlying bincode error.
        #[source]
        source: bincode::Error,
    },

    /// Returned when the model file cannot be written.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Returned when the model file cannot be read.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Source path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Returned when a stored model was written by an incompatible version.
    #[error("model format version {found} is not supported, expected {expected}")]
    IncompatibleModelVersion {
        /// The version this build understands.
        expected: u32,
        /// The version found in the envelope.
        found: u32,
    },
}

impl LearnerError {
    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            LearnerError::EmptyDataset
            | LearnerError::ZeroFeatures
            | LearnerError::LengthMismatch { .. }
            | LearnerError::InvalidLeafSize { .. }
            | LearnerError::InvalidBagCount { .. }
            | LearnerError::InvalidParameter { .. } => ErrorKind::InvalidInput,
            LearnerError::FeatureCountMismatch { .. } => ErrorKind::OutOfRange,
            LearnerError::NotTrained => ErrorKind::NotTrained,
            LearnerError::CorruptTree { .. }
            | LearnerError::SerializeModel { .. }
            | LearnerError::DeserializeModel { .. }
            | LearnerError::WriteModel { .. }
            | LearnerError::ReadModel { .. }
            | LearnerError::IncompatibleModelVersion { .. } => ErrorKind::Persistence,
        }
    }
}
