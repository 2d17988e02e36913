use std::path::PathBuf;

/// Errors from decision tree training, inference and persistence.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when min_samples_split is less than 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid min_samples_split value provided.
        min_samples_split: usize,
    },

    /// Returned when max_features is zero.
    #[error("max_features must be at least 1, got {max_features}")]
    InvalidMaxFeatures {
        /// The invalid max_features value provided.
        max_features: usize,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when the number of labels differs from the number of samples.
    #[error("got {got} labels for {expected} samples")]
    LabelCountMismatch {
        /// The number of samples.
        expected: usize,
        /// The number of labels provided.
        got: usize,
    },

    /// Returned when a row of a label matrix has the wrong number of columns.
    #[error("label row {row_index} has {got} columns, expected {expected}")]
    LabelColumnMismatch {
        /// The expected number of label columns.
        expected: usize,
        /// The actual number of columns in the row.
        got: usize,
        /// The zero-based index of the offending row.
        row_index: usize,
    },

    /// Returned when a label matrix has zero columns.
    #[error("label matrix has zero columns")]
    ZeroLabelColumns,

    /// Returned when tree growth reaches a node with no samples.
    ///
    /// The stopping rule never produces an empty partition, so this signals
    /// a broken invariant rather than bad input.
    #[error("tree growth reached an empty partition at depth {depth}")]
    EmptyPartition {
        /// Depth of the offending node.
        depth: usize,
    },

    /// Returned when predicting with a model that has not been fitted.
    #[error("model not ready: fit must succeed before prediction")]
    NotFitted,

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path to the model file that could not be deserialized.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the file.
        found: u32,
        /// Path to the model file with the incompatible version.
        path: PathBuf,
    },

    /// Returned when a file holds a different kind of model than requested.
    #[error("{path} holds a {found} model, expected a {expected} model")]
    ModelKindMismatch {
        /// The kind the caller asked for.
        expected: &'static str,
        /// The kind recorded in the file.
        found: String,
        /// Path to the model file.
        path: PathBuf,
    },
}
