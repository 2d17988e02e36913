//! Error types for airsense-data.

use std::path::PathBuf;

/// Errors from reading sensor files, scaling features and splitting data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the header lacks one of the sensor columns.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Key of the missing sensor column.
        column: &'static str,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {column}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Key of the sensor column.
        column: &'static str,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a reading or feature row carries a NaN or infinite value.
    #[error("non-finite {sensor} value {value} in sample {sample_index}")]
    NonFiniteReading {
        /// Zero-based index of the offending sample.
        sample_index: usize,
        /// Key of the sensor column.
        sensor: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Returned when a feature row does not have one value per sensor.
    #[error("expected {expected} sensor values, got {got}")]
    ReadingWidth {
        /// Number of sensors.
        expected: usize,
        /// Number of values provided.
        got: usize,
    },

    /// Returned when fitting a scaler on zero rows.
    #[error("cannot fit a scaler on zero samples")]
    EmptyScalerInput,

    /// Returned when a row's width differs from the width the scaler was fitted on.
    #[error("sample {sample_index} has {got} features, scaler was fitted on {expected}")]
    ScalerFeatureMismatch {
        /// Width the scaler was fitted on.
        expected: usize,
        /// Width of the offending row.
        got: usize,
        /// Zero-based index of the offending row.
        sample_index: usize,
    },

    /// Returned when a scaler input value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteFeature {
        /// Zero-based index of the offending sample.
        sample_index: usize,
        /// Zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a train/test split is requested with an unusable fraction.
    #[error("test fraction must be strictly between 0 and 1, got {test_fraction}")]
    InvalidTestFraction {
        /// The fraction provided.
        test_fraction: f64,
    },

    /// Returned when a split would leave the train or test side empty.
    #[error("cannot split {n_samples} samples into non-empty train and test sets")]
    TooFewSamples {
        /// Number of samples offered.
        n_samples: usize,
    },

    /// Returned when a label value is not a valid tier or flag.
    #[error("invalid label {label} for {target}")]
    InvalidLabel {
        /// What the label was meant to encode.
        target: &'static str,
        /// The offending value.
        label: usize,
    },
}
