//! Error types for airsense-model.

use airsense_data::DataError;
use airsense_tree::TreeError;

/// Errors from training, assessing and persisting the air-quality model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A tree failed to fit, predict, save or load.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Input data could not be generated, scaled, split or read.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Returned when assembling a bundle from a model that was never fitted.
    #[error("{component} is not fitted")]
    UnfittedComponent {
        /// Which part of the bundle is missing its fit.
        component: &'static str,
    },

    /// Returned when the bundle's parts disagree on feature width.
    #[error("{component} expects {got} features, the scaler produces {expected}")]
    ComponentWidthMismatch {
        /// Which part of the bundle disagrees.
        component: &'static str,
        /// Width produced by the scaler.
        expected: usize,
        /// Width the component was trained on.
        got: usize,
    },

    /// Returned when true tiers and predictions differ in length.
    #[error("evaluation got {got} predictions for {expected} readings")]
    EvaluationLengthMismatch {
        /// Number of true tiers.
        expected: usize,
        /// Number of predictions.
        got: usize,
    },

    /// Returned when the diagnostics model does not predict one flag per sensor.
    #[error("diagnostics model predicts {got} flags, expected {expected}")]
    FlagColumnMismatch {
        /// Number of sensors.
        expected: usize,
        /// Number of label columns the model was trained on.
        got: usize,
    },
}
