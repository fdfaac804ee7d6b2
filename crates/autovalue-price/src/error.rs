//! Error types for price-model training and prediction.

use autovalue_forest::ForestError;
use autovalue_io::VehicleCategory;

/// Errors from schema resolution and model training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    /// Returned when the table lacks columns the category's schema needs.
    #[error("{category} table is missing schema features: {}", missing.join(", "))]
    MissingFeatures {
        /// Category whose schema was resolved.
        category: VehicleCategory,
        /// Schema feature names absent from the table.
        missing: Vec<String>,
    },

    /// Returned when fewer complete rows remain than the trainer requires.
    #[error("insufficient {category} data: {n_rows} complete rows, need at least {min_rows}")]
    InsufficientData {
        /// Category being trained.
        category: VehicleCategory,
        /// Rows left after dropping incomplete ones.
        n_rows: usize,
        /// Configured minimum.
        min_rows: usize,
    },

    /// Returned when a [`crate::PriceModelConfig`] setting is out of range.
    #[error("invalid price model config: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Returned when the random forest rejects the encoded dataset.
    #[error("random forest fit failed")]
    Fit {
        /// Underlying forest error.
        #[from]
        source: ForestError,
    },
}

/// Errors from prediction, comparable search and the estimator session.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    /// Returned when a categorical input was never seen during training.
    #[error("unknown {feature} \"{value}\": not present in the training data")]
    UnknownCategory {
        /// Schema feature name.
        feature: String,
        /// The unseen value.
        value: String,
    },

    /// Returned when no trained model is available.
    #[error("no trained model available")]
    ModelUnavailable,

    /// Returned when a required input is absent.
    #[error("missing input for {feature}")]
    MissingInput {
        /// Schema feature name.
        feature: String,
    },

    /// Returned when an input has the wrong kind for its feature.
    #[error("input for {feature} must be {expected}, got \"{got}\"")]
    MismatchedInput {
        /// Schema feature name.
        feature: String,
        /// Expected kind ("a number" or "text").
        expected: &'static str,
        /// The offending value as given.
        got: String,
    },

    /// Returned when the forest fails or yields a non-finite estimate.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the failure.
        reason: String,
    },
}
