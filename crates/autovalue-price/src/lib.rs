//! Used-vehicle price modelling: feature schemas, categorical encoding,
//! Random Forest training, banded prediction, comparable listings and
//! feature importance.
//!
//! Every training call builds a self-contained [`TrainedModel`] (forest,
//! encoders and schema) from a [`ListingTable`](autovalue_io::ListingTable);
//! nothing is shared between calls.

mod comparables;
mod encoder;
mod error;
mod estimator;
mod importance;
mod inputs;
mod predictor;
mod schema;
mod trainer;

#[cfg(test)]
mod testutil;

pub use comparables::{find_comparables, ComparableWindow};
pub use encoder::{EncoderSet, EncoderTable};
pub use error::{PredictionError, TrainingError};
pub use estimator::PriceEstimator;
pub use importance::{feature_importance, FeatureScore};
pub use inputs::{FeatureValue, PredictionInputs};
pub use predictor::{predict, PredictionResult, BAND_FRACTION};
pub use schema::{Feature, FeatureKind, FeatureSchema};
pub use trainer::{
    train, PriceModelConfig, TrainedModel, TrainingOutcome, TrainingReport, MIN_TRAINING_ROWS,
};
