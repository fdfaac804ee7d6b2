//! Host-owned price estimation session for one category and listing table.

use autovalue_io::{ListingTable, VehicleCategory};
use tracing::warn;

use crate::error::{PredictionError, TrainingError};
use crate::importance::FeatureScore;
use crate::inputs::PredictionInputs;
use crate::predictor::PredictionResult;
use crate::trainer::{train, PriceModelConfig, TrainedModel, TrainingOutcome};

/// Holds the most recent trained model for one vehicle category.
///
/// A failed [`PriceEstimator::train`] clears the previous model, so
/// predictions never come from a model built on different data.
#[derive(Debug)]
pub struct PriceEstimator {
    category: VehicleCategory,
    config: PriceModelConfig,
    outcome: Option<TrainingOutcome>,
}

impl PriceEstimator {
    pub fn new(category: VehicleCategory, config: PriceModelConfig) -> Self {
        Self {
            category,
            config,
            outcome: None,
        }
    }

    #[must_use]
    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    /// Train on `table`, replacing any previous model.
    ///
    /// # Errors
    ///
    /// Any [`TrainingError`] from [`train`]; the session is left untrained.
    pub fn train(&mut self, table: &ListingTable) -> Result<&TrainingOutcome, TrainingError> {
        self.outcome = None;
        match train(self.category, table, &self.config) {
            Ok(outcome) => Ok(&*self.outcome.insert(outcome)),
            Err(e) => {
                warn!(category = %self.category, error = %e, "price model unavailable");
                Err(e)
            }
        }
    }

    /// Return the latest training outcome, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<&TrainingOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.outcome.is_some()
    }

    /// Return the trained model.
    ///
    /// # Errors
    ///
    /// [`PredictionError::ModelUnavailable`] if no model has been trained.
    pub fn model(&self) -> Result<&TrainedModel, PredictionError> {
        self.outcome
            .as_ref()
            .map(|o| &o.model)
            .ok_or(PredictionError::ModelUnavailable)
    }

    /// Predict a price with the trained model.
    ///
    /// # Errors
    ///
    /// [`PredictionError::ModelUnavailable`] if untrained, otherwise any
    /// error from [`crate::predict`].
    pub fn predict(&self, inputs: &PredictionInputs) -> Result<PredictionResult, PredictionError> {
        self.model()?.predict(inputs)
    }

    /// Ranked feature importances of the trained model.
    ///
    /// # Errors
    ///
    /// [`PredictionError::ModelUnavailable`] if untrained.
    pub fn feature_importance(&self) -> Result<Vec<FeatureScore>, PredictionError> {
        Ok(self.model()?.feature_importance())
    }
}
