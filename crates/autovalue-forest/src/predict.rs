//! Querying a fitted forest.

use rayon::prelude::*;

use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::metrics::r2_score;
use crate::tree::RegressionTree;

impl RandomForest {
    /// Average of the per-tree predictions for one row.
    ///
    /// # Errors
    ///
    /// [`ForestError::PredictionFeatureMismatch`] if the row has the wrong width.
    pub fn predict(&self, sample: &[f64]) -> Result<f64, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let sum = self
            .trees
            .iter()
            .map(|tree| tree.predict(sample))
            .sum::<Result<f64, _>>()?;
        Ok(sum / self.trees.len() as f64)
    }

    /// [`RandomForest::predict`] over many rows, in parallel and in input order.
    ///
    /// # Errors
    ///
    /// The first width mismatch encountered.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ForestError> {
        features.par_iter().map(|row| self.predict(row)).collect()
    }

    /// R² of the forest's predictions against `targets`.
    ///
    /// # Errors
    ///
    /// Width mismatches from prediction, or the errors of [`r2_score`].
    pub fn score(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<f64, ForestError> {
        r2_score(targets, &self.predict_batch(features)?)
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Column names in training order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}
