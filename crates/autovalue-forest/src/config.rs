//! Hyperparameters of the Random Forest regressor.

use crate::error::ForestError;
use crate::result::RandomForestResult;

/// Builder for a Random Forest fit.
///
/// Only the tree count is mandatory. Each tree is grown on a bootstrap
/// sample as large as the training set and considers every column at
/// every split. By default trees grow until their leaves are pure
/// (`max_depth` unlimited, `min_samples_leaf` 1) from seed 42.
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_leaf: usize,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// # Errors
    ///
    /// [`ForestError::InvalidTreeCount`] when `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        match n_trees {
            0 => Err(ForestError::InvalidTreeCount { n_trees }),
            n_trees => Ok(Self {
                n_trees,
                max_depth: None,
                min_samples_leaf: 1,
                seed: 42,
            }),
        }
    }

    /// `None` grows each tree until its leaves are pure or too small.
    #[must_use]
    pub fn with_max_depth(self, max_depth: Option<usize>) -> Self {
        Self { max_depth, ..self }
    }

    /// Smallest number of training rows either side of a split may keep.
    #[must_use]
    pub fn with_min_samples_leaf(self, min_samples_leaf: usize) -> Self {
        Self {
            min_samples_leaf,
            ..self
        }
    }

    /// Seed of the master RNG; per-tree seeds are derived from it.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fit a forest on row-major `features`, one target and one name per row
    /// and column respectively.
    ///
    /// # Errors
    ///
    /// | Variant                                 | When                          |
    /// |-----------------------------------------|-------------------------------|
    /// | [`ForestError::EmptyDataset`]           | no rows                       |
    /// | [`ForestError::ZeroFeatures`]           | rows without columns          |
    /// | [`ForestError::TargetCountMismatch`]    | row and target counts differ  |
    /// | [`ForestError::FeatureCountMismatch`]   | ragged rows                   |
    /// | [`ForestError::NonFiniteValue`]         | NaN or infinite feature       |
    /// | [`ForestError::NonFiniteTarget`]        | NaN or infinite target        |
    /// | [`ForestError::InvalidMaxDepth`]        | `max_depth` is `Some(0)`      |
    /// | [`ForestError::InvalidMinSamplesLeaf`]  | `min_samples_leaf` is 0       |
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        feature_names: &[String],
    ) -> Result<RandomForestResult, ForestError> {
        crate::forest::train(self, features, targets, feature_names)
    }
}
