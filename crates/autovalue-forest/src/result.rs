//! What a call to `fit` hands back.

use crate::forest::RandomForest;
use crate::importance::RankedFeature;

/// Shape of the data a forest was fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingMetadata {
    pub n_trees: usize,
    pub n_features: usize,
    pub n_samples: usize,
}

/// A fitted forest together with its importance ranking.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    importances: Vec<RankedFeature>,
    metadata: TrainingMetadata,
}

impl RandomForestResult {
    pub(crate) fn new(forest: RandomForest, metadata: TrainingMetadata) -> Self {
        let importances = forest.feature_importances();
        Self {
            forest,
            importances,
            metadata,
        }
    }

    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Split into the forest and its ranking, dropping the metadata.
    #[must_use]
    pub fn into_parts(self) -> (RandomForest, Vec<RankedFeature>) {
        (self.forest, self.importances)
    }

    /// Most important feature first.
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    #[must_use]
    pub fn metadata(&self) -> TrainingMetadata {
        self.metadata
    }
}
