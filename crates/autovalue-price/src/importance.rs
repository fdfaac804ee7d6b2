//! Ranked feature importance of a trained price model.

use autovalue_forest::RandomForest;
use serde::Serialize;

use crate::schema::{Feature, FeatureSchema};

/// One schema feature with its normalized importance and 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureScore {
    pub feature: Feature,
    pub importance: f64,
    pub rank: usize,
}

/// Pair the forest's mean-decrease-in-impurity importances with the schema
/// features, most important first.
pub fn feature_importance(forest: &RandomForest, schema: &FeatureSchema) -> Vec<FeatureScore> {
    forest
        .feature_importances()
        .into_iter()
        .filter_map(|ranked| {
            schema
                .features()
                .iter()
                .find(|f| f.name() == ranked.name)
                .map(|&feature| FeatureScore {
                    feature,
                    importance: ranked.importance,
                    rank: ranked.rank,
                })
        })
        .collect()
}
