//! Random Forest regression: train, score, predict.
//!
//! A hand-rolled Random Forest regressor built from CART trees with a
//! squared-error criterion, bootstrap sampling, parallel training via rayon,
//! mean-decrease-in-impurity feature importance and R² scoring.

mod config;
mod error;
mod forest;
mod importance;
mod metrics;
mod node;
mod predict;
mod result;
mod split;
mod tree;

pub use config::RandomForestConfig;
pub use error::ForestError;
pub use forest::RandomForest;
pub use importance::RankedFeature;
pub use metrics::r2_score;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use result::{RandomForestResult, TrainingMetadata};
pub use tree::{RegressionTree, RegressionTreeConfig};

/// Validate a row-major dataset and its targets, returning the feature count.
pub(crate) fn validate_dataset(features: &[Vec<f64>], targets: &[f64]) -> Result<usize, ForestError> {
    if features.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    if targets.len() != features.len() {
        return Err(ForestError::TargetCountMismatch {
            n_samples: features.len(),
            n_targets: targets.len(),
        });
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    for (sample_index, (row, &target)) in features.iter().zip(targets).enumerate() {
        if row.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ForestError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
        if !target.is_finite() {
            return Err(ForestError::NonFiniteTarget { sample_index });
        }
    }
    Ok(n_features)
}
