/// Everything that can go wrong while fitting or querying a forest.
///
/// Configuration variants carry the offending value; data variants carry
/// the zero-based row (and column) where validation stopped.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    #[error("a forest needs at least one tree (n_trees = {n_trees})")]
    InvalidTreeCount { n_trees: usize },

    #[error("max_depth of {max_depth} leaves no room for a split")]
    InvalidMaxDepth { max_depth: usize },

    #[error("min_samples_leaf = {min_samples_leaf} is below the minimum of 1")]
    InvalidMinSamplesLeaf { min_samples_leaf: usize },

    #[error("no training rows")]
    EmptyDataset,

    #[error("training rows have no columns")]
    ZeroFeatures,

    #[error("row {sample_index} is {got} columns wide instead of {expected}")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        sample_index: usize,
    },

    #[error("{n_samples} rows but {n_targets} targets")]
    TargetCountMismatch { n_samples: usize, n_targets: usize },

    /// A query row does not match the width the forest was fitted on.
    #[error("query row is {got} columns wide, forest expects {expected}")]
    PredictionFeatureMismatch { expected: usize, got: usize },

    #[error("row {sample_index} column {feature_index} is NaN or infinite")]
    NonFiniteValue {
        sample_index: usize,
        feature_index: usize,
    },

    #[error("target of row {sample_index} is NaN or infinite")]
    NonFiniteTarget { sample_index: usize },
}
