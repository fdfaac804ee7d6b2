//! Bagged ensemble of regression trees, grown in parallel.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::ForestError;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{RegressionTree, RegressionTreeConfig};

/// A fitted Random Forest regressor; predictions average every tree.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<RegressionTree>,
    pub(crate) n_features: usize,
    pub(crate) feature_names: Vec<String>,
}

#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    targets: &[f64],
    feature_names: &[String],
) -> Result<RandomForestResult, ForestError> {
    let n_features = crate::validate_dataset(features, targets)?;
    let n_samples = features.len();

    let tree_config = RegressionTreeConfig::new()
        .with_max_depth(config.max_depth)
        .with_min_samples_leaf(config.min_samples_leaf);
    tree_config.check()?;

    info!(
        n_samples,
        n_features,
        max_depth = ?config.max_depth,
        min_samples_leaf = config.min_samples_leaf,
        "growing random forest"
    );

    // Seeds come from one sequential stream so results do not depend on thread count.
    let mut seeder = ChaCha8Rng::seed_from_u64(config.seed);
    let seeds: Vec<u64> = (0..config.n_trees).map(|_| seeder.r#gen()).collect();

    let trees = seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (bag_x, bag_y): (Vec<Vec<f64>>, Vec<f64>) = (0..n_samples)
                .map(|_| {
                    let row = rng.gen_range(0..n_samples);
                    (features[row].clone(), targets[row])
                })
                .unzip();
            tree_config.fit(&bag_x, &bag_y)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        total_nodes = trees.iter().map(RegressionTree::n_nodes).sum::<usize>(),
        "trees grown"
    );

    let forest = RandomForest {
        trees,
        n_features,
        feature_names: feature_names.to_vec(),
    };
    Ok(RandomForestResult::new(
        forest,
        TrainingMetadata {
            n_trees: config.n_trees,
            n_features,
            n_samples,
        },
    ))
}

#[cfg(test)]
mod tests {
    use crate::ForestError;
    use crate::config::RandomForestConfig;

    /// Price set by an age band, plus a small mileage-driven wobble.
    fn age_banded_prices() -> (Vec<Vec<f64>>, Vec<f64>, Vec<String>) {
        let (features, targets): (Vec<Vec<f64>>, Vec<f64>) = (0..60)
            .map(|i| {
                let age = f64::from(i) * 0.25;
                let mileage = f64::from(i % 7) * 10_000.0;
                let band = match age {
                    a if a < 5.0 => 90_000.0,
                    a if a < 10.0 => 55_000.0,
                    _ => 20_000.0,
                };
                (vec![age, mileage], band - mileage * 0.01)
            })
            .unzip();
        (features, targets, vec!["age".into(), "mileage".into()])
    }

    fn fit(config: RandomForestConfig) -> Result<crate::RandomForestResult, ForestError> {
        let (features, targets, names) = age_banded_prices();
        config.fit(&features, &targets, &names)
    }

    #[test]
    fn recovers_price_bands() {
        let (features, targets, _) = age_banded_prices();
        let result = fit(RandomForestConfig::new(50).unwrap()).unwrap();
        let r2 = result.forest().score(&features, &targets).unwrap();
        assert!(r2 > 0.95, "r2 = {r2}");
    }

    #[test]
    fn age_dominates_importance() {
        let result = fit(RandomForestConfig::new(20).unwrap()).unwrap();
        let total: f64 = result.importances().iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
        assert_eq!(result.importances()[0].name, "age");
    }

    #[test]
    fn same_seed_same_forest() {
        let (features, _, _) = age_banded_prices();
        let predict = || {
            fit(RandomForestConfig::new(10).unwrap().with_seed(99))
                .unwrap()
                .forest()
                .predict_batch(&features)
                .unwrap()
        };
        assert_eq!(predict(), predict());
    }

    #[test]
    fn metadata_records_training_shape() {
        let meta = fit(RandomForestConfig::new(4).unwrap()).unwrap().metadata();
        assert_eq!((meta.n_trees, meta.n_features, meta.n_samples), (4, 2, 60));
    }

    #[test]
    fn tree_limits_reach_every_tree() {
        let result = fit(
            RandomForestConfig::new(8)
                .unwrap()
                .with_max_depth(Some(2))
                .with_min_samples_leaf(5),
        )
        .unwrap();
        for tree in result.forest().trees() {
            assert!(tree.depth() <= 2, "depth = {}", tree.depth());
            assert!(tree.n_leaves() <= 4);
        }
    }

    #[test]
    fn batch_and_single_predictions_agree() {
        let (features, _, _) = age_banded_prices();
        let result = fit(RandomForestConfig::new(10).unwrap()).unwrap();
        let batch = result.forest().predict_batch(&features).unwrap();
        for (row, expected) in features.iter().zip(batch) {
            assert_eq!(result.forest().predict(row).unwrap(), expected);
        }
    }

    #[test]
    fn invalid_settings_are_reported() {
        assert!(matches!(
            RandomForestConfig::new(10).unwrap().fit(&[], &[], &[]),
            Err(ForestError::EmptyDataset)
        ));
        assert!(matches!(
            fit(RandomForestConfig::new(5).unwrap().with_min_samples_leaf(0)),
            Err(ForestError::InvalidMinSamplesLeaf { min_samples_leaf: 0 })
        ));
        assert!(matches!(
            fit(RandomForestConfig::new(5).unwrap().with_max_depth(Some(0))),
            Err(ForestError::InvalidMaxDepth { .. })
        ));
    }
}
