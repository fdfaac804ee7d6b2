//! Price model training: clean, encode, split, fit, score.

use std::collections::BTreeMap;

use autovalue_forest::{RandomForest, RandomForestConfig};
use autovalue_io::{ListingTable, VehicleCategory};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::encoder::{EncoderSet, EncoderTable};
use crate::error::{PredictionError, TrainingError};
use crate::importance::{feature_importance, FeatureScore};
use crate::inputs::{FeatureValue, PredictionInputs};
use crate::predictor::{predict, PredictionResult};
use crate::schema::{FeatureKind, FeatureSchema};

/// Fewest complete rows a model may be trained on.
pub const MIN_TRAINING_ROWS: usize = 100;

/// Configuration for price model training.
///
/// Construct via [`PriceModelConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `n_trees`       | 100     |
/// | `seed`          | 42      |
/// | `test_fraction` | 0.2     |
/// | `min_rows`      | 100     |
/// | `max_depth`     | none    |
/// | `min_samples_leaf` | 1    |
#[derive(Debug, Clone)]
pub struct PriceModelConfig {
    n_trees: usize,
    seed: u64,
    test_fraction: f64,
    min_rows: usize,
    max_depth: Option<usize>,
    min_samples_leaf: usize,
}

impl Default for PriceModelConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            test_fraction: 0.2,
            min_rows: MIN_TRAINING_ROWS,
            max_depth: None,
            min_samples_leaf: 1,
        }
    }
}

impl PriceModelConfig {
    /// Create a config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, TrainingError> {
        if n_trees == 0 {
            return Err(TrainingError::InvalidConfig {
                reason: "n_trees must be at least 1".to_string(),
            });
        }
        Ok(Self {
            n_trees,
            ..Self::default()
        })
    }

    /// Set the seed for the train/test shuffle and the forest.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the share of rows held out for evaluation; must lie in (0, 1).
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Set the minimum number of complete rows; must be at least 2.
    #[must_use]
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Cap every tree at `max_depth` levels; `None` grows them fully.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the fewest training rows a leaf may hold; must be at least 1.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    #[must_use]
    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    fn validate(&self) -> Result<(), TrainingError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(TrainingError::InvalidConfig {
                reason: format!("test_fraction must be in (0, 1), got {}", self.test_fraction),
            });
        }
        if self.min_rows < 2 {
            return Err(TrainingError::InvalidConfig {
                reason: format!("min_rows must be at least 2, got {}", self.min_rows),
            });
        }
        if self.max_depth == Some(0) {
            return Err(TrainingError::InvalidConfig {
                reason: "max_depth must be at least 1".to_string(),
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainingError::InvalidConfig {
                reason: "min_samples_leaf must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// A fitted forest bundled with the encoders and schema it was trained with.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    forest: RandomForest,
    encoders: EncoderSet,
    schema: FeatureSchema,
}

impl TrainedModel {
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    #[must_use]
    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn category(&self) -> VehicleCategory {
        self.schema.category()
    }

    /// Predict a price for `inputs`. See [`predict`].
    ///
    /// # Errors
    ///
    /// Any [`PredictionError`] raised by [`predict`].
    pub fn predict(&self, inputs: &PredictionInputs) -> Result<PredictionResult, PredictionError> {
        predict(&self.forest, &self.encoders, &self.schema, inputs)
    }

    /// Ranked feature importances of the forest.
    #[must_use]
    pub fn feature_importance(&self) -> Vec<FeatureScore> {
        feature_importance(&self.forest, &self.schema)
    }
}

/// A trained model with its goodness-of-fit on both partitions.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    /// R² on the training partition.
    pub train_score: f64,
    /// R² on the held-out partition.
    pub test_score: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// Serializable summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub category: VehicleCategory,
    pub n_trees: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub train_score: f64,
    pub test_score: f64,
    pub importances: Vec<FeatureScore>,
}

impl TrainingOutcome {
    #[must_use]
    pub fn report(&self) -> TrainingReport {
        TrainingReport {
            category: self.model.category(),
            n_trees: self.model.forest.n_trees(),
            n_train: self.n_train,
            n_test: self.n_test,
            train_score: self.train_score,
            test_score: self.test_score,
            importances: self.model.feature_importance(),
        }
    }
}

/// Shuffle `0..n` with a seeded RNG and split it into `(train, test)`,
/// holding out `ceil(test_fraction * n)` rows, at least one per side.
pub(crate) fn split_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.clamp(1, n.saturating_sub(1).max(1));
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Train a price model for `category` on `table`.
///
/// Rows missing any schema feature are dropped; the survivors are label
/// encoded, shuffled into a training and an evaluation partition, and fitted
/// with a Random Forest. R² is reported for both partitions but never gates
/// the result.
///
/// # Errors
///
/// | Variant                              | When                                          |
/// |--------------------------------------|-----------------------------------------------|
/// | [`TrainingError::InvalidConfig`]     | a config setting is out of range              |
/// | [`TrainingError::MissingFeatures`]   | a schema feature is not a table column        |
/// | [`TrainingError::InsufficientData`]  | fewer than `min_rows` complete rows remain    |
/// | [`TrainingError::Fit`]               | the forest rejects the encoded dataset        |
#[instrument(skip_all, fields(%category, n_listings = table.len()))]
pub fn train(
    category: VehicleCategory,
    table: &ListingTable,
    config: &PriceModelConfig,
) -> Result<TrainingOutcome, TrainingError> {
    config.validate()?;
    let schema = FeatureSchema::resolve(category, table)?;

    let (rows, prices): (Vec<Vec<FeatureValue>>, Vec<f64>) = table
        .listings()
        .iter()
        .filter_map(|listing| {
            let values: Option<Vec<FeatureValue>> =
                schema.features().iter().map(|f| f.extract(listing)).collect();
            values.map(|v| (v, listing.price))
        })
        .unzip();

    let n_rows = rows.len();
    debug!(n_rows, n_dropped = table.len() - n_rows, "dropped incomplete rows");
    if n_rows < config.min_rows {
        return Err(TrainingError::InsufficientData {
            category,
            n_rows,
            min_rows: config.min_rows,
        });
    }

    let (encoders, features) = encode_rows(&schema, &rows);

    let (train_idx, test_idx) = split_indices(n_rows, config.test_fraction, config.seed);
    let take = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
        idx.iter().map(|&i| (features[i].clone(), prices[i])).unzip()
    };
    let (train_x, train_y) = take(train_idx.as_slice());
    let (test_x, test_y) = take(test_idx.as_slice());

    info!(
        n_rows,
        n_train = train_idx.len(),
        n_test = test_idx.len(),
        n_trees = config.n_trees,
        max_depth = ?config.max_depth,
        min_samples_leaf = config.min_samples_leaf,
        "training price model"
    );

    let (forest, _) = RandomForestConfig::new(config.n_trees)?
        .with_seed(config.seed)
        .with_max_depth(config.max_depth)
        .with_min_samples_leaf(config.min_samples_leaf)
        .fit(&train_x, &train_y, &schema.names())?
        .into_parts();

    let train_score = forest.score(&train_x, &train_y)?;
    let test_score = forest.score(&test_x, &test_y)?;

    info!(train_score, test_score, "price model trained");

    Ok(TrainingOutcome {
        model: TrainedModel {
            forest,
            encoders,
            schema,
        },
        train_score,
        test_score,
        n_train: train_idx.len(),
        n_test: test_idx.len(),
    })
}

/// Fit encoders over the categorical columns of `rows` and return the
/// row-major numeric matrix.
fn encode_rows(schema: &FeatureSchema, rows: &[Vec<FeatureValue>]) -> (EncoderSet, Vec<Vec<f64>>) {
    let mut tables = BTreeMap::new();
    let mut matrix = vec![Vec::with_capacity(schema.len()); rows.len()];

    for (j, &feature) in schema.features().iter().enumerate() {
        let column: Vec<f64> = match feature.kind() {
            FeatureKind::Categorical => {
                let observed: Vec<String> =
                    rows.iter().map(|r| r[j].as_text().into_owned()).collect();
                let (table, codes) = EncoderTable::fit_transform(&observed);
                debug!(%feature, n_categories = table.len(), "encoder fitted");
                tables.insert(feature, table);
                codes.into_iter().map(|c| c as f64).collect()
            }
            // Non-numbers become NaN and are rejected by the forest.
            FeatureKind::Numeric => rows
                .iter()
                .map(|r| r[j].as_number().unwrap_or(f64::NAN))
                .collect(),
        };
        for (row, value) in matrix.iter_mut().zip(column) {
            row.push(value);
        }
    }

    (EncoderSet::from_tables(tables), matrix)
}
