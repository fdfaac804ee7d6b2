//! Accuracy regression tests for autovalue-forest.
//!
//! These tests verify that algorithmic changes do not degrade Random Forest
//! regression quality on a deterministic synthetic price dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use autovalue_forest::{RandomForestConfig, r2_score};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic regression dataset
// ---------------------------------------------------------------------------

/// Generate a 400-sample, 6-feature price-like regression dataset.
///
/// Features 0-1 are informative (year-like and mileage-like), feature 2 is a
/// coded brand with a per-brand premium, features 3-5 are pure noise.
fn make_regression(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<f64>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let premiums = [0.0, 15_000.0, 40_000.0, 5_000.0];

    let mut features = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let year = rng.gen_range(2005..=2023) as f64;
        let mileage = rng.gen_range(0.0..200_000.0);
        let brand = rng.gen_range(0..premiums.len());
        let noise: Vec<f64> = (0..3).map(|_| rng.r#gen::<f64>()).collect();

        let price = 20_000.0 + (year - 2005.0) * 4_000.0 - mileage * 0.1
            + premiums[brand]
            + rng.gen_range(-2_000.0..2_000.0);

        let mut row = vec![year, mileage, brand as f64];
        row.extend(noise);
        features.push(row);
        targets.push(price);
    }
    let names: Vec<String> = ["year", "mileage", "brand", "n0", "n1", "n2"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    (features, targets, names)
}

/// Held-out R² must exceed 0.85 with 100 trees.
#[test]
fn holdout_r2_above_threshold() {
    let (features, targets, names) = make_regression(400, 42);
    let (train_x, test_x) = features.split_at(320);
    let (train_y, test_y) = targets.split_at(320);

    let result = RandomForestConfig::new(100)
        .unwrap()
        .with_seed(42)
        .fit(train_x, train_y, &names)
        .unwrap();
    let predicted = result.forest().predict_batch(test_x).unwrap();
    let r2 = r2_score(test_y, &predicted).unwrap();

    assert!(r2 > 0.85, "holdout r2 {r2} <= 0.85");
}

/// The top 3 features by importance must be the informative ones.
#[test]
fn top_features_are_informative() {
    let (features, targets, names) = make_regression(400, 42);
    let result = RandomForestConfig::new(100)
        .unwrap()
        .with_seed(42)
        .fit(&features, &targets, &names)
        .unwrap();

    let mut top3: Vec<&str> = result
        .importances()
        .iter()
        .take(3)
        .map(|f| f.name.as_str())
        .collect();
    top3.sort_unstable();
    assert_eq!(top3, vec!["brand", "mileage", "year"]);
}

/// Train R² is at least as high as held-out R² on this dataset.
#[test]
fn train_score_not_below_test_score() {
    let (features, targets, names) = make_regression(300, 7);
    let (train_x, test_x) = features.split_at(240);
    let (train_y, test_y) = targets.split_at(240);

    let result = RandomForestConfig::new(50)
        .unwrap()
        .with_seed(7)
        .fit(train_x, train_y, &names)
        .unwrap();
    let train_r2 = result.forest().score(train_x, train_y).unwrap();
    let test_r2 = result.forest().score(test_x, test_y).unwrap();
    assert!(train_r2 >= test_r2, "train {train_r2} < test {test_r2}");
}
