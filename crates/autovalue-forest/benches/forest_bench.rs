//! Criterion benchmarks for autovalue-forest: Random Forest training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use autovalue_forest::RandomForestConfig;

fn make_regression(n_samples: usize, n_features: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<f64>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let row: Vec<f64> = (0..n_features).map(|_| rng.r#gen::<f64>()).collect();
        targets.push(row[0] * 50_000.0 + row[1] * 20_000.0 + rng.r#gen::<f64>() * 1_000.0);
        features.push(row);
    }
    let names: Vec<String> = (0..n_features).map(|f| format!("f{f}")).collect();
    (features, targets, names)
}

fn bench_forest_train(c: &mut Criterion) {
    let (features, targets, names) = make_regression(1000, 6, 42);
    let cfg = RandomForestConfig::new(100).unwrap().with_seed(42);

    c.bench_function("forest_train_1000x6_100trees", |b| {
        b.iter(|| cfg.fit(&features, &targets, &names).unwrap());
    });
}

fn bench_forest_predict_batch(c: &mut Criterion) {
    let (features, targets, names) = make_regression(1000, 6, 42);
    let cfg = RandomForestConfig::new(100).unwrap().with_seed(42);
    let (forest, _) = cfg.fit(&features, &targets, &names).unwrap().into_parts();

    c.bench_function("forest_predict_batch_1000x6_100trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

criterion_group!(benches, bench_forest_train, bench_forest_predict_batch);
criterion_main!(benches);
