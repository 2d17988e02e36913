//! Criterion benchmarks for airsense-tree: tree training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use airsense_tree::{DecisionTreeConfig, MultiLabelModel};

fn make_classification(
    n_samples: usize,
    n_features: usize,
    n_classes: usize,
    seed: u64,
) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % n_classes;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn bench_tree_train(c: &mut Criterion) {
    let (features, labels) = make_classification(2000, 5, 3, 42);
    let cfg = DecisionTreeConfig::new().with_max_depth(15).with_seed(42);

    c.bench_function("tree_train_2000x5_3class", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

fn bench_tree_predict_batch(c: &mut Criterion) {
    let (features, labels) = make_classification(2000, 5, 3, 42);
    let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();

    c.bench_function("tree_predict_batch_2000x5", |b| {
        b.iter(|| tree.predict(&features).unwrap());
    });
}

fn bench_multilabel_train(c: &mut Criterion) {
    let (features, labels) = make_classification(2000, 5, 3, 42);
    let matrix: Vec<Vec<usize>> = labels
        .iter()
        .map(|&c| (0..5).map(|col| usize::from(c == col % 3)).collect())
        .collect();

    c.bench_function("multilabel_train_2000x5_5labels", |b| {
        b.iter(|| {
            let mut model = MultiLabelModel::new();
            model.fit(&features, &matrix).unwrap();
        });
    });
}

criterion_group!(benches, bench_tree_train, bench_tree_predict_batch, bench_multilabel_train);
criterion_main!(benches);
