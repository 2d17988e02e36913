//! Accuracy regression tests for airsense-tree.
//!
//! These tests verify that algorithmic changes do not degrade decision tree
//! or multi-label accuracy on a deterministic synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use airsense_tree::{DecisionTreeConfig, MultiLabelModel};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic classification dataset
// ---------------------------------------------------------------------------

/// Generate a 300-sample, 6-feature, 3-class classification dataset.
///
/// Features 0-2 are informative (class * 3.0 + noise in [0, 0.5]).
/// Features 3-5 are pure noise in [0, 0.5].
/// Samples are assigned round-robin across classes.
fn make_classification() -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 300;
    let n_features = 6;
    let n_classes = 3;

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

/// First 240 rows train, last 60 rows test.
fn holdout<T: Clone>(rows: &[T]) -> (Vec<T>, Vec<T>) {
    (rows[..240].to_vec(), rows[240..].to_vec())
}

// ---------------------------------------------------------------------------
// a) holdout_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// A single tree must classify more than 85% of unseen samples correctly.
#[test]
fn holdout_accuracy_above_threshold() {
    let (features, labels) = make_classification();
    let (train_x, test_x) = holdout(&features);
    let (train_y, test_y) = holdout(&labels);

    let tree = DecisionTreeConfig::new()
        .with_seed(42)
        .fit(&train_x, &train_y)
        .unwrap();
    let predicted = tree.predict(&test_x).unwrap();
    let hits = predicted.iter().zip(&test_y).filter(|(p, y)| p == y).count();
    let accuracy = hits as f64 / test_y.len() as f64;

    assert!(accuracy > 0.85, "holdout accuracy {accuracy} <= 0.85");
}

// ---------------------------------------------------------------------------
// b) training_accuracy_is_perfect
// ---------------------------------------------------------------------------

/// With unlimited depth and distinct rows every leaf ends pure.
#[test]
fn training_accuracy_is_perfect() {
    let (features, labels) = make_classification();
    let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
    assert_eq!(tree.predict(&features).unwrap(), labels);
}

// ---------------------------------------------------------------------------
// c) multilabel_exact_match_above_threshold
// ---------------------------------------------------------------------------

/// One column flags class 0, the other flags class 2.
#[test]
fn multilabel_exact_match_above_threshold() {
    let (features, labels) = make_classification();
    let matrix: Vec<Vec<usize>> = labels
        .iter()
        .map(|&c| vec![usize::from(c == 0), usize::from(c == 2)])
        .collect();
    let (train_x, test_x) = holdout(&features);
    let (train_y, test_y) = holdout(&matrix);

    let mut model = MultiLabelModel::new().with_seed(42);
    model.fit(&train_x, &train_y).unwrap();
    let score = model.score(&test_x, &test_y).unwrap();

    assert!(score > 0.85, "exact-match accuracy {score} <= 0.85");
}

// ---------------------------------------------------------------------------
// d) deterministic_predictions
// ---------------------------------------------------------------------------

/// Same config and seed must produce identical trees across two independent runs.
#[test]
fn deterministic_predictions() {
    let (features, labels) = make_classification();
    let config = DecisionTreeConfig::new().with_seed(7).with_max_features(Some(2));

    let tree1 = config.fit(&features, &labels).unwrap();
    let tree2 = config.fit(&features, &labels).unwrap();

    assert_eq!(tree1, tree2, "trees differ across runs with the same seed");
}

// ---------------------------------------------------------------------------
// e) depth_never_exceeds_limit
// ---------------------------------------------------------------------------

#[test]
fn depth_never_exceeds_limit() {
    let (features, labels) = make_classification();
    for max_depth in [0, 1, 2, 4] {
        let tree = DecisionTreeConfig::new()
            .with_max_depth(max_depth)
            .with_max_features(Some(1))
            .fit(&features, &labels)
            .unwrap();
        assert!(tree.depth() <= max_depth, "depth {} > {max_depth}", tree.depth());
    }
}
