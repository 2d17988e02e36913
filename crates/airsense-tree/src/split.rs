use crate::node::{FeatureIndex, Impurity};
use crate::random::RandomSource;

/// Gains at or below this value count as "no improvement".
pub const GAIN_TOLERANCE: f64 = 1e-12;

/// Maximum number of candidate thresholds evaluated per feature.
pub const MAX_THRESHOLDS: usize = 10;

/// Gini impurity `1 - Σ(p_i²)` of a subset from its class counts.
///
/// Returns [`Impurity`] 0 when `n_samples` is zero.
#[must_use]
pub fn gini(class_counts: &[usize], n_samples: usize) -> Impurity {
    if n_samples == 0 {
        return Impurity::new(0.0);
    }
    let n = n_samples as f64;
    let sum_sq: f64 = class_counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum();
    Impurity::new(1.0 - sum_sq)
}

/// Count how many of the samples at `sample_indices` carry each class label.
///
/// The returned vector has length `n_classes`.
#[must_use]
pub fn class_counts(labels: &[usize], sample_indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &si in sample_indices {
        counts[labels[si]] += 1;
    }
    counts
}

/// Most frequent class. Among equal counts the smallest class index wins.
#[must_use]
pub fn majority_class(class_counts: &[usize]) -> usize {
    let mut best = 0usize;
    for (class, &count) in class_counts.iter().enumerate() {
        if count > class_counts[best] {
            best = class;
        }
    }
    best
}

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Feature used for the split.
    pub(crate) feature: FeatureIndex,
    /// Samples with `value <= threshold` go left.
    pub(crate) threshold: f64,
    /// Information gain of the split.
    pub(crate) gain: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Distinct values of `feature` over the subset, ascending, capped at
/// [`MAX_THRESHOLDS`] by a uniform draw without replacement.
pub(crate) fn candidate_thresholds<R: RandomSource + ?Sized>(
    features: &[Vec<f64>],
    sample_indices: &[usize],
    feature: usize,
    rng: &mut R,
) -> Vec<f64> {
    let mut values: Vec<f64> = sample_indices
        .iter()
        .map(|&si| features[si][feature])
        .collect();
    values.sort_unstable_by(f64::total_cmp);
    values.dedup();

    if values.len() <= MAX_THRESHOLDS {
        return values;
    }
    rng.sample_without_replacement(values.len(), MAX_THRESHOLDS)
        .into_iter()
        .map(|i| values[i])
        .collect()
}

/// Information gain of splitting the subset on `feature <= threshold`.
///
/// A split that leaves either side empty scores 0.
pub(crate) fn information_gain(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    parent: Impurity,
    feature: usize,
    threshold: f64,
) -> f64 {
    let mut left = vec![0usize; n_classes];
    let mut right = vec![0usize; n_classes];
    let mut n_left = 0usize;
    for &si in sample_indices {
        if features[si][feature] <= threshold {
            left[labels[si]] += 1;
            n_left += 1;
        } else {
            right[labels[si]] += 1;
        }
    }
    let n = sample_indices.len();
    let n_right = n - n_left;
    if n_left == 0 || n_right == 0 {
        return 0.0;
    }

    let weighted = (n_left as f64 / n as f64) * gini(&left, n_left).value()
        + (n_right as f64 / n as f64) * gini(&right, n_right).value();
    parent.value() - weighted
}

/// Find the best split among `max_features` randomly drawn features.
///
/// Features are visited in draw order and thresholds in candidate order;
/// a later candidate replaces the current best only with a strictly
/// larger gain, so ties keep the first one seen.
///
/// Returns `None` when no candidate improves on the parent by more than
/// [`GAIN_TOLERANCE`].
///
/// `features` is row-major: `features[sample_idx][feature_idx]`.
pub(crate) fn find_best_split<R: RandomSource + ?Sized>(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    max_features: usize,
    rng: &mut R,
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    let n_features = features.first().map_or(0, Vec::len);
    if n_samples == 0 || n_features == 0 {
        return None;
    }

    let parent = gini(&class_counts(labels, sample_indices, n_classes), n_samples);
    let selected = rng.sample_without_replacement(n_features, max_features);

    let mut best_gain = -1.0f64;
    let mut best: Option<(usize, f64)> = None;

    for feat_idx in selected {
        for threshold in candidate_thresholds(features, sample_indices, feat_idx, rng) {
            let gain = information_gain(
                features,
                labels,
                sample_indices,
                n_classes,
                parent,
                feat_idx,
                threshold,
            );
            if gain > best_gain {
                best_gain = gain;
                best = Some((feat_idx, threshold));
            }
        }
    }

    let (feat_idx, threshold) = best?;
    if best_gain <= GAIN_TOLERANCE {
        return None;
    }

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| features[si][feat_idx] <= threshold);

    Some(SplitResult {
        feature: FeatureIndex::new(feat_idx),
        threshold,
        gain: best_gain,
        left_indices,
        right_indices,
    })
}
