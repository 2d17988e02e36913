//! Inference for fitted decision trees.

use std::collections::BTreeMap;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::TreeError;
use crate::node::Node;
use crate::tree::DecisionTree;

/// Class probability distribution of a leaf.
///
/// Only classes present in the leaf's training subset appear as keys;
/// the probabilities sum to 1.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ClassDistribution {
    probs: BTreeMap<usize, f64>,
}

impl ClassDistribution {
    /// Build a distribution from per-class counts, skipping absent classes.
    #[must_use]
    pub fn from_counts(class_counts: &[usize]) -> Self {
        let classes: Vec<usize> = (0..class_counts.len()).collect();
        Self::from_class_counts(&classes, class_counts)
    }

    /// Build a distribution where `counts[i]` belongs to label `classes[i]`.
    pub(crate) fn from_class_counts(classes: &[usize], counts: &[usize]) -> Self {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return Self::default();
        }
        let probs = classes
            .iter()
            .zip(counts)
            .filter(|&(_, &c)| c > 0)
            .map(|(&class, &c)| (class, c as f64 / total as f64))
            .collect();
        Self { probs }
    }

    /// Probability of `class`, 0 when the class never reached the leaf.
    #[must_use]
    pub fn probability(&self, class: usize) -> f64 {
        self.probs.get(&class).copied().unwrap_or(0.0)
    }

    /// Return the most probable class. Ties go to the smallest class index.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        let mut best: Option<(usize, f64)> = None;
        for (&class, &p) in &self.probs {
            if best.is_none_or(|(_, bp)| p > bp) {
                best = Some((class, p));
            }
        }
        best.map_or(0, |(class, _)| class)
    }

    /// Iterate over `(class, probability)` pairs in class order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.probs.iter().map(|(&c, &p)| (c, p))
    }

    /// Number of classes present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Return `true` if no class is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Borrow the underlying class-to-probability map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<usize, f64> {
        &self.probs
    }
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// Traverses from the root (index 0): at each split, goes left when
    /// `sample[feature] <= threshold`, right otherwise.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotFitted`] before a successful `fit`.
    /// - [`TreeError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_sample(&self, sample: &[f64]) -> Result<usize, TreeError> {
        match self.leaf_for(sample)? {
            Node::Leaf { prediction, .. } => Ok(*prediction),
            Node::Split { .. } => Err(TreeError::NotFitted),
        }
    }

    /// Return the leaf class distribution for a single sample.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionTree::predict_sample`].
    pub fn predict_proba_sample(&self, sample: &[f64]) -> Result<ClassDistribution, TreeError> {
        match self.leaf_for(sample)? {
            Node::Leaf { distribution, .. } => Ok(distribution.clone()),
            Node::Split { .. } => Err(TreeError::NotFitted),
        }
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// Output order matches input order.
    ///
    /// # Errors
    ///
    /// Returns the first error any sample produces, see
    /// [`DecisionTree::predict_sample`].
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, TreeError> {
        if !self.is_fitted() {
            return Err(TreeError::NotFitted);
        }
        features
            .into_par_iter()
            .map(|sample| self.predict_sample(sample))
            .collect()
    }

    /// Return leaf distributions for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionTree::predict`].
    pub fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<ClassDistribution>, TreeError> {
        if !self.is_fitted() {
            return Err(TreeError::NotFitted);
        }
        features
            .into_par_iter()
            .map(|sample| self.predict_proba_sample(sample))
            .collect()
    }

    fn leaf_for(&self, sample: &[f64]) -> Result<&Node, TreeError> {
        if !self.is_fitted() {
            return Err(TreeError::NotFitted);
        }
        if sample.len() != self.n_features {
            return Err(TreeError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(&self.nodes[self.traverse(sample)])
    }
}
