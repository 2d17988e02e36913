use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::{
    TreeError,
    node::{Node, NodeIndex},
    predict::ClassDistribution,
    random::{RandomSource, SeededRandom},
    split::{class_counts, find_best_split, gini, majority_class},
};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `min_samples_split` | 2                     |
/// | `max_depth`         | 100                   |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTreeConfig {
    pub(crate) min_samples_split: usize,
    pub(crate) max_depth: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_samples_split: 2,
            max_depth: 100,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the maximum tree depth. The root is depth 0, so 0 yields a
    /// single leaf.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the number of features drawn at each split.
    ///
    /// `None` means all features. Values above the feature count are
    /// clamped at fit time.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed used by [`DecisionTree::fit`].
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the per-split feature subset size, if set.
    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a fresh decision tree with this configuration.
    ///
    /// # Errors
    ///
    /// See [`DecisionTree::fit_with`].
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, TreeError> {
        let mut tree = DecisionTree::new(self.clone());
        tree.fit(features, labels)?;
        Ok(tree)
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A CART decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references; the root is
/// index 0. The arena is empty until a fit succeeds.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) config: DecisionTreeConfig,
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) classes: Vec<usize>,
}

/// A node slot waiting to be grown.
struct Pending {
    slot: usize,
    depth: usize,
    sample_indices: Vec<usize>,
}

impl DecisionTree {
    /// Create an unfitted tree.
    #[must_use]
    pub fn new(config: DecisionTreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Fit the tree, drawing randomness from the configured seed.
    ///
    /// # Errors
    ///
    /// See [`DecisionTree::fit_with`].
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<(), TreeError> {
        let mut rng = SeededRandom::new(self.config.seed);
        self.fit_with(features, labels, &mut rng)
    }

    /// Fit the tree on a row-major dataset with an injected random source.
    ///
    /// `features[sample_idx][feature_idx]`, `labels[sample_idx]`. Labels may
    /// be any `usize` values: growth works on dense indices into the sorted
    /// distinct labels, and leaves report the original values. Any previous
    /// model is replaced only when the fit succeeds.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                   |
    /// |---------------------------------------|----------------------------------------|
    /// | [`TreeError::EmptyDataset`]           | `features` is empty                    |
    /// | [`TreeError::ZeroFeatures`]           | rows have zero feature columns         |
    /// | [`TreeError::FeatureCountMismatch`]   | rows have inconsistent lengths         |
    /// | [`TreeError::NonFiniteValue`]         | any value is NaN or infinite           |
    /// | [`TreeError::LabelCountMismatch`]     | `labels.len() != features.len()`       |
    /// | [`TreeError::InvalidMinSamplesSplit`] | `min_samples_split` < 2                |
    /// | [`TreeError::InvalidMaxFeatures`]     | `max_features` is `Some(0)`            |
    /// | [`TreeError::EmptyPartition`]         | growth reached a node with no samples  |
    #[instrument(skip(self, features, labels, rng), fields(n_samples = features.len()))]
    pub fn fit_with<R: RandomSource + ?Sized>(
        &mut self,
        features: &[Vec<f64>],
        labels: &[usize],
        rng: &mut R,
    ) -> Result<(), TreeError> {
        // --- Validate inputs ---
        if features.is_empty() {
            return Err(TreeError::EmptyDataset);
        }

        let n_samples = features.len();
        let n_features = features[0].len();

        if n_features == 0 {
            return Err(TreeError::ZeroFeatures);
        }

        for (sample_index, row) in features.iter().enumerate() {
            if row.len() != n_features {
                return Err(TreeError::FeatureCountMismatch {
                    expected: n_features,
                    got: row.len(),
                    sample_index,
                });
            }
            for (feature_index, &val) in row.iter().enumerate() {
                if !val.is_finite() {
                    return Err(TreeError::NonFiniteValue {
                        sample_index,
                        feature_index,
                    });
                }
            }
        }

        if labels.len() != n_samples {
            return Err(TreeError::LabelCountMismatch {
                expected: n_samples,
                got: labels.len(),
            });
        }

        // --- Validate config ---
        if self.config.min_samples_split < 2 {
            return Err(TreeError::InvalidMinSamplesSplit {
                min_samples_split: self.config.min_samples_split,
            });
        }

        let max_features = match self.config.max_features {
            Some(0) => return Err(TreeError::InvalidMaxFeatures { max_features: 0 }),
            Some(k) => k.min(n_features),
            None => n_features,
        };

        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let dense: Vec<usize> = labels
            .iter()
            .map(|&label| classes.partition_point(|&c| c < label))
            .collect();
        let n_classes = classes.len();

        debug!(
            n_samples = n_samples,
            n_features = n_features,
            n_classes = n_classes,
            max_features = max_features,
            max_depth = self.config.max_depth,
            "fitting decision tree"
        );

        let nodes = grow(
            features,
            &dense,
            &classes,
            &self.config,
            max_features,
            rng,
        )?;

        debug!(
            n_nodes = nodes.len(),
            n_leaves = nodes.iter().filter(|n| n.is_leaf()).count(),
            "decision tree built"
        );

        self.nodes = nodes;
        self.n_features = n_features;
        self.classes = classes;
        Ok(())
    }

    /// Return `true` once a fit has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Return the configuration this tree trains with.
    #[must_use]
    pub fn config(&self) -> &DecisionTreeConfig {
        &self.config
    }

    /// Return the node arena. Empty before fit.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the root node, if fitted.
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(NodeIndex::ROOT.index())
    }

    /// Return the number of features the tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of distinct labels seen in training.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Return the distinct training labels in ascending order.
    #[must_use]
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0, as does an
    /// unfitted tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        let mut max_depth = 0usize;
        let mut queue = VecDeque::new();
        queue.push_back((NodeIndex::ROOT, 0usize));

        while let Some((idx, d)) = queue.pop_front() {
            match &self.nodes[idx.index()] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    queue.push_back((*left, d + 1));
                    queue.push_back((*right, d + 1));
                }
            }
        }

        max_depth
    }

    /// Traverse a fitted tree from the root and return the arena index of the leaf.
    pub(crate) fn traverse(&self, sample: &[f64]) -> usize {
        let mut idx = NodeIndex::ROOT.index();
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }
}

/// Grow the arena with an explicit work stack.
///
/// Slots are reserved with a placeholder and overwritten once grown. The
/// stack pops the left child before the right, so random draws happen in
/// the same order as a recursive left-first build. `labels` are dense
/// indices into `classes`.
fn grow<R: RandomSource + ?Sized>(
    features: &[Vec<f64>],
    labels: &[usize],
    classes: &[usize],
    config: &DecisionTreeConfig,
    max_features: usize,
    rng: &mut R,
) -> Result<Vec<Node>, TreeError> {
    let n_classes = classes.len();
    let mut arena = vec![placeholder()];
    let mut stack = vec![Pending {
        slot: NodeIndex::ROOT.index(),
        depth: 0,
        sample_indices: (0..features.len()).collect(),
    }];

    while let Some(Pending {
        slot,
        depth,
        sample_indices,
    }) = stack.pop()
    {
        let n_samples = sample_indices.len();
        if n_samples == 0 {
            return Err(TreeError::EmptyPartition { depth });
        }

        let counts = class_counts(labels, &sample_indices, n_classes);
        let impurity = gini(&counts, n_samples);
        let leaf = Node::Leaf {
            prediction: classes[majority_class(&counts)],
            distribution: ClassDistribution::from_class_counts(classes, &counts),
            impurity,
            n_samples,
        };

        // Stopping conditions -> leaf.
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if depth >= config.max_depth || pure || n_samples < config.min_samples_split {
            arena[slot] = leaf;
            continue;
        }

        let Some(split) =
            find_best_split(features, labels, &sample_indices, n_classes, max_features, rng)
        else {
            arena[slot] = leaf;
            continue;
        };

        let left = NodeIndex::new(arena.len());
        arena.push(placeholder());
        let right = NodeIndex::new(arena.len());
        arena.push(placeholder());

        arena[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
            gain: split.gain,
        };

        stack.push(Pending {
            slot: right.index(),
            depth: depth + 1,
            sample_indices: split.right_indices,
        });
        stack.push(Pending {
            slot: left.index(),
            depth: depth + 1,
            sample_indices: split.left_indices,
        });
    }

    Ok(arena)
}

fn placeholder() -> Node {
    Node::Leaf {
        prediction: 0,
        distribution: ClassDistribution::default(),
        impurity: crate::node::Impurity::new(0.0),
        n_samples: 0,
    }
}
