//! Decision-tree classification: train, predict, persist.
//!
//! Provides a hand-rolled CART decision tree grown from Gini-impurity splits
//! with randomized feature and threshold subsampling, a binary-relevance
//! multi-label wrapper that trains one tree per label column in parallel,
//! and versioned bincode persistence.

mod error;
mod multilabel;
mod node;
mod predict;
mod random;
mod serialize;
mod split;
mod tree;

pub use error::TreeError;
pub use multilabel::MultiLabelModel;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use random::{RandomSource, SeededRandom};
pub use serialize::{FORMAT_VERSION, PersistentModel};
pub use split::{GAIN_TOLERANCE, MAX_THRESHOLDS, class_counts, gini, majority_class};
pub use tree::{DecisionTree, DecisionTreeConfig};
