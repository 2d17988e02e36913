//! Binary-relevance multi-label classification: one tree per label column.

use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::{
    TreeError,
    random::SeededRandom,
    tree::{DecisionTree, DecisionTreeConfig},
};

/// One independent [`DecisionTree`] per label column.
///
/// Construct via [`MultiLabelModel::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default |
/// |-------------|---------|
/// | `max_depth` | 15      |
/// | `seed`      | 42      |
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MultiLabelModel {
    max_depth: usize,
    seed: u64,
    trees: Vec<DecisionTree>,
}

impl MultiLabelModel {
    /// Create an unfitted model with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: 15,
            seed: 42,
            trees: Vec::new(),
        }
    }

    /// Set the maximum depth of every column tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the master seed from which per-column seeds are drawn.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the per-column maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the fitted column trees, in label-column order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of label columns, 0 before fit.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.trees.len()
    }

    /// Return `true` once a fit has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Train one tree per column of `label_matrix`.
    ///
    /// Column seeds are drawn from a ChaCha generator seeded with the
    /// master seed, then columns train in parallel. The new trees replace
    /// the old ones only after every column succeeded.
    ///
    /// # Errors
    ///
    /// - [`TreeError::LabelCountMismatch`] when the matrix row count differs
    ///   from the sample count.
    /// - [`TreeError::ZeroLabelColumns`] when the matrix has no columns.
    /// - [`TreeError::LabelColumnMismatch`] on a ragged row.
    /// - Any error from [`DecisionTree::fit`] for a column.
    #[instrument(skip(self, features, label_matrix), fields(n_samples = features.len()))]
    pub fn fit(&mut self, features: &[Vec<f64>], label_matrix: &[Vec<usize>]) -> Result<(), TreeError> {
        if features.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        if label_matrix.len() != features.len() {
            return Err(TreeError::LabelCountMismatch {
                expected: features.len(),
                got: label_matrix.len(),
            });
        }
        let n_labels = label_matrix[0].len();
        if n_labels == 0 {
            return Err(TreeError::ZeroLabelColumns);
        }
        for (row_index, row) in label_matrix.iter().enumerate() {
            if row.len() != n_labels {
                return Err(TreeError::LabelColumnMismatch {
                    expected: n_labels,
                    got: row.len(),
                    row_index,
                });
            }
        }

        let mut master = SeededRandom::new(self.seed);
        let seeds: Vec<u64> = (0..n_labels).map(|_| master.next_seed()).collect();

        debug!(n_labels = n_labels, max_depth = self.max_depth, "fitting label columns");

        let trees = seeds
            .into_par_iter()
            .enumerate()
            .map(|(column, seed)| {
                let labels: Vec<usize> = label_matrix.iter().map(|row| row[column]).collect();
                DecisionTreeConfig::new()
                    .with_max_depth(self.max_depth)
                    .with_seed(seed)
                    .fit(features, &labels)
            })
            .collect::<Result<Vec<_>, TreeError>>()?;

        self.trees = trees;
        Ok(())
    }

    /// Predict every label column for each sample.
    ///
    /// Rows follow input order, columns follow trained column order.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotFitted`] before a successful fit.
    /// - [`TreeError::PredictionFeatureMismatch`] on wrong sample width.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<usize>>, TreeError> {
        if !self.is_fitted() {
            return Err(TreeError::NotFitted);
        }
        let columns = self
            .trees
            .iter()
            .map(|tree| tree.predict(features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((0..features.len())
            .map(|row| columns.iter().map(|col| col[row]).collect())
            .collect())
    }

    /// Exact-match accuracy: the fraction of rows whose every predicted
    /// label equals the expected one.
    ///
    /// # Errors
    ///
    /// - Any error from [`MultiLabelModel::predict`].
    /// - [`TreeError::LabelCountMismatch`] when the matrix row count differs
    ///   from the sample count.
    /// - [`TreeError::EmptyDataset`] when there are no rows to score.
    pub fn score(&self, features: &[Vec<f64>], label_matrix: &[Vec<usize>]) -> Result<f64, TreeError> {
        if label_matrix.len() != features.len() {
            return Err(TreeError::LabelCountMismatch {
                expected: features.len(),
                got: label_matrix.len(),
            });
        }
        let predicted = self.predict(features)?;
        if predicted.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        let exact = predicted
            .iter()
            .zip(label_matrix)
            .filter(|(p, y)| p == y)
            .count();
        Ok(exact as f64 / predicted.len() as f64)
    }
}

impl Default for MultiLabelModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::MultiLabelModel;
    use crate::TreeError;

    /// Column 0 flags high x, column 1 flags high y.
    fn grid() -> (Vec<Vec<f64>>, Vec<Vec<usize>>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for x in 0..6 {
            for y in 0..6 {
                features.push(vec![f64::from(x), f64::from(y)]);
                labels.push(vec![usize::from(x >= 3), usize::from(y >= 4)]);
            }
        }
        (features, labels)
    }

    #[test]
    fn defaults_follow_documented_table() {
        let model = MultiLabelModel::new();
        assert_eq!(model.max_depth(), 15);
        assert_eq!(model.seed(), 42);
        assert!(!model.is_fitted());
    }

    #[test]
    fn column_trees_inherit_depth_and_default_split_size() {
        let (features, labels) = grid();
        let mut model = MultiLabelModel::new().with_max_depth(3);
        model.fit(&features, &labels).unwrap();
        for tree in model.trees() {
            assert_eq!(tree.config().max_depth(), 3);
            assert_eq!(tree.config().min_samples_split(), 2);
        }
    }

    #[test]
    fn learns_independent_columns() {
        let (features, labels) = grid();
        let mut model = MultiLabelModel::new();
        model.fit(&features, &labels).unwrap();
        assert_eq!(model.n_labels(), 2);
        assert_eq!(model.predict(&features).unwrap(), labels);
        assert!((model.score(&features, &labels).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn one_wrong_row_costs_one_over_n() {
        let (features, labels) = grid();
        let mut model = MultiLabelModel::new();
        model.fit(&features, &labels).unwrap();

        let mut corrupted = labels.clone();
        corrupted[0][1] = 1 - corrupted[0][1];
        let n = features.len() as f64;
        let score = model.score(&features, &corrupted).unwrap();
        assert!((score - (1.0 - 1.0 / n)).abs() < 1e-12);
    }

    #[test]
    fn not_fitted_before_fit() {
        let model = MultiLabelModel::new();
        assert!(matches!(model.predict(&[vec![1.0]]), Err(TreeError::NotFitted)));
    }

    #[test]
    fn ragged_label_matrix_rejected() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![vec![0, 1], vec![1]];
        let err = MultiLabelModel::new().fit(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            TreeError::LabelColumnMismatch { expected: 2, got: 1, row_index: 1 }
        ));
    }

    #[test]
    fn label_row_count_must_match() {
        let features = vec![vec![1.0], vec![2.0]];
        let err = MultiLabelModel::new().fit(&features, &[vec![0]]).unwrap_err();
        assert!(matches!(err, TreeError::LabelCountMismatch { .. }));
    }

    #[test]
    fn failed_column_keeps_previous_trees() {
        let (features, labels) = grid();
        let mut model = MultiLabelModel::new();
        model.fit(&features, &labels).unwrap();
        let before = model.clone();

        let mut bad = features.clone();
        bad[3][0] = f64::NAN;
        assert!(model.fit(&bad, &labels).is_err());
        assert_eq!(model, before);
    }

    #[test]
    fn same_seed_same_model() {
        let (features, labels) = grid();
        let mut a = MultiLabelModel::new().with_seed(9);
        let mut b = MultiLabelModel::new().with_seed(9);
        a.fit(&features, &labels).unwrap();
        b.fit(&features, &labels).unwrap();
        assert_eq!(a, b);
    }
}
