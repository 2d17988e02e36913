//! Seeded train/test splitting.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::DataError;

/// Sample indices on each side of a train/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    /// Indices of training samples, in shuffled order.
    pub train: Vec<usize>,
    /// Indices of held-out samples, in shuffled order.
    pub test: Vec<usize>,
}

/// Shuffle `0..n_samples` with a seeded generator and hold out
/// `ceil(n_samples * test_fraction)` of them.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::InvalidTestFraction`] | `test_fraction` is not strictly inside (0, 1) |
/// | [`DataError::TooFewSamples`] | either side would be empty |
pub fn train_test_split(
    n_samples: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, DataError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DataError::InvalidTestFraction { test_fraction });
    }
    let n_test = (n_samples as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(DataError::TooFewSamples { n_samples });
    }

    let mut order: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(n_test);
    Ok(SplitIndices { train, test: order })
}
