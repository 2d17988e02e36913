//! Random draws used by split search.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the random draws made while growing a tree.
///
/// Growth only ever asks for uniform indices and uniform subsets, so tests
/// can substitute a deterministic implementation.
pub trait RandomSource {
    /// Return a uniform index in `0..upper`. `upper` is never zero.
    fn next_index(&mut self, upper: usize) -> usize;

    /// Draw `k` distinct indices from `0..n` uniformly without replacement.
    ///
    /// Returns all `n` indices (in random order) when `k >= n`.
    fn sample_without_replacement(&mut self, n: usize, k: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        // Partial Fisher-Yates: shuffle only the first `take` positions.
        let take = k.min(n);
        for i in 0..take {
            let j = i + self.next_index(n - i);
            order.swap(i, j);
        }
        order.truncate(take);
        order
    }
}

/// [`RandomSource`] backed by a seeded ChaCha8 generator.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Create a source that yields the same draws for the same seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw a fresh seed, used to derive independent child sources.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{RandomSource, SeededRandom};

    #[test]
    fn sample_is_distinct_and_in_range() {
        let mut rng = SeededRandom::new(7);
        let picked = rng.sample_without_replacement(20, 10);
        assert_eq!(picked.len(), 10);
        let unique: HashSet<usize> = picked.iter().copied().collect();
        assert_eq!(unique.len(), 10);
        assert!(picked.iter().all(|&i| i < 20));
    }

    #[test]
    fn sample_larger_than_population_returns_everything() {
        let mut rng = SeededRandom::new(7);
        let mut picked = rng.sample_without_replacement(5, 9);
        picked.sort_unstable();
        assert_eq!(picked, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn same_seed_same_draws() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        assert_eq!(
            a.sample_without_replacement(100, 10),
            b.sample_without_replacement(100, 10)
        );
        assert_eq!(a.next_seed(), b.next_seed());
    }

    #[test]
    fn next_index_stays_below_upper() {
        let mut rng = SeededRandom::new(3);
        for upper in 1..50 {
            assert!(rng.next_index(upper) < upper);
        }
    }
}
