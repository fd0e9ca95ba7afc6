//! Stratified k-fold splitting.
//!
//! Each fold's label distribution approximates the whole: positions are
//! grouped per class, shuffled with a seeded RNG, and dealt into folds with
//! per-class proportional allocation. Splits are recomputed freshly on every
//! call and are fully determined by the seed.

use crate::{EvalError, EvalResult};
use scirs2_core::random::{Rng, SeedableRng, StdRng};
use std::collections::BTreeMap;

/// Stratified K-fold splitter.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    /// Number of folds.
    pub n_folds: usize,
    /// Whether to shuffle positions within each class before dealing.
    pub shuffle: bool,
    /// Random seed for shuffling.
    pub seed: u64,
}

impl StratifiedKFold {
    /// Create a new stratified K-fold splitter.
    ///
    /// # Arguments
    /// * `n_folds` - Number of folds (must be >= 2)
    pub fn new(n_folds: usize) -> EvalResult<Self> {
        if n_folds < 2 {
            return Err(EvalError::InvalidParameter(
                "n_folds must be at least 2".to_string(),
            ));
        }
        Ok(Self {
            n_folds,
            shuffle: true,
            seed: 42,
        })
    }

    /// Set the random seed for shuffling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Compute all folds over `0..labels.len()`.
    ///
    /// Returns one `(train_positions, test_positions)` pair per fold, both
    /// sorted ascending. The pairs partition the position range exactly:
    /// within a fold, train and test are disjoint and their union covers
    /// every position; across folds, every position lands in the test set
    /// exactly once.
    pub fn split(&self, labels: &[i64]) -> EvalResult<Vec<(Vec<usize>, Vec<usize>)>> {
        // Group positions by class in sorted label order so the result does
        // not depend on hash iteration order.
        let mut class_positions: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (position, &label) in labels.iter().enumerate() {
            class_positions.entry(label).or_default().push(position);
        }

        for (label, positions) in &class_positions {
            if positions.len() < self.n_folds {
                return Err(EvalError::InvalidParameter(format!(
                    "class {} has {} members, fewer than n_folds = {}",
                    label,
                    positions.len(),
                    self.n_folds
                )));
            }
        }

        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed);
            for positions in class_positions.values_mut() {
                for i in (1..positions.len()).rev() {
                    let j = rng.gen_range(0..=i);
                    positions.swap(i, j);
                }
            }
        }

        // Deal each class into the folds; earlier folds absorb the
        // remainder, as in the plain K-fold allocation.
        let mut test_folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_folds];
        for positions in class_positions.values() {
            let class_size = positions.len();
            let fold_size = class_size / self.n_folds;
            let remainder = class_size % self.n_folds;

            let mut fold_sizes = vec![fold_size; self.n_folds];
            for size in fold_sizes.iter_mut().take(remainder) {
                *size += 1;
            }

            let mut offset = 0;
            for (fold, size) in fold_sizes.iter().enumerate() {
                test_folds[fold].extend_from_slice(&positions[offset..offset + size]);
                offset += size;
            }
        }

        let mut splits = Vec::with_capacity(self.n_folds);
        for fold in 0..self.n_folds {
            let mut test = test_folds[fold].clone();
            test.sort_unstable();

            let mut train: Vec<usize> = test_folds
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != fold)
                .flat_map(|(_, positions)| positions.iter().copied())
                .collect();
            train.sort_unstable();

            splits.push((train, test));
        }

        Ok(splits)
    }
}
