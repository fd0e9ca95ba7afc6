//! Configuration grids for model selection.
//!
//! A configuration couples the classifier's regularization strength with the
//! matrix preprocessing flag. Keeping these as named fields (instead of a
//! string-keyed parameter map) lets the selector hand the classifier its
//! parameters without any key filtering.

use serde::{Deserialize, Serialize};

/// A single candidate configuration in the selection grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Regularization strength for the classifier.
    pub c: f64,
    /// Whether to normalize the kernel matrix before use.
    pub normalize: bool,
}

/// A configuration extended with the matrix key that won model selection.
///
/// Immutable for the outer split it was selected for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedConfig {
    /// Parameter key of the winning kernel matrix.
    pub matrix_key: String,
    /// Regularization strength.
    pub c: f64,
    /// Whether the winning matrix is used in normalized form.
    pub normalize: bool,
}

/// An ordered grid of candidate configurations.
///
/// Iteration order is part of the contract: ties during selection keep the
/// first-seen configuration, so the grid preserves insertion order exactly.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    configs: Vec<Configuration>,
}

impl ParamGrid {
    /// Build the cross product of regularization values and the
    /// normalization flag, with `normalize` varying fastest.
    pub fn new(cs: &[f64]) -> Self {
        let mut configs = Vec::with_capacity(cs.len() * 2);
        for &c in cs {
            for normalize in [false, true] {
                configs.push(Configuration { c, normalize });
            }
        }
        Self { configs }
    }

    /// The default grid for the precomputed-kernel SVC: C in 10^-3..10^3,
    /// with and without normalization.
    pub fn default_svc() -> Self {
        let cs: Vec<f64> = (-3..=3).map(|exponent| 10f64.powi(exponent)).collect();
        Self::new(&cs)
    }

    /// An empty grid. Selection over it fails with `SelectionExhausted`.
    pub fn empty() -> Self {
        Self {
            configs: Vec::new(),
        }
    }

    /// Iterate configurations in grid order.
    pub fn iter(&self) -> impl Iterator<Item = &Configuration> {
        self.configs.iter()
    }

    /// Number of configurations.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether the grid holds no configurations.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
