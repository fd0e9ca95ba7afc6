//! Aggregate result structures.
//!
//! A [`Report`] collects one [`FoldResult`] per (iteration, fold, kernel)
//! triple, built incrementally by the driver and serialized once at the end
//! of a run. Writing the same triple twice indicates a driver bug and is
//! rejected with [`EvalError::DuplicateResult`].

use crate::{EvalError, EvalResult, SelectedConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of evaluating one kernel on one outer fold.
///
/// Created once per evaluation and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    /// The configuration selected by the inner search for this fold.
    pub best_model: SelectedConfig,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    /// `None` when the measure was not computable for this fold.
    pub auroc: Option<f64>,
    /// `None` when the measure was not computable for this fold.
    pub auprc: Option<f64>,
    /// Predicted labels for the test indices, in test-index order.
    pub y_pred: Vec<i64>,
    /// Predicted class scores, one row per test index.
    pub y_score: Vec<Vec<f64>>,
}

/// Per-fold record: split bookkeeping plus one result per kernel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoldRecord {
    /// Absolute training indices; recorded only on request (large).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_indices: Option<Vec<usize>>,
    /// Absolute test indices; recorded only on request (large).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_indices: Option<Vec<usize>>,
    /// True labels of the test indices; always recorded so metrics can be
    /// reconstructed without re-deriving the splits.
    pub y_test: Vec<i64>,
    /// Results keyed by kernel name.
    pub kernels: BTreeMap<String, FoldResult>,
}

/// All folds of one outer iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub folds: BTreeMap<usize, FoldRecord>,
}

/// Aggregate report for a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Dataset name.
    pub name: String,
    pub iterations: BTreeMap<usize, IterationRecord>,
    /// Total wall time in seconds.
    pub runtime: f64,
    /// Classifier iteration cap used for the run.
    pub max_iterations: usize,
}

impl Report {
    /// Create an empty report for a dataset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iterations: BTreeMap::new(),
            runtime: 0.0,
            max_iterations: 0,
        }
    }

    /// Mutable access to a fold record, creating it on first touch.
    pub fn fold_record_mut(&mut self, iteration: usize, fold: usize) -> &mut FoldRecord {
        self.iterations
            .entry(iteration)
            .or_default()
            .folds
            .entry(fold)
            .or_default()
    }

    /// Store a kernel's result for one (iteration, fold) slot.
    ///
    /// Each (iteration, fold, kernel) triple may be written at most once.
    pub fn record(
        &mut self,
        iteration: usize,
        fold: usize,
        kernel: &str,
        result: FoldResult,
    ) -> EvalResult<()> {
        let record = self.fold_record_mut(iteration, fold);
        if record.kernels.contains_key(kernel) {
            return Err(EvalError::DuplicateResult {
                iteration,
                fold,
                kernel: kernel.to_string(),
            });
        }
        record.kernels.insert(kernel.to_string(), result);
        Ok(())
    }
}
