//! Nested cross-validated evaluation of precomputed kernel matrices.
//!
//! This crate takes a set of kernel (Gram) matrices that all describe the
//! same dataset and searches for the best combination of matrix, similarity
//! normalization, and classifier regularization:
//! - An inner stratified cross-validation loop selects the winning
//!   configuration using training indices only, so no test information can
//!   leak into model selection.
//! - An outer repeated stratified k-fold loop refits the winning
//!   configuration per split and reports held-out metrics (accuracy, macro
//!   precision/recall, AUROC, AUPRC).
//! - A driver repeats the outer loop over many seeded iterations and many
//!   kernels and aggregates everything into a single serializable report.
//!
//! All randomness is derived from explicit seeds; given identical inputs and
//! seeds the whole pipeline is reproducible.

mod classifier;
mod collection;
mod crossval;
mod driver;
mod error;
mod evaluate;
mod grid;
mod metrics;
mod normalize;
mod report;
mod selection;

pub use classifier::{KernelClassifier, PrecomputedSvc};
pub use collection::{cross_block, restrict, subset_labels, KernelMatrixCollection, LABEL_KEY};
pub use crossval::StratifiedKFold;
pub use driver::{Driver, DriverConfig};
pub use error::{EvalError, EvalResult};
pub use evaluate::evaluate;
pub use grid::{Configuration, ParamGrid, SelectedConfig};
pub use metrics::{
    accuracy, average_precision, macro_precision, macro_recall, roc_auc, score_metrics, RocCurve,
    ScoreMetrics,
};
pub use normalize::normalize;
pub use report::{FoldRecord, FoldResult, IterationRecord, Report};
pub use selection::{select, Selection, SELECTION_SEED};
