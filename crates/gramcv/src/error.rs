//! Error types for kernel matrix evaluation.

use thiserror::Error;

/// Errors that can occur while evaluating kernel matrices.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Two matrices, or a matrix and the label vector, disagree in size.
    #[error(
        "shape mismatch in kernel '{kernel}', matrix '{key}': expected {expected:?}, got {got:?}"
    )]
    ShapeMismatch {
        kernel: String,
        key: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Model selection finished without evaluating a single candidate.
    #[error("model selection exhausted: {0}")]
    SelectionExhausted(String),

    /// A result slot for (iteration, fold, kernel) was written twice.
    #[error("duplicate result for iteration {iteration}, fold {fold}, kernel '{kernel}'")]
    DuplicateResult {
        iteration: usize,
        fold: usize,
        kernel: String,
    },

    /// Error with invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;
