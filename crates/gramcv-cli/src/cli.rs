//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Evaluate precomputed kernel matrices with nested cross-validation.
///
/// Each MATRIX argument is one kernel archive: a JSON object (optionally
/// gzip-compressed) with one N×N array per hyperparameter value plus the
/// label vector under the reserved key "y". The kernel name is the file
/// stem.
#[derive(Debug, Parser)]
#[command(name = "gramcv", version, about)]
pub struct Cli {
    /// Input kernel archives, one per kernel.
    #[arg(required = true, value_name = "MATRIX")]
    pub matrices: Vec<PathBuf>,

    /// Dataset name recorded in the report.
    #[arg(short, long)]
    pub name: String,

    /// Output file for the JSON report.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Overwrite the output file if it exists.
    #[arg(short, long)]
    pub force: bool,

    /// Store absolute train/test indices in the report (large!).
    #[arg(short = 'i', long)]
    pub with_indices: bool,

    /// Maximum number of solver iterations for the classifier.
    #[arg(short = 'I', long, default_value_t = 100_000)]
    pub max_iterations: usize,

    /// Number of outer iterations.
    #[arg(long, default_value_t = 10)]
    pub iterations: usize,

    /// Number of outer folds per iteration.
    #[arg(long, default_value_t = 10)]
    pub folds: usize,

    /// Number of folds inside model selection.
    #[arg(long, default_value_t = 5)]
    pub inner_folds: usize,

    /// Base random seed; iteration i uses seed + i.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
