//! Repeated evaluation over iterations, folds, and kernels.

use crate::{
    evaluate, subset_labels, EvalError, EvalResult, KernelClassifier, KernelMatrixCollection,
    ParamGrid, PrecomputedSvc, Report, StratifiedKFold,
};
use std::collections::BTreeMap;
use std::time::Instant;

/// Run parameters for the repeated evaluation driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Dataset name recorded in the report.
    pub name: String,
    /// Number of outer iterations, each with its own splits.
    pub n_iterations: usize,
    /// Number of outer folds per iteration.
    pub n_folds: usize,
    /// Number of folds used inside model selection.
    pub inner_folds: usize,
    /// Iteration cap passed to the classifier.
    pub max_iterations: usize,
    /// Base seed; iteration `i` uses seed `base_seed + i`.
    pub base_seed: u64,
    /// Whether to record absolute train/test indices (large).
    pub with_indices: bool,
    /// Configuration grid for the inner selection.
    pub grid: ParamGrid,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            n_iterations: 10,
            n_folds: 10,
            inner_folds: 5,
            max_iterations: 100_000,
            base_seed: 42,
            with_indices: false,
            grid: ParamGrid::default_svc(),
        }
    }
}

/// Orchestrates repeated stratified k-fold evaluation across kernels.
///
/// Splits depend only on the iteration seed, never on the kernel, so every
/// kernel is compared on identical folds within an iteration. Collections
/// are read-only for the whole run.
pub struct Driver {
    config: DriverConfig,
    template: Box<dyn KernelClassifier>,
}

impl Driver {
    /// Create a driver using the default precomputed-kernel SVC with the
    /// configured iteration cap.
    pub fn new(config: DriverConfig) -> Self {
        let template = Box::new(PrecomputedSvc::new(config.max_iterations));
        Self { config, template }
    }

    /// Create a driver around a custom classifier template.
    pub fn with_classifier(config: DriverConfig, template: Box<dyn KernelClassifier>) -> Self {
        Self { config, template }
    }

    /// Check that every collection agrees on N and on the label vector.
    ///
    /// Returns the shared labels. Per-collection shape checks already ran
    /// at construction; this verifies cross-kernel consistency.
    fn validate<'a>(
        &self,
        collections: &'a BTreeMap<String, KernelMatrixCollection>,
    ) -> EvalResult<&'a [i64]> {
        let mut established: Option<(&str, &[i64])> = None;

        for (name, collection) in collections {
            match established {
                None => established = Some((name, collection.labels())),
                Some((first, labels)) => {
                    if collection.n() != labels.len() {
                        return Err(EvalError::ShapeMismatch {
                            kernel: name.clone(),
                            key: "y".to_string(),
                            expected: vec![labels.len()],
                            got: vec![collection.n()],
                        });
                    }
                    if collection.labels() != labels {
                        return Err(EvalError::InvalidParameter(format!(
                            "label vector of kernel '{name}' disagrees with kernel '{first}'"
                        )));
                    }
                }
            }
        }

        established
            .map(|(_, labels)| labels)
            .ok_or_else(|| EvalError::InvalidParameter("no kernel collections given".to_string()))
    }

    /// Run the complete evaluation and aggregate a report.
    pub fn run(
        &self,
        collections: &BTreeMap<String, KernelMatrixCollection>,
    ) -> EvalResult<Report> {
        let labels = self.validate(collections)?;
        let start = Instant::now();
        let mut report = Report::new(&self.config.name);

        for (kernel_name, collection) in collections {
            tracing::info!(kernel = %kernel_name, "evaluating kernel");

            for iteration in 0..self.config.n_iterations {
                tracing::info!(
                    iteration = iteration + 1,
                    total = self.config.n_iterations,
                    "iteration"
                );

                // Seeded per iteration and shared across kernels, so all
                // kernels see identical splits within an iteration.
                let cv = StratifiedKFold::new(self.config.n_folds)?
                    .with_seed(self.config.base_seed + iteration as u64);

                for (fold, (train_indices, test_indices)) in
                    cv.split(labels)?.into_iter().enumerate()
                {
                    tracing::info!(fold = fold + 1, total = self.config.n_folds, "fold");

                    let result = evaluate(
                        self.template.as_ref(),
                        &train_indices,
                        &test_indices,
                        collection,
                        &self.config.grid,
                        self.config.inner_folds,
                    )?;

                    // Fold bookkeeping is identical for every kernel in the
                    // iteration; writing it again is harmless.
                    let record = report.fold_record_mut(iteration, fold);
                    record.y_test = subset_labels(labels, &test_indices);
                    if self.config.with_indices {
                        record.train_indices = Some(train_indices.clone());
                        record.test_indices = Some(test_indices.clone());
                    }

                    report.record(iteration, fold, kernel_name, result)?;
                }
            }
        }

        report.runtime = start.elapsed().as_secs_f64();
        report.max_iterations = self.config.max_iterations;
        Ok(report)
    }
}
