//! Inner model selection over configurations and kernel matrices.
//!
//! This is the grid search at the heart of the nested cross-validation: it
//! only ever sees the outer training indices, so test information cannot
//! leak into the choice of configuration.

use crate::{
    accuracy, cross_block, normalize, restrict, subset_labels, EvalError, EvalResult,
    KernelClassifier, KernelMatrixCollection, ParamGrid, SelectedConfig, StratifiedKFold,
};
use scirs2_core::ndarray::Array2;

/// Fixed seed for the inner splitter, so repeated selector invocations on
/// the same inputs are deterministic.
pub const SELECTION_SEED: u64 = 42;

/// Winning outcome of an inner selection run.
pub struct Selection {
    /// An unfit clone of the template, configured with the winning
    /// regularization strength. Must be refit before predicting.
    pub classifier: Box<dyn KernelClassifier>,
    /// The winning matrix at full dataset size, freshly normalized if the
    /// winning configuration requires it. Owned, never aliased into the
    /// collection.
    pub matrix: Array2<f64>,
    /// The winning configuration, including the matrix key that achieved it.
    pub config: SelectedConfig,
    /// Mean inner cross-validated accuracy of the winning pair.
    pub mean_accuracy: f64,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("matrix", &self.matrix)
            .field("config", &self.config)
            .field("mean_accuracy", &self.mean_accuracy)
            .finish_non_exhaustive()
    }
}

struct Candidate {
    config: SelectedConfig,
    mean_accuracy: f64,
}

/// Search over {matrix × normalize flag × regularization} for the
/// combination with the best mean inner cross-validated accuracy.
///
/// `train_indices` is the leakage boundary: every matrix is restricted to
/// `train_indices × train_indices` before anything downstream can touch it,
/// and the inner splitter produces positions relative to that restriction.
///
/// The configuration loop is the outer one so that the normalization flag
/// applies uniformly per parameter set. Ties keep the first-seen
/// (configuration, matrix) pair under iteration order; iteration order over
/// matrices is the collection's sorted key order.
///
/// Fails with [`EvalError::SelectionExhausted`] when there is nothing to
/// evaluate: an empty grid or a collection without matrices.
pub fn select(
    template: &dyn KernelClassifier,
    train_indices: &[usize],
    n_folds: usize,
    grid: &ParamGrid,
    collection: &KernelMatrixCollection,
) -> EvalResult<Selection> {
    let y_train = subset_labels(collection.labels(), train_indices);

    let mut best: Option<Candidate> = None;

    for configuration in grid.iter() {
        for (key, matrix) in collection.matrices() {
            // Restricting first makes test rows structurally unreachable.
            let mut k = restrict(matrix, train_indices);
            if configuration.normalize {
                k = normalize(&k);
            }

            // The splitter is rebuilt per pair: splits are a finite,
            // freshly-computed sequence, identical across pairs thanks to
            // the fixed seed.
            let cv = StratifiedKFold::new(n_folds)?.with_seed(SELECTION_SEED);
            let folds = cv.split(&y_train)?;

            let mut accuracy_sum = 0.0;
            for (inner_train, inner_test) in &folds {
                // Positions here are relative to `train_indices`.
                let mut clf = template.fresh_clone();
                clf.set_c(configuration.c);

                let k_inner = restrict(&k, inner_train);
                let y_inner = subset_labels(&y_train, inner_train);
                clf.fit(k_inner.view(), &y_inner)?;

                let k_validation = cross_block(&k, inner_test, inner_train);
                let predictions = clf.predict(k_validation.view())?;
                let y_validation = subset_labels(&y_train, inner_test);
                accuracy_sum += accuracy(&y_validation, &predictions);
            }
            let mean_accuracy = accuracy_sum / folds.len() as f64;

            let improves = match &best {
                None => true,
                Some(candidate) => mean_accuracy > candidate.mean_accuracy,
            };
            if improves {
                best = Some(Candidate {
                    config: SelectedConfig {
                        matrix_key: key.clone(),
                        c: configuration.c,
                        normalize: configuration.normalize,
                    },
                    mean_accuracy,
                });
            }
        }
    }

    let best = best.ok_or_else(|| {
        EvalError::SelectionExhausted(format!(
            "no candidate evaluated for kernel '{}' ({} configurations, {} matrices)",
            collection.kernel_name(),
            grid.len(),
            collection.len()
        ))
    })?;

    let mut classifier = template.fresh_clone();
    classifier.set_c(best.config.c);

    let matrix = collection
        .get(&best.config.matrix_key)
        .ok_or_else(|| {
            EvalError::InvalidParameter(format!(
                "winning matrix key '{}' disappeared from the collection",
                best.config.matrix_key
            ))
        })?;
    // Recompute the transform on the full matrix instead of caching the
    // restricted copy: refitting slices with absolute indices.
    let matrix = if best.config.normalize {
        normalize(matrix)
    } else {
        matrix.clone()
    };

    Ok(Selection {
        classifier,
        matrix,
        config: best.config,
        mean_accuracy: best.mean_accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrecomputedSvc;
    use scirs2_core::ndarray::Array2;
    use std::collections::BTreeMap;

    fn block_kernel(labels: &[i64]) -> Array2<f64> {
        Array2::from_shape_fn((labels.len(), labels.len()), |(i, j)| {
            if labels[i] == labels[j] {
                1.0
            } else {
                0.0
            }
        })
    }

    fn labels() -> Vec<i64> {
        vec![0, 1, 0, 1, 0, 1, 0, 1]
    }

    fn collection_with(matrices: BTreeMap<String, Array2<f64>>) -> KernelMatrixCollection {
        KernelMatrixCollection::new("test", matrices, labels()).unwrap()
    }

    #[test]
    fn test_empty_grid_fails() {
        let mut matrices = BTreeMap::new();
        matrices.insert("K".to_string(), block_kernel(&labels()));
        let collection = collection_with(matrices);

        let template = PrecomputedSvc::new(1000);
        let err = select(
            &template,
            &[0, 1, 2, 3, 4, 5],
            2,
            &ParamGrid::empty(),
            &collection,
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::SelectionExhausted(_)));
    }

    #[test]
    fn test_no_matrices_fails() {
        let collection = collection_with(BTreeMap::new());
        let template = PrecomputedSvc::new(1000);
        let err = select(
            &template,
            &[0, 1, 2, 3, 4, 5],
            2,
            &ParamGrid::new(&[1.0]),
            &collection,
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::SelectionExhausted(_)));
    }

    #[test]
    fn test_informative_matrix_wins() {
        let y = labels();
        let mut matrices = BTreeMap::new();
        // "a" carries no class information, "b" separates perfectly.
        matrices.insert("a".to_string(), Array2::<f64>::ones((y.len(), y.len())));
        matrices.insert("b".to_string(), block_kernel(&y));
        let collection = collection_with(matrices);

        let template = PrecomputedSvc::new(10_000);
        let selection = select(
            &template,
            &[0, 1, 2, 3, 4, 5, 6, 7],
            2,
            &ParamGrid::new(&[1.0]),
            &collection,
        )
        .unwrap();

        assert_eq!(selection.config.matrix_key, "b");
        assert!((selection.mean_accuracy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let y = labels();
        // Two identical perfect matrices: the first key in sorted order wins.
        let mut matrices = BTreeMap::new();
        matrices.insert("a".to_string(), block_kernel(&y));
        matrices.insert("b".to_string(), block_kernel(&y));
        let collection = collection_with(matrices);

        let template = PrecomputedSvc::new(10_000);
        let selection = select(
            &template,
            &[0, 1, 2, 3, 4, 5, 6, 7],
            2,
            &ParamGrid::new(&[1.0, 10.0]),
            &collection,
        )
        .unwrap();

        assert_eq!(selection.config.matrix_key, "a");
        assert!((selection.config.c - 1.0).abs() < 1e-12);
        assert!(!selection.config.normalize);
    }

    #[test]
    fn test_selector_is_deterministic() {
        let y = labels();
        let mut matrices = BTreeMap::new();
        matrices.insert("K".to_string(), block_kernel(&y));
        let collection = collection_with(matrices);

        let template = PrecomputedSvc::new(10_000);
        let grid = ParamGrid::default_svc();
        let train = [0, 1, 2, 3, 4, 5];

        let first = select(&template, &train, 2, &grid, &collection).unwrap();
        let second = select(&template, &train, 2, &grid, &collection).unwrap();
        assert_eq!(first.config, second.config);
        assert_eq!(first.mean_accuracy, second.mean_accuracy);
        assert_eq!(first.matrix, second.matrix);
    }
}
