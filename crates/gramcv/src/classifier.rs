//! Precomputed-kernel classifiers.
//!
//! The trait is the seam between model selection and the actual learner:
//! selection only needs to spawn unfit clones, set the regularization
//! strength, fit on a kernel submatrix, and predict labels/scores from a
//! test-against-support kernel block.

use crate::{EvalError, EvalResult};
use scirs2_core::ndarray::{Array2, ArrayView2};

/// Contract for classifiers operating on precomputed similarity matrices.
///
/// `fit` receives the `train × train` kernel block; `predict` and
/// `predict_proba` receive a `rows × train` block whose columns are aligned
/// with the training support set. Score columns follow the sorted class
/// order reported by [`KernelClassifier::classes`].
pub trait KernelClassifier {
    /// Create a boxed clone configured identically to `self` but with no
    /// trained state. Selection spawns one per inner fold so folds cannot
    /// share fit state.
    fn fresh_clone(&self) -> Box<dyn KernelClassifier>;

    /// Set the regularization strength.
    fn set_c(&mut self, c: f64);

    /// Fit on a square kernel block and its labels.
    fn fit(&mut self, kernel: ArrayView2<f64>, labels: &[i64]) -> EvalResult<()>;

    /// Predict one label per kernel row.
    fn predict(&self, kernel: ArrayView2<f64>) -> EvalResult<Vec<i64>>;

    /// Predict class probabilities, one row per kernel row and one column
    /// per class in sorted class order.
    fn predict_proba(&self, kernel: ArrayView2<f64>) -> EvalResult<Array2<f64>>;

    /// Sorted distinct classes seen during fit; empty before fitting.
    fn classes(&self) -> &[i64];
}

/// Support-vector classifier for precomputed kernels.
///
/// Trained with a deterministic Pegasos-style subgradient loop on the hinge
/// loss in the dual, one-vs-rest for multi-class problems, with balanced
/// class weighting. The iteration cap bounds the solver; hitting it yields a
/// well-defined (possibly suboptimal) model rather than an error. Training
/// cycles through examples in a fixed order, so fitting is fully
/// reproducible without any RNG.
#[derive(Debug, Clone)]
pub struct PrecomputedSvc {
    c: f64,
    max_iterations: usize,
    fitted: Option<FitState>,
}

#[derive(Debug, Clone)]
struct FitState {
    classes: Vec<i64>,
    /// Positive class of each one-vs-rest machine. One machine for binary
    /// problems, one per class otherwise.
    machines: Vec<i64>,
    /// Scaled dual coefficients, `(n_train, machines)`.
    coefficients: Array2<f64>,
}

impl PrecomputedSvc {
    /// Create an unfit classifier with `c = 1.0` and the given iteration cap.
    pub fn new(max_iterations: usize) -> Self {
        Self {
            c: 1.0,
            max_iterations,
            fitted: None,
        }
    }

    /// Set the regularization strength.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// The configured iteration cap.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    fn train_binary(&self, kernel: ArrayView2<f64>, labels: &[i64], positive: i64) -> Vec<f64> {
        let n = labels.len();
        let signs: Vec<f64> = labels
            .iter()
            .map(|&label| if label == positive { 1.0 } else { -1.0 })
            .collect();

        let n_pos = signs.iter().filter(|&&s| s > 0.0).count();
        let n_neg = n - n_pos;
        // Balanced class weights: n / (2 * class count).
        let w_pos = n as f64 / (2.0 * n_pos as f64);
        let w_neg = n as f64 / (2.0 * n_neg as f64);

        let lambda = 1.0 / (self.c * n as f64);
        // The cap is a safety valve; small problems converge long before it.
        let rounds = self.max_iterations.min(50 * n);

        let mut beta = vec![0.0; n];
        if rounds == 0 {
            return beta;
        }

        for t in 1..=rounds {
            let i = (t - 1) % n;
            let mut acc = 0.0;
            for j in 0..n {
                acc += beta[j] * kernel[[i, j]];
            }
            let margin = signs[i] * acc / (lambda * t as f64);
            if margin < 1.0 {
                let weight = if signs[i] > 0.0 { w_pos } else { w_neg };
                beta[i] += signs[i] * weight;
            }
        }

        let scale = 1.0 / (lambda * rounds as f64);
        beta.iter().map(|b| b * scale).collect()
    }

    fn state(&self) -> EvalResult<&FitState> {
        self.fitted
            .as_ref()
            .ok_or_else(|| EvalError::InvalidParameter("classifier is not fitted".to_string()))
    }

    /// Raw decision values, one column per class in sorted class order.
    fn decision_values(&self, kernel: ArrayView2<f64>) -> EvalResult<Array2<f64>> {
        let state = self.state()?;
        let n_rows = kernel.nrows();
        let n_classes = state.classes.len();

        if kernel.ncols() != state.coefficients.nrows() {
            return Err(EvalError::InvalidParameter(format!(
                "kernel block has {} columns but the support set has {} items",
                kernel.ncols(),
                state.coefficients.nrows()
            )));
        }

        let mut decisions = Array2::<f64>::zeros((n_rows, n_classes));
        if state.machines.is_empty() {
            return Ok(decisions);
        }

        for row in 0..n_rows {
            if state.machines.len() == 1 {
                // Binary: a single machine for the greater class.
                let mut f = 0.0;
                for j in 0..kernel.ncols() {
                    f += kernel[[row, j]] * state.coefficients[[j, 0]];
                }
                decisions[[row, 0]] = -f;
                decisions[[row, 1]] = f;
            } else {
                for (m, _) in state.machines.iter().enumerate() {
                    let mut f = 0.0;
                    for j in 0..kernel.ncols() {
                        f += kernel[[row, j]] * state.coefficients[[j, m]];
                    }
                    decisions[[row, m]] = f;
                }
            }
        }

        Ok(decisions)
    }
}

impl Default for PrecomputedSvc {
    fn default() -> Self {
        Self::new(100_000)
    }
}

impl KernelClassifier for PrecomputedSvc {
    fn fresh_clone(&self) -> Box<dyn KernelClassifier> {
        Box::new(Self {
            c: self.c,
            max_iterations: self.max_iterations,
            fitted: None,
        })
    }

    fn set_c(&mut self, c: f64) {
        self.c = c;
    }

    fn fit(&mut self, kernel: ArrayView2<f64>, labels: &[i64]) -> EvalResult<()> {
        let n = labels.len();
        if n == 0 {
            return Err(EvalError::InvalidParameter(
                "cannot fit on an empty training set".to_string(),
            ));
        }
        if kernel.nrows() != n || kernel.ncols() != n {
            return Err(EvalError::InvalidParameter(format!(
                "training kernel block is {:?}, expected [{n}, {n}]",
                kernel.shape()
            )));
        }

        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let machines: Vec<i64> = match classes.len() {
            0 | 1 => Vec::new(),
            2 => vec![classes[1]],
            _ => classes.clone(),
        };

        let mut coefficients = Array2::<f64>::zeros((n, machines.len()));
        for (m, &positive) in machines.iter().enumerate() {
            let coef = self.train_binary(kernel, labels, positive);
            for (j, value) in coef.into_iter().enumerate() {
                coefficients[[j, m]] = value;
            }
        }

        self.fitted = Some(FitState {
            classes,
            machines,
            coefficients,
        });
        Ok(())
    }

    fn predict(&self, kernel: ArrayView2<f64>) -> EvalResult<Vec<i64>> {
        let state = self.state()?;
        if state.machines.is_empty() {
            // Degenerate single-class training set.
            return Ok(vec![state.classes[0]; kernel.nrows()]);
        }

        let decisions = self.decision_values(kernel)?;
        let mut predictions = Vec::with_capacity(kernel.nrows());
        for row in 0..decisions.nrows() {
            let mut best = 0;
            for col in 1..decisions.ncols() {
                if decisions[[row, col]] > decisions[[row, best]] {
                    best = col;
                }
            }
            predictions.push(state.classes[best]);
        }
        Ok(predictions)
    }

    fn predict_proba(&self, kernel: ArrayView2<f64>) -> EvalResult<Array2<f64>> {
        let state = self.state()?;
        let n_rows = kernel.nrows();
        let n_classes = state.classes.len();

        if state.machines.is_empty() {
            return Ok(Array2::from_elem((n_rows, n_classes.max(1)), 1.0));
        }

        let decisions = self.decision_values(kernel)?;
        let mut probabilities = Array2::<f64>::zeros((n_rows, n_classes));

        for row in 0..n_rows {
            if n_classes == 2 {
                let p = 1.0 / (1.0 + (-decisions[[row, 1]]).exp());
                probabilities[[row, 0]] = 1.0 - p;
                probabilities[[row, 1]] = p;
            } else {
                // Softmax with max subtraction for numerical stability.
                let mut max = f64::NEG_INFINITY;
                for col in 0..n_classes {
                    max = max.max(decisions[[row, col]]);
                }
                let mut sum = 0.0;
                for col in 0..n_classes {
                    let e = (decisions[[row, col]] - max).exp();
                    probabilities[[row, col]] = e;
                    sum += e;
                }
                for col in 0..n_classes {
                    probabilities[[row, col]] /= sum;
                }
            }
        }

        Ok(probabilities)
    }

    fn classes(&self) -> &[i64] {
        self.fitted
            .as_ref()
            .map(|state| state.classes.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray::Array2;

    /// Block kernel: 1 if both items share a class, else 0.
    fn block_kernel(labels: &[i64]) -> Array2<f64> {
        Array2::from_shape_fn((labels.len(), labels.len()), |(i, j)| {
            if labels[i] == labels[j] {
                1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_binary_separable() {
        let labels = vec![0, 0, 0, 1, 1, 1];
        let kernel = block_kernel(&labels);

        let mut clf = PrecomputedSvc::new(100_000);
        clf.fit(kernel.view(), &labels).unwrap();
        assert_eq!(clf.classes(), &[0, 1]);

        let predictions = clf.predict(kernel.view()).unwrap();
        assert_eq!(predictions, labels);
    }

    #[test]
    fn test_multiclass_separable() {
        let labels = vec![0, 0, 1, 1, 2, 2];
        let kernel = block_kernel(&labels);

        let mut clf = PrecomputedSvc::new(100_000);
        clf.fit(kernel.view(), &labels).unwrap();

        let predictions = clf.predict(kernel.view()).unwrap();
        assert_eq!(predictions, labels);
    }

    #[test]
    fn test_proba_rows_sum_to_one() {
        let labels = vec![0, 0, 1, 1, 2, 2];
        let kernel = block_kernel(&labels);

        let mut clf = PrecomputedSvc::new(100_000);
        clf.fit(kernel.view(), &labels).unwrap();

        let probabilities = clf.predict_proba(kernel.view()).unwrap();
        assert_eq!(probabilities.ncols(), 3);
        for row in 0..probabilities.nrows() {
            let sum: f64 = (0..3).map(|col| probabilities[[row, col]]).sum();
            assert!((sum - 1.0).abs() < 1e-9);
            for col in 0..3 {
                assert!(probabilities[[row, col]] >= 0.0);
            }
        }
    }

    #[test]
    fn test_binary_proba_ranks_positive_class() {
        let labels = vec![0, 0, 0, 1, 1, 1];
        let kernel = block_kernel(&labels);

        let mut clf = PrecomputedSvc::new(100_000);
        clf.fit(kernel.view(), &labels).unwrap();

        let probabilities = clf.predict_proba(kernel.view()).unwrap();
        // Positive-class column scores higher for positive items.
        for i in 0..3 {
            assert!(probabilities[[i + 3, 1]] > probabilities[[i, 1]]);
        }
    }

    #[test]
    fn test_single_class_degenerate() {
        let labels = vec![7, 7, 7];
        let kernel = block_kernel(&labels);

        let mut clf = PrecomputedSvc::new(1000);
        clf.fit(kernel.view(), &labels).unwrap();
        assert_eq!(clf.predict(kernel.view()).unwrap(), vec![7, 7, 7]);
    }

    #[test]
    fn test_unfitted_predict_fails() {
        let clf = PrecomputedSvc::default();
        assert!(clf.predict(Array2::<f64>::zeros((2, 2)).view()).is_err());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let labels = vec![0, 1, 0, 1, 0, 1];
        let kernel = block_kernel(&labels);

        let mut a = PrecomputedSvc::new(10_000).with_c(0.1);
        let mut b = PrecomputedSvc::new(10_000).with_c(0.1);
        a.fit(kernel.view(), &labels).unwrap();
        b.fit(kernel.view(), &labels).unwrap();

        assert_eq!(
            a.predict_proba(kernel.view()).unwrap(),
            b.predict_proba(kernel.view()).unwrap()
        );
    }

    #[test]
    fn test_iteration_cap_is_respected() {
        let labels = vec![0, 0, 1, 1];
        let kernel = block_kernel(&labels);

        // A tiny cap must still produce a usable model, not an error.
        let mut clf = PrecomputedSvc::new(3);
        clf.fit(kernel.view(), &labels).unwrap();
        let predictions = clf.predict(kernel.view()).unwrap();
        assert_eq!(predictions.len(), 4);
    }
}
