//! Cosine-style kernel matrix normalization.

use scirs2_core::ndarray::{Array1, Array2};

/// Diagonal entries at or below this value get a zero scaling factor, so the
/// output never contains NaN or Inf.
const EPSILON: f64 = 1e-20;

/// Normalize a kernel matrix by dividing through the square root product of
/// the corresponding diagonal entries:
///
/// `K'[i, j] = K[i, j] / sqrt(K[i, i] * K[j, j])`
///
/// This is not a linear operation, so callers treat it as a hyperparameter.
/// Indices whose diagonal entry is tiny, zero, or negative are treated as
/// invalid and mapped to a zero scaling factor, which zeroes every output
/// entry touching that index. The input is never mutated; the result is a
/// freshly allocated matrix.
pub fn normalize(matrix: &Array2<f64>) -> Array2<f64> {
    let n = matrix.nrows();

    let mut scale = Array1::<f64>::zeros(n);
    for i in 0..n {
        let d = matrix[[i, i]];
        if d > EPSILON {
            scale[i] = 1.0 / d.sqrt();
        }
    }

    Array2::from_shape_fn((n, n), |(i, j)| matrix[[i, j]] * scale[i] * scale[j])
}
