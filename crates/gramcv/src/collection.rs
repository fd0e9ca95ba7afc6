//! Kernel matrix collections and index bookkeeping.
//!
//! A [`KernelMatrixCollection`] holds every parameterization of one kernel
//! (one square matrix per hyperparameter value) together with the label
//! vector of the dataset. The collection is read-only for the whole run;
//! the slicing helpers below always produce owned arrays so that one
//! evaluation's transform can never alias into another's view of the same
//! base matrix.

use crate::{EvalError, EvalResult};
use scirs2_core::ndarray::Array2;
use std::collections::BTreeMap;

/// Reserved archive key holding the label vector instead of a matrix.
pub const LABEL_KEY: &str = "y";

/// All parameterizations of a single kernel, plus the dataset labels.
///
/// Invariant: every matrix is N×N and `labels.len() == N`. Construction
/// validates this and fails fast with [`EvalError::ShapeMismatch`], so no
/// split is ever attempted on inconsistent data.
#[derive(Debug, Clone)]
pub struct KernelMatrixCollection {
    kernel_name: String,
    matrices: BTreeMap<String, Array2<f64>>,
    labels: Vec<i64>,
}

impl KernelMatrixCollection {
    /// Create a collection, validating that all matrices are square and
    /// agree with the label vector on N.
    pub fn new(
        kernel_name: impl Into<String>,
        matrices: BTreeMap<String, Array2<f64>>,
        labels: Vec<i64>,
    ) -> EvalResult<Self> {
        let kernel_name = kernel_name.into();
        let n = labels.len();

        for (key, matrix) in &matrices {
            let shape = matrix.shape().to_vec();
            if shape != [n, n] {
                return Err(EvalError::ShapeMismatch {
                    kernel: kernel_name,
                    key: key.clone(),
                    expected: vec![n, n],
                    got: shape,
                });
            }
        }

        Ok(Self {
            kernel_name,
            matrices,
            labels,
        })
    }

    /// Name of the kernel this collection belongs to.
    pub fn kernel_name(&self) -> &str {
        &self.kernel_name
    }

    /// Number of dataset items N.
    pub fn n(&self) -> usize {
        self.labels.len()
    }

    /// The label vector, index-aligned with every matrix.
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Sorted distinct class labels of the dataset.
    pub fn classes(&self) -> Vec<i64> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    /// Iterate over (parameter key, matrix) pairs in sorted key order.
    pub fn matrices(&self) -> impl Iterator<Item = (&String, &Array2<f64>)> {
        self.matrices.iter()
    }

    /// Look up a matrix by parameter key.
    pub fn get(&self, key: &str) -> Option<&Array2<f64>> {
        self.matrices.get(key)
    }

    /// Number of candidate matrices.
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Whether the collection holds no matrices.
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

/// Restrict a matrix to `indices × indices`, in that order.
///
/// Produces an owned copy, never a view into `matrix`.
pub fn restrict(matrix: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    cross_block(matrix, indices, indices)
}

/// Slice the `rows × cols` block of a matrix into an owned array.
///
/// Used for the test-against-training-support block that precomputed-kernel
/// classifiers require at prediction time.
pub fn cross_block(matrix: &Array2<f64>, rows: &[usize], cols: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), cols.len()), |(i, j)| {
        matrix[[rows[i], cols[j]]]
    })
}

/// Select label entries by index, preserving index order.
pub fn subset_labels(labels: &[i64], indices: &[usize]) -> Vec<i64> {
    indices.iter().map(|&i| labels[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray::array;

    #[test]
    fn test_collection_valid() {
        let mut matrices = BTreeMap::new();
        matrices.insert("0.5".to_string(), Array2::eye(3));
        matrices.insert("1.0".to_string(), Array2::ones((3, 3)));

        let collection =
            KernelMatrixCollection::new("wl", matrices, vec![0, 1, 0]).unwrap();
        assert_eq!(collection.n(), 3);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.classes(), vec![0, 1]);

        let keys: Vec<&String> = collection.matrices().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["0.5", "1.0"]);
    }

    #[test]
    fn test_collection_mixed_shapes_rejected() {
        // One 5x5 and one 6x6 matrix sharing the same labels must be
        // rejected before any fit can happen.
        let mut matrices = BTreeMap::new();
        matrices.insert("a".to_string(), Array2::eye(5));
        matrices.insert("b".to_string(), Array2::eye(6));

        let err = KernelMatrixCollection::new("wl", matrices, vec![0, 1, 0, 1, 0]).unwrap_err();
        match err {
            EvalError::ShapeMismatch { kernel, key, expected, got } => {
                assert_eq!(kernel, "wl");
                assert_eq!(key, "b");
                assert_eq!(expected, vec![5, 5]);
                assert_eq!(got, vec![6, 6]);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_collection_non_square_rejected() {
        let mut matrices = BTreeMap::new();
        matrices.insert(
            "a".to_string(),
            Array2::from_shape_fn((2, 3), |(i, j)| (i + j) as f64),
        );
        assert!(KernelMatrixCollection::new("wl", matrices, vec![0, 1]).is_err());
    }

    #[test]
    fn test_restrict_is_owned_copy() {
        let k = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let sub = restrict(&k, &[0, 2]);
        assert_eq!(sub, array![[1.0, 3.0], [7.0, 9.0]]);
    }

    #[test]
    fn test_cross_block() {
        let k = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let block = cross_block(&k, &[1], &[0, 2]);
        assert_eq!(block, array![[4.0, 6.0]]);
    }

    #[test]
    fn test_subset_labels_preserves_order() {
        assert_eq!(subset_labels(&[5, 6, 7, 8], &[3, 0]), vec![8, 5]);
    }
}
