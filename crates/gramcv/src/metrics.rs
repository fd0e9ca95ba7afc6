//! Classification metrics for held-out evaluation.
//!
//! Prediction-based measures (accuracy, macro precision/recall) are always
//! defined. Score-based measures (AUROC, AUPRC) are undefined when a fold
//! contains only one label value; those cases yield `None` and, in the
//! multi-class averaging below, the affected class is skipped rather than
//! failing the run.

use scirs2_core::ndarray::Array2;
use std::cmp::Ordering;

/// Fraction of predictions matching the true labels.
pub fn accuracy(y_true: &[i64], y_pred: &[i64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

fn observed_classes(y_true: &[i64], y_pred: &[i64]) -> Vec<i64> {
    let mut classes: Vec<i64> = y_true.iter().chain(y_pred.iter()).copied().collect();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// Macro-averaged precision over the classes observed in the fold.
///
/// A class with no predicted samples contributes 0 to the mean.
pub fn macro_precision(y_true: &[i64], y_pred: &[i64]) -> f64 {
    let classes = observed_classes(y_true, y_pred);
    if classes.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    for &class in &classes {
        let predicted = y_pred.iter().filter(|&&p| p == class).count();
        let true_positive = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t == class && p == class)
            .count();
        if predicted > 0 {
            total += true_positive as f64 / predicted as f64;
        }
    }
    total / classes.len() as f64
}

/// Macro-averaged recall over the classes observed in the fold.
///
/// A class with no true samples contributes 0 to the mean.
pub fn macro_recall(y_true: &[i64], y_pred: &[i64]) -> f64 {
    let classes = observed_classes(y_true, y_pred);
    if classes.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    for &class in &classes {
        let actual = y_true.iter().filter(|&&t| t == class).count();
        let true_positive = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t == class && p == class)
            .count();
        if actual > 0 {
            total += true_positive as f64 / actual as f64;
        }
    }
    total / classes.len() as f64
}

/// ROC curve for binary targets.
#[derive(Debug, Clone)]
pub struct RocCurve {
    /// False positive rates.
    pub fpr: Vec<f64>,
    /// True positive rates.
    pub tpr: Vec<f64>,
    /// Score thresholds, descending.
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Compute the ROC curve from positive-class scores.
    ///
    /// Returns `None` when the curve is undefined: mismatched lengths, no
    /// samples, or a single label value (no positives or no negatives).
    /// Tied scores are grouped into a single threshold step.
    pub fn compute(scores: &[f64], targets: &[bool]) -> Option<Self> {
        if scores.len() != targets.len() || scores.is_empty() {
            return None;
        }

        let num_positive = targets.iter().filter(|&&t| t).count();
        let num_negative = targets.len() - num_positive;
        if num_positive == 0 || num_negative == 0 {
            return None;
        }

        let mut indices: Vec<usize> = (0..scores.len()).collect();
        indices.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
        });

        let mut fpr = vec![0.0];
        let mut tpr = vec![0.0];
        let mut thresholds = vec![f64::INFINITY];

        let mut true_positives = 0usize;
        let mut false_positives = 0usize;

        let mut idx = 0;
        while idx < indices.len() {
            let threshold = scores[indices[idx]];
            let mut end = idx;
            while end < indices.len() && scores[indices[end]] == threshold {
                if targets[indices[end]] {
                    true_positives += 1;
                } else {
                    false_positives += 1;
                }
                end += 1;
            }

            fpr.push(false_positives as f64 / num_negative as f64);
            tpr.push(true_positives as f64 / num_positive as f64);
            thresholds.push(threshold);
            idx = end;
        }

        Some(Self {
            fpr,
            tpr,
            thresholds,
        })
    }

    /// Area under the curve via the trapezoidal rule.
    pub fn auc(&self) -> f64 {
        let mut auc = 0.0;
        for i in 1..self.fpr.len() {
            let width = self.fpr[i] - self.fpr[i - 1];
            let height = (self.tpr[i] + self.tpr[i - 1]) / 2.0;
            auc += width * height;
        }
        auc
    }
}

/// AUROC for binary targets, `None` when undefined.
pub fn roc_auc(scores: &[f64], targets: &[bool]) -> Option<f64> {
    RocCurve::compute(scores, targets).map(|curve| curve.auc())
}

/// Average precision (area under the precision-recall curve) for binary
/// targets, `None` when there are no positive samples.
pub fn average_precision(scores: &[f64], targets: &[bool]) -> Option<f64> {
    if scores.len() != targets.len() || scores.is_empty() {
        return None;
    }
    let num_positive = targets.iter().filter(|&&t| t).count();
    if num_positive == 0 {
        return None;
    }

    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut true_positives = 0usize;
    let mut false_positives = 0usize;
    let mut average = 0.0;
    let mut previous_recall = 0.0;

    let mut idx = 0;
    while idx < indices.len() {
        let threshold = scores[indices[idx]];
        let mut end = idx;
        while end < indices.len() && scores[indices[end]] == threshold {
            if targets[indices[end]] {
                true_positives += 1;
            } else {
                false_positives += 1;
            }
            end += 1;
        }

        let recall = true_positives as f64 / num_positive as f64;
        let precision = true_positives as f64 / (true_positives + false_positives) as f64;
        average += (recall - previous_recall) * precision;
        previous_recall = recall;
        idx = end;
    }

    Some(average)
}

/// Score-based measures for a fold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreMetrics {
    /// Area under the ROC curve, `None` when undefined for the fold.
    pub auroc: Option<f64>,
    /// Area under the precision-recall curve, `None` when undefined.
    pub auprc: Option<f64>,
}

/// Compute AUROC/AUPRC against the dataset class set.
///
/// Binary problems use the positive-class score column directly. Multi-class
/// problems binarize the true labels against `classes` and average per-class
/// values, skipping any class for which the measures are not computable in
/// this fold (for example a class absent from the test split). If no class
/// is computable the measures are `None`.
pub fn score_metrics(y_true: &[i64], scores: &Array2<f64>, classes: &[i64]) -> ScoreMetrics {
    if classes.len() == 2 {
        if scores.ncols() < 2 {
            return ScoreMetrics {
                auroc: None,
                auprc: None,
            };
        }
        let targets: Vec<bool> = y_true.iter().map(|&y| y == classes[1]).collect();
        let column: Vec<f64> = (0..scores.nrows()).map(|i| scores[[i, 1]]).collect();
        return ScoreMetrics {
            auroc: roc_auc(&column, &targets),
            auprc: average_precision(&column, &targets),
        };
    }

    // Score columns may be fewer than classes when the classifier saw a
    // reduced training set; never index past what is available.
    let n_scores = classes.len().min(scores.ncols());
    let mut aurocs = Vec::new();
    let mut auprcs = Vec::new();

    for (class_index, &class) in classes.iter().take(n_scores).enumerate() {
        let targets: Vec<bool> = y_true.iter().map(|&y| y == class).collect();
        let column: Vec<f64> = (0..scores.nrows())
            .map(|i| scores[[i, class_index]])
            .collect();

        // Keep the class only when both measures are computable.
        if let (Some(auroc), Some(auprc)) = (
            roc_auc(&column, &targets),
            average_precision(&column, &targets),
        ) {
            aurocs.push(auroc);
            auprcs.push(auprc);
        }
    }

    let mean = |values: &[f64]| {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    };

    ScoreMetrics {
        auroc: mean(&aurocs),
        auprc: mean(&auprcs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use scirs2_core::ndarray::array;

    #[test]
    fn test_accuracy() {
        assert_abs_diff_eq!(accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_macro_precision_recall() {
        let y_true = vec![0, 0, 1, 1];
        let y_pred = vec![0, 1, 1, 1];
        // Class 0: precision 1/1, recall 1/2. Class 1: precision 2/3, recall 2/2.
        assert_abs_diff_eq!(
            macro_precision(&y_true, &y_pred),
            (1.0 + 2.0 / 3.0) / 2.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(macro_recall(&y_true, &y_pred), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_perfect_roc_auc() {
        let scores = vec![0.1, 0.2, 0.8, 0.9];
        let targets = vec![false, false, true, true];
        assert_abs_diff_eq!(roc_auc(&scores, &targets).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reversed_roc_auc() {
        let scores = vec![0.9, 0.8, 0.2, 0.1];
        let targets = vec![false, false, true, true];
        assert_abs_diff_eq!(roc_auc(&scores, &targets).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tied_scores_are_grouped() {
        let scores = vec![0.5, 0.5, 0.5, 0.5];
        let targets = vec![true, false, true, false];
        // All scores equal: chance-level ranking.
        assert_abs_diff_eq!(roc_auc(&scores, &targets).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_roc_undefined_for_single_class() {
        assert!(roc_auc(&[0.1, 0.9], &[true, true]).is_none());
        assert!(roc_auc(&[0.1, 0.9], &[false, false]).is_none());
        assert!(roc_auc(&[], &[]).is_none());
    }

    #[test]
    fn test_average_precision_perfect() {
        let scores = vec![0.1, 0.2, 0.8, 0.9];
        let targets = vec![false, false, true, true];
        assert_abs_diff_eq!(
            average_precision(&scores, &targets).unwrap(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_average_precision_no_positives() {
        assert!(average_precision(&[0.3, 0.4], &[false, false]).is_none());
    }

    #[test]
    fn test_binary_score_metrics() {
        let y_true = vec![0, 0, 1, 1];
        let scores = array![[0.9, 0.1], [0.8, 0.2], [0.2, 0.8], [0.1, 0.9]];
        let metrics = score_metrics(&y_true, &scores, &[0, 1]);
        assert_abs_diff_eq!(metrics.auroc.unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.auprc.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multiclass_skips_absent_class() {
        // Class 2 never occurs in this fold; it must be skipped, and the
        // averages computed over the two present classes.
        let y_true = vec![0, 0, 1, 1];
        let scores = array![
            [0.8, 0.1, 0.1],
            [0.7, 0.2, 0.1],
            [0.1, 0.8, 0.1],
            [0.2, 0.7, 0.1]
        ];
        let metrics = score_metrics(&y_true, &scores, &[0, 1, 2]);
        assert_abs_diff_eq!(metrics.auroc.unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.auprc.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_classes_absent_gives_none() {
        let y_true = vec![0, 0, 0];
        let scores = array![[0.4, 0.3, 0.3], [0.5, 0.2, 0.3], [0.6, 0.1, 0.3]];
        let metrics = score_metrics(&y_true, &scores, &[0, 1, 2]);
        assert!(metrics.auroc.is_none());
        assert!(metrics.auprc.is_none());
    }
}
