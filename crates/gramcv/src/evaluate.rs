//! Outer evaluation of a single train/test split.

use crate::{
    accuracy, cross_block, macro_precision, macro_recall, restrict, score_metrics, select,
    subset_labels, EvalResult, FoldResult, KernelClassifier, KernelMatrixCollection, ParamGrid,
};

/// Evaluate one kernel collection on a fixed outer split.
///
/// Runs the inner selector on the training indices only, refits the winning
/// configuration on the full outer-training set, and scores the held-out
/// test set. The test kernel block is expressed against the training
/// support set, as precomputed-kernel classifiers require.
///
/// Side effects are confined to the freshly cloned classifier, so one
/// evaluation can never influence another.
pub fn evaluate(
    template: &dyn KernelClassifier,
    train_indices: &[usize],
    test_indices: &[usize],
    collection: &KernelMatrixCollection,
    grid: &ParamGrid,
    inner_folds: usize,
) -> EvalResult<FoldResult> {
    let mut selection = select(template, train_indices, inner_folds, grid, collection)?;

    let k_train = restrict(&selection.matrix, train_indices);
    let y_train = subset_labels(collection.labels(), train_indices);
    selection.classifier.fit(k_train.view(), &y_train)?;

    let k_test = cross_block(&selection.matrix, test_indices, train_indices);
    let y_test = subset_labels(collection.labels(), test_indices);

    let y_pred = selection.classifier.predict(k_test.view())?;
    let y_score = selection.classifier.predict_proba(k_test.view())?;

    let classes = collection.classes();
    let scores = score_metrics(&y_test, &y_score, &classes);

    let y_score_rows: Vec<Vec<f64>> = (0..y_score.nrows())
        .map(|i| (0..y_score.ncols()).map(|j| y_score[[i, j]]).collect())
        .collect();

    Ok(FoldResult {
        best_model: selection.config,
        accuracy: accuracy(&y_test, &y_pred),
        precision: macro_precision(&y_test, &y_pred),
        recall: macro_recall(&y_test, &y_pred),
        auroc: scores.auroc,
        auprc: scores.auprc,
        y_pred,
        y_score: y_score_rows,
    })
}
