use super::metrics::{
    mean_absolute_error, mean_and_std, normalized_mae, r_squared, root_mean_squared_error,
};
use super::model::build_regressor;
use crate::config::ForecastConfig;
use crate::error::{InsightError, Result};
use crate::models::{CandidateMetrics, ModelKind};
use crate::service::TaskDeadline;
use std::ops::Range;

/// Chronological split point: the first `train_ratio` share trains, the
/// rest tests. Both sides keep at least one row when `n >= 2`.
pub fn split_train_test(n: usize, train_ratio: f64) -> usize {
    if n < 2 {
        return n;
    }
    ((n as f64 * train_ratio) as usize).clamp(1, n - 1)
}

/// Expanding-window folds over `0..n`: fold `i` trains on the first `i + 1`
/// segments and validates on the next one.
pub fn time_series_folds(n: usize, k: usize) -> Vec<(Range<usize>, Range<usize>)> {
    if k == 0 {
        return Vec::new();
    }
    let segment = n / (k + 1);
    if segment == 0 {
        return Vec::new();
    }
    (0..k)
        .map(|i| {
            let train_end = segment * (i + 1);
            let val_end = if i + 1 == k { n } else { train_end + segment };
            (0..train_end, train_end..val_end)
        })
        .collect()
}

/// Trains `kind` on the training part, scores it on the test part and
/// cross-validates it on the training part.
pub fn evaluate_candidate(
    kind: ModelKind,
    x: &[Vec<f64>],
    y: &[f64],
    train_size: usize,
    config: &ForecastConfig,
    seed: u64,
    deadline: &TaskDeadline,
) -> Result<CandidateMetrics> {
    if train_size == 0 || train_size >= x.len() {
        return Err(InsightError::invalid_input(
            "train_size",
            format!("{train_size} leaves no train or test rows out of {}", x.len()),
        ));
    }

    let (x_train, x_test) = x.split_at(train_size);
    let (y_train, y_test) = y.split_at(train_size);

    let mut model = build_regressor(kind, config, seed);
    model.fit(x_train, y_train, deadline)?;
    let predictions: Vec<f64> = model
        .predict_many(x_test)
        .into_iter()
        .map(|p| p.max(0.0))
        .collect();

    let mae = mean_absolute_error(&predictions, y_test);
    let rmse = root_mean_squared_error(&predictions, y_test);

    let mut fold_maes = Vec::new();
    for (train, val) in time_series_folds(train_size, config.cv_folds) {
        deadline.check("cross-validation")?;
        let mut fold_model = build_regressor(kind, config, seed);
        fold_model.fit(&x_train[train.clone()], &y_train[train], deadline)?;
        let fold_pred: Vec<f64> = fold_model
            .predict_many(&x_train[val.clone()])
            .into_iter()
            .map(|p| p.max(0.0))
            .collect();
        fold_maes.push(mean_absolute_error(&fold_pred, &y_train[val]));
    }
    let (cv_mae_mean, cv_mae_std) = if fold_maes.is_empty() {
        (mae, 0.0)
    } else {
        mean_and_std(&fold_maes)
    };

    Ok(CandidateMetrics {
        model: kind,
        mae,
        rmse,
        r_squared: r_squared(&predictions, y_test),
        normalized_mae: normalized_mae(mae, y_test),
        cv_mae_mean,
        cv_mae_std,
    })
}

/// Lowest test MAE wins; earlier candidates win ties.
pub fn select_best(candidates: &[CandidateMetrics]) -> Option<ModelKind> {
    candidates
        .iter()
        .fold(None::<&CandidateMetrics>, |best, c| match best {
            Some(b) if c.mae >= b.mae => Some(b),
            _ => Some(c),
        })
        .map(|c| c.model)
}
