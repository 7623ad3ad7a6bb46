/// Calculate Mean Absolute Error (MAE)
///
/// MAE = mean(|actual - forecast|)
pub fn mean_absolute_error(forecast: &[f64], actual: &[f64]) -> f64 {
    let n = forecast.len().min(actual.len());
    if n == 0 {
        return 0.0;
    }

    let sum: f64 = forecast
        .iter()
        .zip(actual.iter())
        .take(n)
        .map(|(f, a)| (a - f).abs())
        .sum();

    sum / n as f64
}

/// Calculate Root Mean Squared Error (RMSE)
///
/// RMSE = sqrt(mean((actual - forecast)^2))
pub fn root_mean_squared_error(forecast: &[f64], actual: &[f64]) -> f64 {
    let n = forecast.len().min(actual.len());
    if n == 0 {
        return 0.0;
    }

    let sum: f64 = forecast
        .iter()
        .zip(actual.iter())
        .take(n)
        .map(|(f, a)| (a - f).powi(2))
        .sum();

    (sum / n as f64).sqrt()
}

/// Coefficient of determination.
///
/// R² = 1 - SS_res / SS_tot. With a constant `actual` this is 1.0 for a
/// perfect forecast and 0.0 otherwise.
pub fn r_squared(forecast: &[f64], actual: &[f64]) -> f64 {
    let n = forecast.len().min(actual.len());
    if n == 0 {
        return 0.0;
    }

    let mean = actual.iter().take(n).sum::<f64>() / n as f64;
    let ss_tot: f64 = actual.iter().take(n).map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = forecast
        .iter()
        .zip(actual.iter())
        .take(n)
        .map(|(f, a)| (a - f).powi(2))
        .sum();

    if ss_tot < f64::EPSILON {
        return if ss_res < f64::EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// MAE relative to the mean absolute actual value, in [0, 1].
pub fn normalized_mae(mae: f64, actual: &[f64]) -> f64 {
    if actual.is_empty() {
        return 1.0;
    }
    let scale = actual.iter().map(|a| a.abs()).sum::<f64>() / actual.len() as f64;
    if scale < f64::EPSILON {
        return if mae < f64::EPSILON { 0.0 } else { 1.0 };
    }
    (mae / scale).clamp(0.0, 1.0)
}

/// Mean and population standard deviation.
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
