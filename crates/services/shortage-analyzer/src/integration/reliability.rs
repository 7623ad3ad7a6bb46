use crate::config::IntegrationConfig;
use crate::models::{DataQuality, ReliabilityScore, RoleForecast};

/// Weighted blend of data quality and mean model performance.
///
/// Without any forecast the overall score is the data quality alone.
pub fn compute_reliability(
    quality: &DataQuality,
    forecasts: &[RoleForecast],
    config: &IntegrationConfig,
) -> ReliabilityScore {
    let data_quality = quality.score.clamp(0.0, 1.0);
    let model_performance = if forecasts.is_empty() {
        None
    } else {
        let sum: f64 = forecasts.iter().map(|f| f.model.performance()).sum();
        Some((sum / forecasts.len() as f64).clamp(0.0, 1.0))
    };

    let overall = match model_performance {
        Some(perf) => {
            let total = config.data_quality_weight + config.model_weight;
            (config.data_quality_weight * data_quality + config.model_weight * perf) / total
        }
        None => data_quality,
    };

    ReliabilityScore {
        data_quality,
        model_performance,
        overall: overall.clamp(0.0, 1.0),
    }
}
