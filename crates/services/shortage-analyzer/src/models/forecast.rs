use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Predicted demand of one role for one future hour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub role: String,
    pub timestamp: NaiveDateTime,
    /// Staff-hours expected in the hour starting at `timestamp`.
    pub predicted_demand: f64,
    pub confidence: f64,
}

impl ForecastPoint {
    pub fn new(role: impl Into<String>, timestamp: NaiveDateTime, predicted: f64, confidence: f64) -> Self {
        Self {
            role: role.into(),
            timestamp,
            predicted_demand: predicted.max(0.0),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    GradientBoosting,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::RandomForest => write!(f, "random_forest"),
            ModelKind::GradientBoosting => write!(f, "gradient_boosting"),
        }
    }
}

/// Evaluation of one candidate model on a role's hold-out data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMetrics {
    pub model: ModelKind,
    pub mae: f64,
    pub rmse: f64,
    pub r_squared: f64,
    /// MAE divided by the mean absolute target of the test split, capped at 1.
    pub normalized_mae: f64,
    pub cv_mae_mean: f64,
    pub cv_mae_std: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleModelReport {
    pub selected: ModelKind,
    pub candidates: Vec<CandidateMetrics>,
    pub train_size: usize,
    pub test_size: usize,
    pub feature_names: Vec<String>,
}

impl RoleModelReport {
    pub fn selected_metrics(&self) -> Option<&CandidateMetrics> {
        self.candidates.iter().find(|c| c.model == self.selected)
    }

    /// `1 - normalized MAE` of the selected model, in [0, 1].
    pub fn performance(&self) -> f64 {
        self.selected_metrics()
            .map(|m| (1.0 - m.normalized_mae).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleForecast {
    pub role: String,
    pub points: Vec<ForecastPoint>,
    pub total_predicted_hours: f64,
    pub average_daily_demand: f64,
    pub horizon_days: u32,
    pub historical_samples: usize,
    pub model: RoleModelReport,
}

/// A role whose forecast was not produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedRole {
    pub role: String,
    pub stage: String,
    /// Error kind, e.g. `InsufficientDataError`.
    pub reason: String,
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_point_clamps() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 8)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let point = ForecastPoint::new("nurse", ts, -0.4, 1.7);
        assert_eq!(point.predicted_demand, 0.0);
        assert_eq!(point.confidence, 1.0);
    }

    #[test]
    fn test_performance_from_selected() {
        let metrics = |model, normalized_mae| CandidateMetrics {
            model,
            mae: 0.1,
            rmse: 0.2,
            r_squared: 0.5,
            normalized_mae,
            cv_mae_mean: 0.1,
            cv_mae_std: 0.0,
        };
        let report = RoleModelReport {
            selected: ModelKind::GradientBoosting,
            candidates: vec![
                metrics(ModelKind::RandomForest, 0.4),
                metrics(ModelKind::GradientBoosting, 0.25),
            ],
            train_size: 80,
            test_size: 20,
            feature_names: vec![],
        };
        assert!((report.performance() - 0.75).abs() < 1e-12);
    }
}
