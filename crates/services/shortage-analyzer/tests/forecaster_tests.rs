mod helpers;

use helpers::{records_for, test_config};
use shortage_analyzer::forecaster::{build_regressor, ForecastEngine, FORECAST_STAGE};
use shortage_analyzer::models::{AnalysisRole, ModelKind, TimeGrid};
use shortage_analyzer::normalize::NormalizedActual;
use shortage_analyzer::service::{RoleWorkerPool, RunCache, TaskDeadline};
use std::time::Duration;

fn role(name: &str) -> AnalysisRole {
    AnalysisRole {
        name: name.to_string(),
        actual_role: Some(name.to_string()),
        need_role: None,
    }
}

// Helper producing a daily pattern with a mild weekday effect
fn generate_daily_pattern(days: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for i in 0..days * 24 {
        let hour = (i % 24) as f64;
        let weekday = ((i / 24) % 7) as f64;
        x.push(vec![hour, weekday]);
        y.push(if (8.0..18.0).contains(&hour) { 3.0 + weekday * 0.1 } else { 0.0 });
    }
    (x, y)
}

#[test]
fn test_ensembles_learn_daily_pattern() {
    let config = test_config(60).forecast;
    let (x, y) = generate_daily_pattern(14);

    for kind in [ModelKind::RandomForest, ModelKind::GradientBoosting] {
        let mut model = build_regressor(kind, &config, 7);
        model.fit(&x, &y, &TaskDeadline::unlimited()).unwrap();
        assert_eq!(model.kind(), kind);

        let day = model.predict(&[12.0, 2.0]);
        let night = model.predict(&[3.0, 2.0]);
        assert!(day > night, "{kind}: day {day} should exceed night {night}");
        assert!(night < 1.0);
    }
}

#[test]
fn test_fit_respects_cancellation() {
    let config = test_config(60).forecast;
    let (x, y) = generate_daily_pattern(7);
    let cancelled = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let deadline = TaskDeadline::new(Duration::from_secs(60), cancelled);

    let mut model = build_regressor(ModelKind::RandomForest, &config, 7);
    assert!(model.fit(&x, &y, &deadline).is_err());
}

#[test]
fn test_short_history_is_skipped() {
    // 8 active hours on a single day: below the 10 sample minimum.
    let records = records_for("care", "full_time", "c1", 60, 1, 9..17);
    let actual = NormalizedActual::from_records(TimeGrid::new(60).unwrap(), &records);
    let config = test_config(60);
    let pool = RoleWorkerPool::from_config(&config.runtime).unwrap();
    let cache = RunCache::new(&config.runtime);

    let outcome = ForecastEngine::new(&config.forecast)
        .train_and_forecast(&actual, &[role("care")], 7, &pool, &cache)
        .unwrap();

    assert!(outcome.forecasts.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    let skip = &outcome.skipped[0];
    assert_eq!(skip.role, "care");
    assert_eq!(skip.stage, FORECAST_STAGE);
    assert_eq!(skip.reason, "InsufficientDataError");
    assert!(skip.detail.contains("8"));
}

#[test]
fn test_one_failing_role_does_not_stop_others() {
    let mut records = records_for("nurse", "full_time", "n1", 60, 4, 8..16);
    records.extend(records_for("care", "full_time", "c1", 60, 1, 9..12));
    let actual = NormalizedActual::from_records(TimeGrid::new(60).unwrap(), &records);
    let config = test_config(60);
    let pool = RoleWorkerPool::from_config(&config.runtime).unwrap();
    let cache = RunCache::new(&config.runtime);

    let outcome = ForecastEngine::new(&config.forecast)
        .train_and_forecast(&actual, &[role("care"), role("nurse")], 3, &pool, &cache)
        .unwrap();

    assert_eq!(outcome.forecasts.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    let nurse = &outcome.forecasts[0];
    assert_eq!(nurse.role, "nurse");
    assert_eq!(nurse.horizon_days, 3);
    assert_eq!(nurse.points.len(), 3 * 24);
    assert!(nurse.points.iter().all(|p| p.predicted_demand >= 0.0));
    assert!(nurse.total_predicted_hours >= 0.0);
    assert!((nurse.average_daily_demand * 3.0 - nurse.total_predicted_hours).abs() < 1e-6);
    assert!(cache.len() >= 1);
}

#[test]
fn test_off_hours_confidence_is_lower() {
    let records = records_for("nurse", "full_time", "n1", 60, 5, 8..16);
    let actual = NormalizedActual::from_records(TimeGrid::new(60).unwrap(), &records);
    let config = test_config(60);
    let pool = RoleWorkerPool::from_config(&config.runtime).unwrap();
    let cache = RunCache::new(&config.runtime);

    let outcome = ForecastEngine::new(&config.forecast)
        .train_and_forecast(&actual, &[role("nurse")], 1, &pool, &cache)
        .unwrap();
    let points = &outcome.forecasts[0].points;

    use chrono::Timelike;
    let at = |h: u32| points.iter().find(|p| p.timestamp.hour() == h).unwrap();
    assert!(at(10).confidence > at(2).confidence);
}

#[test]
fn test_need_only_role_is_skipped() {
    let records = records_for("nurse", "full_time", "n1", 60, 2, 8..16);
    let actual = NormalizedActual::from_records(TimeGrid::new(60).unwrap(), &records);
    let config = test_config(60);
    let pool = RoleWorkerPool::from_config(&config.runtime).unwrap();
    let cache = RunCache::new(&config.runtime);
    let cook = AnalysisRole {
        name: "cook".to_string(),
        actual_role: None,
        need_role: Some("cook".to_string()),
    };

    let outcome = ForecastEngine::new(&config.forecast)
        .train_and_forecast(&actual, &[cook], 1, &pool, &cache)
        .unwrap();
    assert_eq!(outcome.skipped[0].reason, "InsufficientDataError");
}
