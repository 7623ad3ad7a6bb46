mod helpers;

use helpers::{approx, day, need_grid, records_for, test_config};
use shortage_analyzer::export::JsonExporter;
use shortage_analyzer::ingest::{
    discover_need_files, CsvAllocationSource, MemoryAllocationSource, MemoryNeedSource, NeedSource,
};
use shortage_analyzer::models::{
    AllocationRecord, AnalysisReport, ModelKind, Priority, ShortageStatus, TimeGrid,
};
use shortage_analyzer::{AnalysisService, AnalyzerConfig, InsightError};
use std::io::Write;

const DAYS: i64 = 3;

/// Nurses cover 00:00-08:00 (8 h/day) against a 10 h/day need; cooks are
/// needed 3 h/day but nobody is allocated.
fn nurse_and_cook() -> (MemoryAllocationSource, Vec<Box<dyn NeedSource>>) {
    let records = records_for("nurse", "full_time", "n1", 30, DAYS, 0..16);
    let needs: Vec<Box<dyn NeedSource>> = vec![
        Box::new(MemoryNeedSource::new(need_grid("nurse", 30, DAYS, 0..20, 1.0))),
        Box::new(MemoryNeedSource::new(need_grid("cook", 30, DAYS, 20..26, 1.0))),
    ];
    (MemoryAllocationSource::new("memory", records), needs)
}

fn run(config: AnalyzerConfig) -> AnalysisReport {
    let (allocation, needs) = nurse_and_cook();
    AnalysisService::new(config)
        .unwrap()
        .run(&allocation, &needs)
        .unwrap()
}

#[test]
fn test_role_shortage_in_daily_hours() {
    let report = run(test_config(30));

    let nurse = report.role_shortage("nurse").unwrap();
    assert!(approx(nurse.actual_daily_hours, 8.0));
    assert!(approx(nurse.need_daily_hours, 10.0));
    assert!(approx(nurse.shortage_daily_hours, 2.0));
    assert_eq!(nurse.status, ShortageStatus::Shortage);
    assert_eq!(nurse.staff_count, 1);

    assert_eq!(report.time_grid.slot_minutes, 30);
    assert_eq!(report.time_grid.period_days, 3);
    assert_eq!(report.time_grid.first_date, Some(day(0)));
}

#[test]
fn test_need_only_role_is_unstaffed() {
    let report = run(test_config(30));

    let cook = report.role_shortage("cook").unwrap();
    assert!(approx(cook.need_daily_hours, 3.0));
    assert!(approx(cook.actual_daily_hours, 0.0));
    assert!(approx(cook.shortage_daily_hours, 3.0));
    assert_eq!(cook.staff_count, 0);

    assert_eq!(report.immediate_staffing_roles, vec!["cook".to_string()]);
    assert!(report.masking.unstaffed_roles.contains(&"cook".to_string()));
    assert!(report.role_mapping.unmatched_need.contains(&"cook".to_string()));

    let first = &report.recommendations[0];
    assert_eq!(first.priority, Priority::Critical);
    assert_eq!(first.role.as_deref(), Some("cook"));
}

#[test]
fn test_organization_totals_add_up() {
    let report = run(test_config(30));
    let org = &report.organization_shortage;
    assert!(approx(org.need_daily_hours, 13.0));
    assert!(approx(org.actual_daily_hours, 8.0));
    assert!(approx(org.shortage_daily_hours, 5.0));
    assert_eq!(report.shortage_ranking[0].role, "cook");

    let employment_total: f64 = report
        .employment_shortages
        .iter()
        .map(|r| r.shortage_daily_hours)
        .sum();
    assert!(approx(employment_total, org.shortage_daily_hours));
}

#[test]
fn test_forecasts_and_skips() {
    let report = run(test_config(30));

    let nurse = report.forecast_for("nurse").unwrap();
    assert_eq!(nurse.points.len(), 2 * 24);
    assert!(nurse.points.iter().all(|p| p.predicted_demand >= 0.0));
    assert!(nurse
        .points
        .iter()
        .all(|p| (0.0..=1.0).contains(&p.confidence)));
    assert_eq!(nurse.historical_samples, 24);
    assert_eq!(nurse.model.candidates.len(), 2);
    assert!(matches!(
        nurse.model.selected,
        ModelKind::RandomForest | ModelKind::GradientBoosting
    ));

    let cook = report.skipped("cook").unwrap();
    assert_eq!(cook.reason, "InsufficientDataError");
    assert!(report.issues.iter().any(|i| i.role.as_deref() == Some("cook")));
    assert!(report.stage_failures.is_empty());
    assert!(report.trends.iter().any(|t| t.role == "nurse"));
    assert!(report.reliability.model_performance.is_some());
}

#[test]
fn test_forecasts_are_reproducible() {
    let a = run(test_config(30));
    let b = run(test_config(30));
    let pa = &a.forecast_for("nurse").unwrap().points;
    let pb = &b.forecast_for("nurse").unwrap().points;
    assert_eq!(pa, pb);
}

#[test]
fn test_cancel_does_not_outlive_the_run() {
    let (allocation, needs) = nurse_and_cook();
    let service = AnalysisService::new(test_config(30)).unwrap();
    service.pool().cancel();

    let report = service.run(&allocation, &needs).unwrap();
    assert!(!service.pool().is_cancelled());
    assert!(report.forecast_for("nurse").is_some());
    assert!(report.skipped_roles.iter().all(|s| s.reason != "TimeoutError"));
}

#[test]
fn test_forecast_disabled() {
    let mut config = test_config(30);
    config.forecast.enabled = false;
    let report = run(config);
    assert!(report.forecasts.is_empty());
    assert!(report.skipped_roles.is_empty());
    assert!(report.warnings.iter().any(|w| w.contains("forecasting disabled")));
    assert!(approx(
        report.reliability.overall,
        report.data_quality.score
    ));
}

#[test]
fn test_empty_allocation_aborts() {
    let allocation = MemoryAllocationSource::new("empty", Vec::new());
    let err = AnalysisService::new(test_config(30))
        .unwrap()
        .run(&allocation, &[])
        .unwrap_err();
    assert!(matches!(err, InsightError::EmptyDataset(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_slot_mismatch_aborts() {
    let records = records_for("nurse", "full_time", "n1", 30, 1, 0..48);
    let allocation = MemoryAllocationSource::new("memory", records);
    let needs: Vec<Box<dyn NeedSource>> = vec![Box::new(MemoryNeedSource::new(need_grid(
        "nurse", 60, 1, 0..8, 1.0,
    )))];
    let err = AnalysisService::new(AnalyzerConfig::default())
        .unwrap()
        .run(&allocation, &needs)
        .unwrap_err();
    assert!(matches!(err, InsightError::ConfigInconsistency(_)));
}

#[test]
fn test_inferred_grid_without_override() {
    // Full-day coverage gives 48 distinct times, so 30 min slots are inferred.
    let records = records_for("nurse", "full_time", "n1", 30, 1, 0..48);
    let allocation = MemoryAllocationSource::new("memory", records);
    let mut config = AnalyzerConfig::default();
    config.forecast.enabled = false;
    let report = AnalysisService::new(config)
        .unwrap()
        .run(&allocation, &[])
        .unwrap();
    assert_eq!(report.time_grid.slot_minutes, 30);
    let nurse = report.role_shortage("nurse").unwrap();
    assert!(approx(nurse.actual_daily_hours, 24.0));
    assert_eq!(nurse.status, ShortageStatus::Surplus);
}

#[test]
fn test_csv_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let grid = TimeGrid::new(60).unwrap();

    let alloc_path = dir.path().join("allocation.csv");
    let mut alloc = std::fs::File::create(&alloc_path).unwrap();
    writeln!(alloc, "ds,staff,role,employment,parsed_slots_count").unwrap();
    for d in 0..2 {
        for slot in 8..12 {
            writeln!(
                alloc,
                "{},s1,nurse,full_time,1",
                day(d).and_time(grid.slots[slot]).format("%Y-%m-%d %H:%M:%S")
            )
            .unwrap();
        }
    }
    writeln!(alloc, "not-a-date,s1,nurse,full_time,1").unwrap();

    let need_path = dir.path().join("need_per_show_role_nurse.csv");
    let mut need = std::fs::File::create(&need_path).unwrap();
    writeln!(need, "time,{},{}", day(0), day(1)).unwrap();
    for (slot, time) in grid.slots.iter().enumerate() {
        let value = if (8..14).contains(&slot) { "1" } else { "0" };
        writeln!(need, "{},{value},{value}", time.format("%H:%M")).unwrap();
    }

    let mut config = AnalyzerConfig::default();
    config.grid.slot_minutes = Some(60);
    config.forecast.enabled = false;

    let allocation = CsvAllocationSource::new(&alloc_path);
    let needs: Vec<Box<dyn NeedSource>> = discover_need_files(
        dir.path(),
        &config.ingest.need_file_prefix,
        &config.ingest.need_file_extension,
    )
    .unwrap()
    .into_iter()
    .map(|s| Box::new(s) as Box<dyn NeedSource>)
    .collect();
    assert_eq!(needs.len(), 1);

    let report = AnalysisService::new(config)
        .unwrap()
        .run(&allocation, &needs)
        .unwrap();

    assert_eq!(report.data_quality.rows_rejected, 1);
    let nurse = report.role_shortage("nurse").unwrap();
    assert!(approx(nurse.actual_daily_hours, 4.0));
    assert!(approx(nurse.need_daily_hours, 6.0));
    assert_eq!(report.role_mapping.matched_count(), 1);

    let out = dir.path().join("report.json");
    JsonExporter::new().write_to(&report, &out).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["role_shortages"][0]["role"], "nurse");
    assert_eq!(json["role_shortages"][0]["status"], "SHORTAGE");
}

#[test]
fn test_unmatched_actual_role_uses_baseline() {
    let mut records = records_for("nurse", "full_time", "n1", 30, DAYS, 0..16);
    records.push(AllocationRecord::new(
        day(0).and_hms_opt(9, 0, 0).unwrap(),
        "d1",
        "driver",
        "part_time",
        1,
    ));
    let allocation = MemoryAllocationSource::new("memory", records);
    let needs: Vec<Box<dyn NeedSource>> = vec![Box::new(MemoryNeedSource::new(need_grid(
        "nurse", 30, DAYS, 0..16, 1.0,
    )))];
    let mut config = test_config(30);
    config.forecast.enabled = false;
    let report = AnalysisService::new(config)
        .unwrap()
        .run(&allocation, &needs)
        .unwrap();

    let driver = report.role_shortage("driver").unwrap();
    assert!(approx(driver.need_daily_hours, 0.0));
    assert_eq!(driver.status, ShortageStatus::Surplus);
    assert!(report
        .issues
        .iter()
        .any(|i| i.role.as_deref() == Some("driver") && i.stage == "role_resolution"));
}
