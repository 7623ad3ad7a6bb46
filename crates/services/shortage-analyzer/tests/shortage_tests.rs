mod helpers;

use helpers::{approx, day, need_grid, records_for, test_config};
use proptest::prelude::*;
use shortage_analyzer::config::ShortageConfig;
use shortage_analyzer::ingest::{MemoryAllocationSource, MemoryNeedSource, NeedSource};
use shortage_analyzer::models::{AllocationRecord, ShortageRecord, ShortageScope, ShortageStatus, TimeGrid};
use shortage_analyzer::normalize::NormalizedActual;
use shortage_analyzer::shortage::{
    compute_employment_shortage, compute_organization_shortage, detect_masking,
};
use shortage_analyzer::AnalysisService;

fn role_record(role: &str, need: f64, actual: f64, staff: usize) -> ShortageRecord {
    ShortageRecord::new(ShortageScope::Role, need, actual, staff, 0.1).with_role(role)
}

#[test]
fn test_masking_balanced_total() {
    // A is short 6 h/day, B has 6 h/day surplus, the total looks balanced.
    let roles = vec![role_record("A", 10.0, 4.0, 2), role_record("B", 4.0, 10.0, 3)];
    let org = compute_organization_shortage(&roles, 5, 0.1);
    assert_eq!(org.status, ShortageStatus::Balanced);

    let masking = detect_masking(&roles, &org, &ShortageConfig::default());
    assert!(masking.hidden_by_aggregation);
    assert!(approx(masking.max_role_imbalance_hours, 6.0));
    assert_eq!(masking.most_imbalanced_role.as_deref(), Some("A"));
    assert_eq!(masking.shortage_role_count, 1);
    assert_eq!(masking.surplus_role_count, 1);
    assert!(masking.explanation.unwrap().contains("'A'"));
}

#[test]
fn test_no_masking_when_total_is_short() {
    let roles = vec![role_record("A", 10.0, 2.0, 2), role_record("B", 4.0, 3.0, 3)];
    let org = compute_organization_shortage(&roles, 5, 0.1);
    let masking = detect_masking(&roles, &org, &ShortageConfig::default());
    assert!(!masking.hidden_by_aggregation);
    assert!(masking.explanation.is_none());
}

#[test]
fn test_masking_from_unstaffed_role() {
    let roles = vec![role_record("A", 8.0, 9.0, 2), role_record("cook", 1.0, 0.0, 0)];
    let org = compute_organization_shortage(&roles, 2, 0.1);
    let masking = detect_masking(&roles, &org, &ShortageConfig::default());
    assert!(masking.hidden_by_aggregation);
    assert_eq!(masking.unstaffed_roles, vec!["cook".to_string()]);
}

#[test]
fn test_masking_in_full_run() {
    // Both roles on 60 min slots: A works 4 h/day vs 10 needed, B 10 vs 4.
    let mut records = records_for("A", "full_time", "a1", 60, 2, 0..4);
    records.extend(records_for("B", "full_time", "b1", 60, 2, 0..10));
    let allocation = MemoryAllocationSource::new("memory", records);
    let needs: Vec<Box<dyn NeedSource>> = vec![
        Box::new(MemoryNeedSource::new(need_grid("A", 60, 2, 0..10, 1.0))),
        Box::new(MemoryNeedSource::new(need_grid("B", 60, 2, 0..4, 1.0))),
    ];
    let mut config = test_config(60);
    config.forecast.enabled = false;
    let report = AnalysisService::new(config)
        .unwrap()
        .run(&allocation, &needs)
        .unwrap();

    assert!(approx(report.organization_shortage.shortage_daily_hours, 0.0));
    assert!(report.masking.hidden_by_aggregation);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.category == "aggregation_masking"));
}

#[test]
fn test_employment_split_by_slot_share() {
    let grid = TimeGrid::new(60).unwrap();
    let records = vec![
        AllocationRecord::new(day(0).and_time(grid.slots[9]), "s1", "nurse", "full_time", 3),
        AllocationRecord::new(day(0).and_time(grid.slots[10]), "s2", "nurse", "part_time", 1),
    ];
    let actual = NormalizedActual::from_records(grid, &records);
    let role = role_record("nurse", 8.0, 4.0, 2);

    let parts = compute_employment_shortage(&role, actual.role("nurse"), 0.1);
    assert_eq!(parts.len(), 2);
    let full = parts
        .iter()
        .find(|p| p.employment.as_deref() == Some("full_time"))
        .unwrap();
    assert!(approx(full.need_daily_hours, 6.0));
    assert!(approx(full.actual_daily_hours, 3.0));
    assert_eq!(full.staff_count, 1);
}

fn record_strategy() -> impl Strategy<Value = AllocationRecord> {
    (
        0i64..5,
        0usize..48,
        prop::sample::select(vec!["nurse", "care", "admin"]),
        prop::sample::select(vec!["full_time", "part_time", "contract"]),
        0u32..4,
        1u32..5,
    )
        .prop_map(|(d, slot, role, employment, staff, count)| {
            let grid = TimeGrid::new(30).unwrap();
            AllocationRecord::new(
                day(d).and_time(grid.slots[slot]),
                format!("s{staff}"),
                role,
                employment,
                count,
            )
        })
}

proptest! {
    #[test]
    fn test_total_hours_conserved(records in prop::collection::vec(record_strategy(), 1..200)) {
        let actual = NormalizedActual::from_records(TimeGrid::new(30).unwrap(), &records);
        for role in actual.role_names() {
            let expected: f64 = records
                .iter()
                .filter(|r| r.role == role)
                .map(|r| r.slot_count as f64 * 0.5)
                .sum();
            prop_assert!((actual.total_hours(&role) - expected).abs() < 1e-9);

            let profile_hours: f64 = actual.slot_profile(&role).iter().sum::<f64>()
                * 0.5
                * actual.period_days() as f64;
            prop_assert!((profile_hours - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_employment_parts_sum_to_role(
        records in prop::collection::vec(record_strategy(), 1..200),
        need in 0.0f64..40.0,
    ) {
        let actual = NormalizedActual::from_records(TimeGrid::new(30).unwrap(), &records);
        for role in actual.role_names() {
            let record = role_record(&role, need, actual.daily_hours(&role), 1);
            let parts = compute_employment_shortage(&record, actual.role(&role), 0.1);
            let need_sum: f64 = parts.iter().map(|p| p.need_daily_hours).sum();
            let actual_sum: f64 = parts.iter().map(|p| p.actual_daily_hours).sum();
            let shortage_sum: f64 = parts.iter().map(|p| p.shortage_daily_hours).sum();
            prop_assert!((need_sum - record.need_daily_hours).abs() < 1e-6);
            prop_assert!((actual_sum - record.actual_daily_hours).abs() < 1e-6);
            prop_assert!((shortage_sum - record.shortage_daily_hours).abs() < 1e-6);
        }
    }

    #[test]
    fn test_status_matches_sign(need in 0.0f64..30.0, actual in 0.0f64..30.0) {
        let record = role_record("r", need, actual, 1);
        let expected = if (need - actual).abs() <= 0.1 {
            ShortageStatus::Balanced
        } else if need > actual {
            ShortageStatus::Shortage
        } else {
            ShortageStatus::Surplus
        };
        prop_assert_eq!(record.status, expected);
    }
}
