#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use shortage_analyzer::models::{AllocationRecord, NeedGrid, TimeGrid};
use shortage_analyzer::AnalyzerConfig;

pub fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap() + Duration::days(offset)
}

pub fn slot_time(grid: &TimeGrid, date: NaiveDate, slot: usize) -> NaiveDateTime {
    date.and_time(grid.slots[slot])
}

/// One record per slot in `slots` on each of `days` consecutive days.
pub fn records_for(
    role: &str,
    employment: &str,
    staff: &str,
    slot_minutes: u32,
    days: i64,
    slots: impl Iterator<Item = usize> + Clone,
) -> Vec<AllocationRecord> {
    let grid = TimeGrid::new(slot_minutes).unwrap();
    (0..days)
        .flat_map(|d| {
            let grid = grid.clone();
            slots
                .clone()
                .map(move |s| AllocationRecord::new(slot_time(&grid, day(d), s), staff, role, employment, 1))
        })
        .collect()
}

/// A need grid requiring `staff` on `slots` and nobody elsewhere.
pub fn need_grid(
    role: &str,
    slot_minutes: u32,
    days: i64,
    slots: impl Iterator<Item = usize>,
    staff: f64,
) -> NeedGrid {
    let grid = TimeGrid::new(slot_minutes).unwrap();
    let dates: Vec<NaiveDate> = (0..days).map(day).collect();
    let mut values = vec![vec![0.0; dates.len()]; grid.slots_per_day()];
    for slot in slots {
        values[slot].iter_mut().for_each(|v| *v = staff);
    }
    NeedGrid::new(role, grid.slots.clone(), dates, values)
}

/// Small, fast model settings for tests.
pub fn test_config(slot_minutes: u32) -> AnalyzerConfig {
    let mut config = AnalyzerConfig::default();
    config.grid.slot_minutes = Some(slot_minutes);
    config.forecast.forest.n_trees = 8;
    config.forecast.boosting.n_estimators = 10;
    config.forecast.horizon_days = 2;
    config.runtime.worker_threads = 2;
    config
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
