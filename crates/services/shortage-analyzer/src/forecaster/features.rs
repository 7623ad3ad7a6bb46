//! Hourly demand series and the features derived from it.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::f64::consts::PI;

pub const HOURS_PER_DAY: usize = 24;

pub const FEATURE_NAMES: [&str; 13] = [
    "hour",
    "weekday",
    "month",
    "day_of_month",
    "hour_sin",
    "hour_cos",
    "weekday_sin",
    "weekday_cos",
    "lag_1d",
    "lag_7d",
    "ma_3d",
    "ma_7d",
    "std_7d",
];

/// Dense staff-hours per hour from `start` 00:00, missing hours as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    pub start: NaiveDate,
    pub values: Vec<f64>,
    /// Distinct (date, hour) points with activity.
    pub observed_samples: usize,
    /// Hours of day the role is usually active in.
    pub typical_hours: [bool; HOURS_PER_DAY],
}

impl HourlySeries {
    /// Lays `hourly` out densely over `first..=last`.
    ///
    /// An hour is typical when it is active on at least `typical_share` of
    /// the days with any activity.
    pub fn build(
        hourly: &BTreeMap<(NaiveDate, u32), f64>,
        first: NaiveDate,
        last: NaiveDate,
        typical_share: f64,
    ) -> Self {
        let days = ((last - first).num_days().max(0) + 1) as usize;
        let mut values = vec![0.0; days * HOURS_PER_DAY];
        let mut active_days_per_hour = [0usize; HOURS_PER_DAY];
        let mut active_days = std::collections::BTreeSet::new();
        let mut observed = 0;

        for ((date, hour), hours) in hourly {
            let offset = (*date - first).num_days();
            if offset < 0 || *hour as usize >= HOURS_PER_DAY {
                continue;
            }
            let idx = offset as usize * HOURS_PER_DAY + *hour as usize;
            if idx >= values.len() {
                continue;
            }
            values[idx] += hours;
            if *hours > 0.0 {
                observed += 1;
                active_days_per_hour[*hour as usize] += 1;
                active_days.insert(*date);
            }
        }

        let mut typical_hours = [false; HOURS_PER_DAY];
        if !active_days.is_empty() {
            let n = active_days.len() as f64;
            for (h, count) in active_days_per_hour.iter().enumerate() {
                typical_hours[h] = *count as f64 / n >= typical_share && *count > 0;
            }
        }

        Self {
            start: first,
            values,
            observed_samples: observed,
            typical_hours,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Feature matrix and targets, one row per hour.
    pub fn training_set(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows = (0..self.values.len())
            .map(|i| feature_row(&self.values, i, self.start))
            .collect();
        (rows, self.values.clone())
    }
}

pub fn timestamp_at(start: NaiveDate, index: usize) -> NaiveDateTime {
    let date = start + Duration::days((index / HOURS_PER_DAY) as i64);
    date.and_time(NaiveTime::default()) + Duration::hours((index % HOURS_PER_DAY) as i64)
}

/// Total of day `day` counting only hours before `index`.
fn day_total(history: &[f64], day: usize, index: usize) -> f64 {
    let from = day * HOURS_PER_DAY;
    let to = (from + HOURS_PER_DAY).min(index).min(history.len());
    history.get(from..to).map_or(0.0, |hours| hours.iter().sum())
}

/// Features of hour `index`. Lag and rolling features are daily totals of
/// the days before the one `index` falls in, so only `history[..index]` is
/// read.
pub fn feature_row(history: &[f64], index: usize, start: NaiveDate) -> Vec<f64> {
    let ts = timestamp_at(start, index);
    let hour = (index % HOURS_PER_DAY) as f64;
    let weekday = ts.weekday().num_days_from_monday() as f64;
    let today = index / HOURS_PER_DAY;

    let days_back = |back: usize| -> Option<f64> {
        today.checked_sub(back).map(|d| day_total(history, d, index))
    };
    let recent = |days: usize| -> Vec<f64> { (1..=days).filter_map(|d| days_back(d)).collect() };
    let mean = |v: &[f64]| {
        if v.is_empty() {
            0.0
        } else {
            v.iter().sum::<f64>() / v.len() as f64
        }
    };

    let week = recent(7);
    let ma_7d = mean(&week);
    let std_7d = if week.len() < 2 {
        0.0
    } else {
        (week.iter().map(|v| (v - ma_7d).powi(2)).sum::<f64>() / week.len() as f64).sqrt()
    };

    vec![
        hour,
        weekday,
        ts.month() as f64,
        ts.day() as f64,
        (2.0 * PI * hour / 24.0).sin(),
        (2.0 * PI * hour / 24.0).cos(),
        (2.0 * PI * weekday / 7.0).sin(),
        (2.0 * PI * weekday / 7.0).cos(),
        days_back(1).unwrap_or(0.0),
        days_back(7).unwrap_or(0.0),
        mean(&recent(3)),
        ma_7d,
        std_7d,
    ]
}
