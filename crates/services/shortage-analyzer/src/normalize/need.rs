use crate::error::{AnalyzerErrorExt, InsightError, Result};
use crate::models::{NeedGrid, TimeGrid};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// One role's need as daily rates on the canonical grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleNeed {
    pub role: String,
    pub period_days: usize,
    /// Mean required staff per slot over the grid's dates.
    pub slot_profile: Vec<f64>,
    /// Required staff-hours per day.
    pub daily_hours: f64,
    pub dates: Vec<NaiveDate>,
}

impl RoleNeed {
    /// Validates `grid` against the canonical slot grid and converts it to
    /// daily rates.
    pub fn from_grid(grid: &NeedGrid, canonical: &TimeGrid, source: &str) -> Result<Self> {
        let found = grid.slot_minutes().ok_or_else(|| {
            InsightError::malformed_grid(format!(
                "need grid {source} has {} rows, which do not partition 24h",
                grid.row_count()
            ))
        })?;
        if found != canonical.slot_minutes {
            return Err(InsightError::slot_mismatch(source, canonical.slot_minutes, found));
        }

        let mut dates = BTreeSet::new();
        for date in &grid.dates {
            if !dates.insert(*date) {
                return Err(InsightError::malformed_grid(format!(
                    "need grid {source}: date {date} appears more than once"
                )));
            }
        }

        let means = grid.mean_per_row();
        let mut slot_profile = vec![0.0; canonical.slots_per_day()];
        let mut seen = BTreeSet::new();
        for (time, mean) in grid.times.iter().zip(means) {
            let slot = canonical.slot_index(*time).ok_or_else(|| {
                InsightError::malformed_grid(format!(
                    "need grid {source}: time {} is not a slot start",
                    time.format("%H:%M")
                ))
            })?;
            if !seen.insert(slot) {
                return Err(InsightError::malformed_grid(format!(
                    "need grid {source}: duplicate row for {}",
                    time.format("%H:%M")
                )));
            }
            slot_profile[slot] = mean;
        }

        let daily_hours = if dates.is_empty() {
            0.0
        } else {
            grid.total() * canonical.slot_hours() / dates.len() as f64
        };
        let dates: Vec<NaiveDate> = dates.into_iter().collect();

        Ok(Self {
            role: grid.role.clone(),
            period_days: dates.len(),
            slot_profile,
            daily_hours,
            dates,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedNeed {
    pub roles: BTreeMap<String, RoleNeed>,
}

impl NormalizedNeed {
    pub fn role(&self, name: &str) -> Option<&RoleNeed> {
        self.roles.get(name)
    }

    pub fn role_names(&self) -> BTreeSet<String> {
        self.roles.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_daily_need_hours() {
        let canonical = TimeGrid::new(720).unwrap();
        let grid = NeedGrid::new(
            "nurse",
            canonical.slots.clone(),
            vec![day(1), day(2)],
            vec![vec![2.0, 4.0], vec![1.0, 1.0]],
        );
        let need = RoleNeed::from_grid(&grid, &canonical, "nurse.csv").unwrap();
        assert_eq!(need.period_days, 2);
        assert_eq!(need.slot_profile, vec![3.0, 1.0]);
        // (3 + 1) staff * 12h slots
        assert!((need.daily_hours - 48.0).abs() < 1e-12);
    }

    #[test]
    fn test_slot_mismatch() {
        let canonical = TimeGrid::new(30).unwrap();
        let hourly = TimeGrid::new(60).unwrap();
        let grid = NeedGrid::new("nurse", hourly.slots.clone(), vec![day(1)], vec![vec![1.0]; 24]);
        let err = RoleNeed::from_grid(&grid, &canonical, "nurse.csv").unwrap_err();
        assert!(matches!(err, InsightError::ConfigInconsistency(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_repeated_date_column_is_malformed() {
        let canonical = TimeGrid::new(720).unwrap();
        let grid = NeedGrid::new(
            "nurse",
            canonical.slots.clone(),
            vec![day(1), day(1)],
            vec![vec![2.0, 2.0], vec![0.0, 0.0]],
        );
        let err = RoleNeed::from_grid(&grid, &canonical, "nurse.csv").unwrap_err();
        assert!(matches!(err, InsightError::MalformedTimeGrid(_)));
    }
}
