//! Allocation records folded into per-role slot totals.

use crate::models::{AllocationRecord, TimeGrid};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmploymentActual {
    pub slot_count: f64,
    pub record_count: usize,
    pub staff: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleActual {
    /// Staff per (date, slot index).
    pub slot_counts: BTreeMap<(NaiveDate, usize), f64>,
    pub record_count: usize,
    pub total_slot_count: f64,
    pub employment: BTreeMap<String, EmploymentActual>,
    pub staff: BTreeSet<String>,
}

impl RoleActual {
    /// Share of the role's allocation held by each employment type.
    ///
    /// Weighted by slot count; falls back to record count when every record
    /// carries zero slots.
    pub fn employment_shares(&self) -> BTreeMap<String, f64> {
        let by_slots = self.total_slot_count > 0.0;
        let total = if by_slots {
            self.total_slot_count
        } else {
            self.record_count as f64
        };
        if total <= 0.0 {
            return BTreeMap::new();
        }
        self.employment
            .iter()
            .map(|(name, e)| {
                let weight = if by_slots {
                    e.slot_count
                } else {
                    e.record_count as f64
                };
                (name.clone(), weight / total)
            })
            .collect()
    }
}

/// Allocation data on the canonical grid.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedActual {
    pub grid: TimeGrid,
    /// Distinct observed dates, ascending.
    pub dates: Vec<NaiveDate>,
    pub roles: BTreeMap<String, RoleActual>,
    pub total_staff: usize,
}

impl NormalizedActual {
    /// Folds records into the grid. Records must be aligned to `grid`.
    pub fn from_records(grid: TimeGrid, records: &[AllocationRecord]) -> Self {
        let mut roles: BTreeMap<String, RoleActual> = BTreeMap::new();
        let mut dates = BTreeSet::new();
        let mut staff = BTreeSet::new();

        for record in records {
            let Some(slot) = grid.slot_index(record.timestamp.time()) else {
                continue;
            };
            let date = record.timestamp.date();
            let count = record.slot_count as f64;
            dates.insert(date);
            staff.insert(record.staff_id.clone());

            let role = roles.entry(record.role.clone()).or_default();
            *role.slot_counts.entry((date, slot)).or_insert(0.0) += count;
            role.record_count += 1;
            role.total_slot_count += count;
            role.staff.insert(record.staff_id.clone());

            let employment = role.employment.entry(record.employment.clone()).or_default();
            employment.slot_count += count;
            employment.record_count += 1;
            employment.staff.insert(record.staff_id.clone());
        }

        Self {
            grid,
            dates: dates.into_iter().collect(),
            roles,
            total_staff: staff.len(),
        }
    }

    pub fn period_days(&self) -> usize {
        self.dates.len()
    }

    /// Calendar days from the first to the last observed date, inclusive.
    pub fn calendar_days(&self) -> usize {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => (*last - *first).num_days() as usize + 1,
            _ => 0,
        }
    }

    pub fn role(&self, name: &str) -> Option<&RoleActual> {
        self.roles.get(name)
    }

    pub fn role_names(&self) -> BTreeSet<String> {
        self.roles.keys().cloned().collect()
    }

    /// Total staff-hours of a role over the whole period.
    pub fn total_hours(&self, role: &str) -> f64 {
        self.role(role)
            .map(|r| r.total_slot_count * self.grid.slot_hours())
            .unwrap_or(0.0)
    }

    /// Staff-hours per day of a role.
    pub fn daily_hours(&self, role: &str) -> f64 {
        let days = self.period_days();
        if days == 0 {
            return 0.0;
        }
        self.total_hours(role) / days as f64
    }

    /// Mean staff per slot over the allocation period.
    pub fn slot_profile(&self, role: &str) -> Vec<f64> {
        self.slot_profile_over(role, |_| true)
    }

    /// Mean staff per slot over the observed dates accepted by `include`.
    /// All zeros when no date qualifies.
    pub fn slot_profile_over(&self, role: &str, include: impl Fn(NaiveDate) -> bool) -> Vec<f64> {
        let mut sums = vec![0.0; self.grid.slots_per_day()];
        let days = self.dates.iter().filter(|d| include(**d)).count();
        if days == 0 {
            return sums;
        }
        if let Some(actual) = self.role(role) {
            for ((date, slot), count) in &actual.slot_counts {
                if include(*date) {
                    sums[*slot] += count;
                }
            }
        }
        sums.iter_mut().for_each(|s| *s /= days as f64);
        sums
    }

    /// Staff-hours per (date, hour) for dates and hours with activity.
    pub fn hourly_hours(&self, role: &str) -> BTreeMap<(NaiveDate, u32), f64> {
        let mut hourly = BTreeMap::new();
        if let Some(actual) = self.role(role) {
            let slot_hours = self.grid.slot_hours();
            for ((date, slot), count) in &actual.slot_counts {
                let hour = self.grid.slot_hour(*slot);
                *hourly.entry((*date, hour)).or_insert(0.0) += count * slot_hours;
            }
        }
        hourly
    }
}
