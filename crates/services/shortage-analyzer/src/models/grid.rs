use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Canonical slots of one day. Slot `i` starts at `i * slot_minutes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub slot_minutes: u32,
    pub slots: Vec<NaiveTime>,
}

impl TimeGrid {
    /// Builds the grid for a slot length that evenly divides a day.
    pub fn new(slot_minutes: u32) -> Option<Self> {
        if slot_minutes == 0 || MINUTES_PER_DAY % slot_minutes != 0 {
            return None;
        }
        let slots = (0..MINUTES_PER_DAY / slot_minutes)
            .filter_map(|i| {
                let start = i * slot_minutes;
                NaiveTime::from_hms_opt(start / 60, start % 60, 0)
            })
            .collect();
        Some(Self {
            slot_minutes,
            slots,
        })
    }

    pub fn slots_per_day(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_hours(&self) -> f64 {
        self.slot_minutes as f64 / 60.0
    }

    /// Index of the slot starting exactly at `time`.
    pub fn slot_index(&self, time: NaiveTime) -> Option<usize> {
        if time.second() != 0 || time.nanosecond() != 0 {
            return None;
        }
        let minutes = time.hour() * 60 + time.minute();
        if minutes % self.slot_minutes != 0 {
            return None;
        }
        Some((minutes / self.slot_minutes) as usize)
    }

    /// Hour of day (0-23) a slot falls in.
    pub fn slot_hour(&self, slot: usize) -> u32 {
        (slot as u32 * self.slot_minutes) / 60
    }
}

/// Required staffing of one role: `values[row][col]` for time row and date
/// column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedGrid {
    pub role: String,
    pub times: Vec<NaiveTime>,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Vec<f64>>,
}

impl NeedGrid {
    pub fn new(
        role: impl Into<String>,
        times: Vec<NaiveTime>,
        dates: Vec<NaiveDate>,
        values: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            role: role.into(),
            times,
            dates,
            values,
        }
    }

    pub fn row_count(&self) -> usize {
        self.times.len()
    }

    /// Slot length implied by the number of rows, if the rows partition a day.
    pub fn slot_minutes(&self) -> Option<u32> {
        let rows = self.row_count() as u32;
        if rows == 0 || MINUTES_PER_DAY % rows != 0 {
            return None;
        }
        Some(MINUTES_PER_DAY / rows)
    }

    /// Number of distinct dates covered.
    pub fn period_days(&self) -> usize {
        let mut dates = self.dates.clone();
        dates.sort();
        dates.dedup();
        dates.len()
    }

    /// Sum of all cells (staff-slots).
    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }

    /// Mean requirement per row across the grid's dates.
    pub fn mean_per_row(&self) -> Vec<f64> {
        let days = self.period_days();
        self.values
            .iter()
            .map(|row| {
                if days == 0 {
                    0.0
                } else {
                    row.iter().sum::<f64>() / days as f64
                }
            })
            .collect()
    }
}
