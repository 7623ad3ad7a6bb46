use crate::error::{AnalyzerErrorExt, InsightError, Result};
use crate::models::grid::MINUTES_PER_DAY;
use crate::models::TimeGrid;
use chrono::NaiveTime;
use std::collections::BTreeSet;

/// Infers the slot grid from observed times of day.
///
/// The slot length is `1440 / distinct_count` unless `slot_override` is
/// given. Every observed time must start a slot of the resulting grid.
pub fn infer_time_grid(
    times: impl IntoIterator<Item = NaiveTime>,
    slot_override: Option<u32>,
) -> Result<TimeGrid> {
    let distinct: BTreeSet<NaiveTime> = times.into_iter().collect();
    if distinct.is_empty() {
        return Err(InsightError::malformed_grid("no time-of-day values observed"));
    }

    let slot_minutes = match slot_override {
        Some(m) => m,
        None => {
            let count = distinct.len() as u32;
            if MINUTES_PER_DAY % count != 0 {
                return Err(InsightError::malformed_grid(format!(
                    "{count} distinct times of day do not evenly partition 24h"
                )));
            }
            MINUTES_PER_DAY / count
        }
    };

    let grid = TimeGrid::new(slot_minutes).ok_or_else(|| {
        InsightError::malformed_grid(format!("{slot_minutes} min slots do not divide 24h"))
    })?;

    if let Some(bad) = distinct.iter().find(|t| grid.slot_index(**t).is_none()) {
        return Err(InsightError::malformed_grid(format!(
            "time {} is not aligned to {slot_minutes} min slots",
            bad.format("%H:%M:%S")
        )));
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_infer_half_hour_grid() {
        let grid = TimeGrid::new(30).unwrap();
        let inferred = infer_time_grid(grid.slots.iter().copied(), None).unwrap();
        assert_eq!(inferred.slot_minutes, 30);
    }

    #[test]
    fn test_uneven_count_is_malformed() {
        let err = infer_time_grid([t(0, 0), t(1, 0), t(2, 0), t(3, 0), t(4, 0), t(5, 0), t(6, 0)], None)
            .unwrap_err();
        assert!(matches!(err, InsightError::MalformedTimeGrid(_)));
    }

    #[test]
    fn test_misaligned_time_is_malformed() {
        // 2 distinct times -> 720 min slots, 09:00 is not a slot start
        let err = infer_time_grid([t(0, 0), t(9, 0)], None).unwrap_err();
        assert!(matches!(err, InsightError::MalformedTimeGrid(_)));
    }

    #[test]
    fn test_override() {
        let grid = infer_time_grid([t(9, 0), t(9, 30), t(10, 0)], Some(30)).unwrap();
        assert_eq!(grid.slots_per_day(), 48);

        assert!(infer_time_grid([t(9, 15)], Some(30)).is_err());
    }
}
