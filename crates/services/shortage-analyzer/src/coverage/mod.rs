//! Slot-level coverage ratios and shortage spots.

pub mod engine;

pub use engine::{classify_severity, coverage_ratio, CoverageEngine};
