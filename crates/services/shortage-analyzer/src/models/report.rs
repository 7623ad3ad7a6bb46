//! The report produced by one analysis run.

use super::{
    CoverageMatrix, MaskingAssessment, RankedRole, RoleForecast, RoleResolution, ShortageRecord,
    SkippedRole,
};
use chrono::{DateTime, Utc};
use insight_error::ErrorCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeGridSummary {
    pub slot_minutes: u32,
    pub slot_hours: f64,
    pub slots_per_day: usize,
    /// Distinct dates in the allocation data.
    pub period_days: usize,
    pub first_date: Option<chrono::NaiveDate>,
    pub last_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataQuality {
    /// Share of allocation rows accepted.
    pub completeness: f64,
    /// Observed days over calendar days between first and last date.
    pub date_coverage: f64,
    /// Mean of completeness and date coverage.
    pub score: f64,
    pub rows_read: usize,
    pub rows_rejected: usize,
    pub observed_days: usize,
    pub calendar_days: usize,
    pub need_grid_count: usize,
}

impl DataQuality {
    pub fn new(
        rows_read: usize,
        rows_rejected: usize,
        observed_days: usize,
        calendar_days: usize,
        need_grid_count: usize,
    ) -> Self {
        let completeness = if rows_read == 0 {
            1.0
        } else {
            (rows_read - rows_rejected) as f64 / rows_read as f64
        };
        let date_coverage = if calendar_days == 0 {
            0.0
        } else {
            (observed_days as f64 / calendar_days as f64).min(1.0)
        };
        Self {
            completeness,
            date_coverage,
            score: ((completeness + date_coverage) / 2.0).clamp(0.0, 1.0),
            rows_read,
            rows_rejected,
            observed_days,
            calendar_days,
            need_grid_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleTrend {
    pub role: String,
    pub direction: TrendDirection,
    pub forecast_daily_demand: f64,
    /// Value the forecast was compared against.
    pub comparison_basis: f64,
    /// `true` when the basis is the current shortage, `false` for actual hours.
    pub basis_is_shortage: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReliabilityScore {
    pub data_quality: f64,
    /// `None` when no role produced a forecast.
    pub model_performance: Option<f64>,
    pub overall: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub role: Option<String>,
    pub message: String,
    pub action: String,
}

/// A non-fatal problem tied to a role and stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisIssue {
    pub role: Option<String>,
    pub stage: String,
    pub category: ErrorCategory,
    pub detail: String,
}

/// A whole stage that failed without aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageFailure {
    pub stage: String,
    pub category: ErrorCategory,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub time_grid: TimeGridSummary,
    pub data_quality: DataQuality,
    pub role_mapping: RoleResolution,
    pub coverage: CoverageMatrix,
    pub role_shortages: Vec<ShortageRecord>,
    pub employment_shortages: Vec<ShortageRecord>,
    pub organization_shortage: ShortageRecord,
    pub shortage_ranking: Vec<RankedRole>,
    pub masking: MaskingAssessment,
    pub forecasts: Vec<RoleForecast>,
    pub skipped_roles: Vec<SkippedRole>,
    pub trends: Vec<RoleTrend>,
    pub reliability: ReliabilityScore,
    pub recommendations: Vec<Recommendation>,
    pub immediate_staffing_roles: Vec<String>,
    pub issues: Vec<AnalysisIssue>,
    pub warnings: Vec<String>,
    pub stage_failures: Vec<StageFailure>,
}

impl AnalysisReport {
    pub fn role_shortage(&self, role: &str) -> Option<&ShortageRecord> {
        self.role_shortages
            .iter()
            .find(|r| r.role.as_deref() == Some(role))
    }

    pub fn forecast_for(&self, role: &str) -> Option<&RoleForecast> {
        self.forecasts.iter().find(|f| f.role == role)
    }

    pub fn skipped(&self, role: &str) -> Option<&SkippedRole> {
        self.skipped_roles.iter().find(|s| s.role == role)
    }
}
