pub mod allocation;
pub mod coverage;
pub mod forecast;
pub mod grid;
pub mod mapping;
pub mod report;
pub mod shortage;

pub use allocation::{AllocationRecord, AllocationTable, IngestStats};
pub use coverage::{CoverageCell, CoverageMatrix, CoverageMode, Severity};
pub use forecast::{
    CandidateMetrics, ForecastPoint, ModelKind, RoleForecast, RoleModelReport, SkippedRole,
};
pub use grid::{NeedGrid, TimeGrid};
pub use mapping::{AnalysisRole, MatchMethod, RoleMapping, RoleResolution};
pub use report::{
    AnalysisIssue, AnalysisReport, DataQuality, Priority, Recommendation, ReliabilityScore,
    RoleTrend, StageFailure, TimeGridSummary, TrendDirection,
};
pub use shortage::{
    MaskingAssessment, RankedRole, ShortageRecord, ShortageScope, ShortageStatus, ShortageSummary,
};
