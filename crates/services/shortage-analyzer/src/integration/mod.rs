//! Merges shortages and forecasts into the final report.

pub mod recommendations;
pub mod reliability;
pub mod trend;

pub use recommendations::{build_recommendations, RecommendationSet};
pub use reliability::compute_reliability;
pub use trend::{classify_trend, compute_trends};

use crate::config::IntegrationConfig;
use crate::models::{
    AnalysisIssue, AnalysisReport, CoverageMatrix, DataQuality, RoleForecast, RoleResolution,
    ShortageSummary, SkippedRole, StageFailure, TimeGridSummary,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Everything the report carries besides shortages and forecasts.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub time_grid: TimeGridSummary,
    pub role_mapping: RoleResolution,
    pub coverage: CoverageMatrix,
    pub skipped_roles: Vec<SkippedRole>,
    pub issues: Vec<AnalysisIssue>,
    pub warnings: Vec<String>,
    pub stage_failures: Vec<StageFailure>,
}

pub struct Integrator<'a> {
    config: &'a IntegrationConfig,
}

impl<'a> Integrator<'a> {
    pub fn new(config: &'a IntegrationConfig) -> Self {
        Self { config }
    }

    pub fn integrate(
        &self,
        summary: ShortageSummary,
        forecasts: Vec<RoleForecast>,
        quality: DataQuality,
        context: ReportContext,
    ) -> AnalysisReport {
        let trends = compute_trends(&summary, &forecasts, self.config);
        let reliability = compute_reliability(&quality, &forecasts, self.config);
        let RecommendationSet {
            recommendations,
            immediate_staffing_roles,
        } = build_recommendations(&summary, &trends, &context.skipped_roles, self.config);

        info!(
            recommendations = recommendations.len(),
            immediate = immediate_staffing_roles.len(),
            reliability = reliability.overall,
            "Integrated analysis report"
        );

        AnalysisReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            time_grid: context.time_grid,
            data_quality: quality,
            role_mapping: context.role_mapping,
            coverage: context.coverage,
            role_shortages: summary.roles,
            employment_shortages: summary.employment,
            organization_shortage: summary.organization,
            shortage_ranking: summary.ranking,
            masking: summary.masking,
            forecasts,
            skipped_roles: context.skipped_roles,
            trends,
            reliability,
            recommendations,
            immediate_staffing_roles,
            issues: context.issues,
            warnings: context.warnings,
            stage_failures: context.stage_failures,
        }
    }
}
