use super::{RoleWorkerPool, RunCache};
use crate::config::AnalyzerConfig;
use crate::coverage::CoverageEngine;
use crate::error::Result;
use crate::forecaster::{ForecastEngine, ForecastOutcome, FORECAST_STAGE};
use crate::ingest::{AllocationSource, NeedSource};
use crate::integration::{Integrator, ReportContext};
use crate::models::{AnalysisIssue, AnalysisReport, StageFailure, TimeGridSummary};
use crate::normalize::DataLoader;
use crate::resolver::{mapping_issues, RoleResolver};
use crate::shortage::ShortageAggregator;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Runs the full analysis pipeline over one set of inputs.
pub struct AnalysisService {
    config: AnalyzerConfig,
    pool: RoleWorkerPool,
}

impl AnalysisService {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let pool = RoleWorkerPool::from_config(&config.runtime)?;
        info!(
            worker_threads = pool.threads(),
            task_timeout_secs = config.runtime.task_timeout_secs,
            "Analysis service ready"
        );
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn pool(&self) -> &RoleWorkerPool {
        &self.pool
    }

    /// Loads the inputs and produces the report.
    ///
    /// Loading and configuration problems abort the run. A failing forecast
    /// stage is recorded in the report instead.
    #[instrument(skip_all, fields(source = allocation.name()))]
    pub fn run(
        &self,
        allocation: &dyn AllocationSource,
        needs: &[Box<dyn NeedSource>],
    ) -> Result<AnalysisReport> {
        let started = Instant::now();
        self.pool.reset();
        let cache = RunCache::new(&self.config.runtime);

        let loaded = DataLoader::new(&self.config).load(allocation, needs)?;
        let mut warnings = loaded.warnings;

        let resolution = RoleResolver::new(&self.config.resolver)
            .resolve(&loaded.actual.role_names(), &loaded.need.role_names());
        let mut issues: Vec<AnalysisIssue> = mapping_issues(&resolution);
        let roles = resolution.analysis_roles();

        let (coverage, coverage_warnings) = CoverageEngine::new(&self.config.coverage).compute(
            &loaded.actual,
            &loaded.need,
            &roles,
            &self.pool,
        );
        warnings.extend(coverage_warnings);

        let summary = ShortageAggregator::new(&self.config.shortage).aggregate(
            &coverage,
            &roles,
            &loaded.actual,
        );

        let mut stage_failures = Vec::new();
        let outcome = if self.config.forecast.enabled {
            ForecastEngine::new(&self.config.forecast)
                .train_and_forecast(
                    &loaded.actual,
                    &roles,
                    self.config.forecast.horizon_days,
                    &self.pool,
                    &cache,
                )
                .unwrap_or_else(|e| {
                    error!(error = %e, "Forecast stage failed");
                    stage_failures.push(StageFailure {
                        stage: FORECAST_STAGE.to_string(),
                        category: e.category(),
                        error: e.to_string(),
                    });
                    ForecastOutcome::default()
                })
        } else {
            warn!("Forecasting disabled by configuration");
            warnings.push("forecasting disabled by configuration".to_string());
            ForecastOutcome::default()
        };

        issues.extend(outcome.skipped.iter().map(|s| AnalysisIssue {
            role: Some(s.role.clone()),
            stage: s.stage.clone(),
            category: crate::error::ErrorCategory::ModelTrainingFailure,
            detail: s.detail.clone(),
        }));

        let grid = &loaded.grid;
        let context = ReportContext {
            time_grid: TimeGridSummary {
                slot_minutes: grid.slot_minutes,
                slot_hours: grid.slot_hours(),
                slots_per_day: grid.slots_per_day(),
                period_days: loaded.actual.period_days(),
                first_date: loaded.actual.dates.first().copied(),
                last_date: loaded.actual.dates.last().copied(),
            },
            role_mapping: resolution,
            coverage,
            skipped_roles: outcome.skipped,
            issues,
            warnings,
            stage_failures,
        };

        let report = Integrator::new(&self.config.integration).integrate(
            summary,
            outcome.forecasts,
            loaded.quality,
            context,
        );

        info!(
            report_id = %report.report_id,
            roles = report.role_shortages.len(),
            forecasts = report.forecasts.len(),
            skipped = report.skipped_roles.len(),
            cached_series = cache.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis run complete"
        );
        Ok(report)
    }
}
