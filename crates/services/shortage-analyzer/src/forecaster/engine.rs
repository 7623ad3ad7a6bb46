use super::features::{feature_row, timestamp_at, HourlySeries, FEATURE_NAMES, HOURS_PER_DAY};
use super::model::{build_regressor, CANDIDATES};
use super::validation::{evaluate_candidate, select_best, split_train_test};
use crate::config::ForecastConfig;
use crate::error::{AnalyzerErrorExt, ErrorCategory, InsightError, Result};
use crate::models::{AnalysisRole, ForecastPoint, RoleForecast, RoleModelReport, SkippedRole};
use crate::normalize::NormalizedActual;
use crate::service::{RoleWorkerPool, RunCache, TaskDeadline};
use chrono::Timelike;
use tracing::{debug, info, instrument, warn};

pub const FORECAST_STAGE: &str = "forecast";

#[derive(Debug, Clone, Default)]
pub struct ForecastOutcome {
    pub forecasts: Vec<RoleForecast>,
    pub skipped: Vec<SkippedRole>,
}

/// Per-role seed, stable across runs and thread schedules.
pub fn role_seed(base: u64, role: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let hash = role
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ b as u64).wrapping_mul(FNV_PRIME));
    base ^ hash
}

pub struct ForecastEngine<'a> {
    config: &'a ForecastConfig,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(config: &'a ForecastConfig) -> Self {
        Self { config }
    }

    /// Trains one model per role and forecasts `horizon_days` ahead.
    ///
    /// Per-role failures become [`SkippedRole`] entries; only a stage-wide
    /// problem is returned as an error.
    pub fn train_and_forecast(
        &self,
        actual: &NormalizedActual,
        roles: &[AnalysisRole],
        horizon_days: u32,
        pool: &RoleWorkerPool,
        cache: &RunCache,
    ) -> Result<ForecastOutcome> {
        if actual.dates.is_empty() {
            return Err(InsightError::internal(
                "forecasting requires at least one observed date",
            ));
        }

        let results = pool.run_each(roles, |role, deadline| {
            self.forecast_role(role, actual, horizon_days, cache, deadline)
        });

        let mut outcome = ForecastOutcome::default();
        for (role, result) in roles.iter().zip(results) {
            match result {
                Ok(forecast) => outcome.forecasts.push(forecast),
                Err(err) => {
                    let err = if err.category() == ErrorCategory::ModelTrainingFailure {
                        err
                    } else {
                        InsightError::training_failed(&role.name, err.to_string())
                    };
                    warn!(role = %role.name, reason = err.kind_name(), error = %err, "Forecast skipped");
                    outcome.skipped.push(SkippedRole {
                        role: role.name.clone(),
                        stage: FORECAST_STAGE.to_string(),
                        reason: err.kind_name().to_string(),
                        detail: err.to_string(),
                    });
                }
            }
        }

        info!(
            forecasted = outcome.forecasts.len(),
            skipped = outcome.skipped.len(),
            horizon_days,
            "Forecasting complete"
        );
        Ok(outcome)
    }

    #[instrument(skip_all, fields(role = %role.name))]
    fn forecast_role(
        &self,
        role: &AnalysisRole,
        actual: &NormalizedActual,
        horizon_days: u32,
        cache: &RunCache,
        deadline: &TaskDeadline,
    ) -> Result<RoleForecast> {
        let min_samples = self.config.min_samples;
        let Some(actual_name) = role.actual_role.as_deref() else {
            return Err(InsightError::insufficient_samples(&role.name, min_samples, 0));
        };
        let (Some(first), Some(last)) = (actual.dates.first(), actual.dates.last()) else {
            return Err(InsightError::insufficient_samples(&role.name, min_samples, 0));
        };

        let hourly = cache.hourly_series(actual_name, || actual.hourly_hours(actual_name));
        let series = HourlySeries::build(
            &hourly,
            *first,
            *last,
            self.config.typical_hour_min_share,
        );
        if series.observed_samples < min_samples {
            return Err(InsightError::insufficient_samples(
                &role.name,
                min_samples,
                series.observed_samples,
            ));
        }

        let (x, y) = series.training_set();
        let train_size = split_train_test(x.len(), self.config.train_ratio);
        let seed = role_seed(self.config.seed, &role.name);

        let mut candidates = Vec::with_capacity(CANDIDATES.len());
        for kind in CANDIDATES {
            deadline.check(&format!("{} candidate {kind}", role.name))?;
            let metrics = evaluate_candidate(kind, &x, &y, train_size, self.config, seed, deadline)?;
            debug!(model = %kind, mae = metrics.mae, rmse = metrics.rmse, "Candidate evaluated");
            candidates.push(metrics);
        }
        let selected = select_best(&candidates)
            .ok_or_else(|| InsightError::training_failed(&role.name, "no candidate model"))?;

        let mut model = build_regressor(selected, self.config, seed);
        model.fit(&x, &y, deadline)?;

        let steps = horizon_days as usize * HOURS_PER_DAY;
        let mut history = series.values.clone();
        let mut points = Vec::with_capacity(steps);
        let volume = self.volume_confidence(series.observed_samples);
        for _ in 0..steps {
            let index = history.len();
            let row = feature_row(&history, index, series.start);
            let predicted = model.predict(&row).max(0.0);
            history.push(predicted);

            let ts = timestamp_at(series.start, index);
            let hour_factor = if series.typical_hours[ts.hour() as usize] {
                1.0
            } else {
                self.config.off_hours_confidence_factor
            };
            points.push(ForecastPoint::new(&role.name, ts, predicted, volume * hour_factor));
        }

        let total: f64 = points.iter().map(|p| p.predicted_demand).sum();
        let average_daily = if horizon_days == 0 {
            0.0
        } else {
            total / horizon_days as f64
        };

        info!(
            model = %selected,
            samples = series.observed_samples,
            average_daily_demand = average_daily,
            "Role forecast ready"
        );

        Ok(RoleForecast {
            role: role.name.clone(),
            points,
            total_predicted_hours: total,
            average_daily_demand: average_daily,
            horizon_days,
            historical_samples: series.observed_samples,
            model: RoleModelReport {
                selected,
                candidates,
                train_size,
                test_size: x.len() - train_size,
                feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            },
        })
    }

    /// Grows linearly from the floor to the ceiling as samples approach
    /// `confidence_full_samples`.
    fn volume_confidence(&self, samples: usize) -> f64 {
        let c = self.config;
        let saturation = if c.confidence_full_samples == 0 {
            1.0
        } else {
            (samples as f64 / c.confidence_full_samples as f64).min(1.0)
        };
        c.confidence_floor + (c.confidence_ceiling - c.confidence_floor) * saturation
    }
}
