//! Analyzer configuration.
//!
//! Every recognized option lives in [`AnalyzerConfig`]. Missing sections and
//! fields fall back to their defaults, so a config file only needs to name
//! what it changes.

use crate::error::{InsightError, Result};
use crate::models::CoverageMode;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `SHORTAGE__FORECAST__HORIZON_DAYS=14`.
pub const ENV_PREFIX: &str = "SHORTAGE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub grid: GridConfig,
    pub ingest: IngestConfig,
    pub resolver: ResolverConfig,
    pub coverage: CoverageConfig,
    pub shortage: ShortageConfig,
    pub forecast: ForecastConfig,
    pub integration: IntegrationConfig,
    pub runtime: RuntimeConfig,
}

/// Time grid inference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GridConfig {
    /// Slot length in minutes. When unset the slot length is inferred from
    /// the number of distinct time-of-day values in the allocation data.
    pub slot_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// File-name prefix stripped from need files to obtain the role token.
    pub need_file_prefix: String,
    /// Extension of need files picked up from a directory.
    pub need_file_extension: String,
    /// Employment label used when a record carries none.
    pub default_employment: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            need_file_prefix: "need_per_show_role_".to_string(),
            need_file_extension: "csv".to_string(),
            default_employment: "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Domain keywords tried in order by the keyword pass.
    pub keywords: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let keywords = [
            "介護", "看護", "機能訓練", "相談", "事務", "管理", "調理", "運転", "清掃", "nurse",
            "care", "therap", "admin", "manager", "cook", "driver", "clean",
        ];
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Days of the allocation history used as the baseline in
/// [`CoverageMode::BaselineRelative`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BaselineWindow {
    AllDays,
    #[default]
    Weekdays,
    Weekends,
}

impl BaselineWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        match self {
            BaselineWindow::AllDays => true,
            BaselineWindow::Weekdays => !weekend,
            BaselineWindow::Weekends => weekend,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoverageConfig {
    pub mode: CoverageMode,
    pub baseline_window: BaselineWindow,
    /// Ratio below which a slot is CRITICAL.
    pub critical_ratio: f64,
    /// Ratio below which a slot is a shortage (MODERATE).
    pub shortage_ratio: f64,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            mode: CoverageMode::NeedBased,
            baseline_window: BaselineWindow::Weekdays,
            critical_ratio: 0.5,
            shortage_ratio: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShortageConfig {
    /// |shortage| at or below this many hours/day is BALANCED.
    pub balance_tolerance_hours: f64,
    /// Organization shortage below which masking is suspected (hours/day).
    pub masking_org_threshold_hours: f64,
    /// Role imbalance above which masking is confirmed (hours/day).
    pub masking_role_threshold_hours: f64,
}

impl Default for ShortageConfig {
    fn default() -> Self {
        Self {
            balance_tolerance_hours: 0.1,
            masking_org_threshold_hours: 5.0,
            masking_role_threshold_hours: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Bootstrap sample size as a share of the training rows.
    pub sample_ratio: f64,
    /// Share of features considered at each split.
    pub feature_ratio: f64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 30,
            max_depth: 8,
            min_samples_leaf: 2,
            sample_ratio: 1.0,
            feature_ratio: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Row subsample per stage (1.0 = all rows).
    pub subsample: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 60,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 3,
            subsample: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastConfig {
    pub enabled: bool,
    pub horizon_days: u32,
    /// Minimum observed (date, hour) points required to train a role model.
    pub min_samples: usize,
    pub train_ratio: f64,
    pub cv_folds: usize,
    pub seed: u64,
    pub forest: ForestParams,
    pub boosting: BoostingParams,
    /// Sample count at which the volume part of confidence saturates.
    pub confidence_full_samples: usize,
    pub confidence_floor: f64,
    pub confidence_ceiling: f64,
    /// Multiplier applied outside the role's typical operating hours.
    pub off_hours_confidence_factor: f64,
    /// Share of observed days an hour must be active on to count as typical.
    pub typical_hour_min_share: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            horizon_days: 7,
            min_samples: 10,
            train_ratio: 0.8,
            cv_folds: 3,
            seed: 42,
            forest: ForestParams::default(),
            boosting: BoostingParams::default(),
            confidence_full_samples: 200,
            confidence_floor: 0.3,
            confidence_ceiling: 0.95,
            off_hours_confidence_factor: 0.5,
            typical_hour_min_share: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntegrationConfig {
    pub trend_increase_factor: f64,
    pub trend_decrease_factor: f64,
    pub data_quality_weight: f64,
    pub model_weight: f64,
    /// Daily shortage (hours) above which an urgent review is recommended.
    pub urgent_shortage_hours: f64,
    /// Daily shortage (hours) above which a rising trend is flagged.
    pub moderate_shortage_hours: f64,
    /// Daily surplus (hours) above which reallocation is suggested.
    pub surplus_hours: f64,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            trend_increase_factor: 1.1,
            trend_decrease_factor: 0.9,
            data_quality_weight: 0.4,
            model_weight: 0.6,
            urgent_shortage_hours: 3.0,
            moderate_shortage_hours: 1.0,
            surplus_hours: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Worker pool size; 0 lets rayon pick one thread per core.
    pub worker_threads: usize,
    /// Per-role task deadline in seconds.
    pub task_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            task_timeout_secs: 120,
            cache_ttl_secs: 900,
            cache_max_entries: 512,
        }
    }
}

impl AnalyzerConfig {
    /// Loads a YAML/TOML/JSON file and applies `SHORTAGE__...` overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = insight_config::load_with_env(path, ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus `SHORTAGE__...` overrides.
    pub fn from_env() -> Result<Self> {
        let config: Self = insight_config::load_env_only(ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(m) = self.grid.slot_minutes {
            if m == 0 || 1440 % m != 0 {
                return Err(InsightError::config(format!(
                    "grid.slot_minutes must evenly divide 1440, got {m}"
                )));
            }
        }

        let c = &self.coverage;
        if !(c.critical_ratio > 0.0 && c.critical_ratio <= c.shortage_ratio) {
            return Err(InsightError::config(
                "coverage.critical_ratio must be positive and not exceed coverage.shortage_ratio",
            ));
        }

        let s = &self.shortage;
        if s.balance_tolerance_hours < 0.0
            || s.masking_org_threshold_hours < 0.0
            || s.masking_role_threshold_hours < 0.0
        {
            return Err(InsightError::config("shortage thresholds must be non-negative"));
        }

        let f = &self.forecast;
        if !(f.train_ratio > 0.0 && f.train_ratio < 1.0) {
            return Err(InsightError::config("forecast.train_ratio must be in (0, 1)"));
        }
        if f.cv_folds < 2 {
            return Err(InsightError::config("forecast.cv_folds must be at least 2"));
        }
        if f.min_samples == 0 {
            return Err(InsightError::config("forecast.min_samples must be positive"));
        }
        if f.forest.n_trees == 0 || f.boosting.n_estimators == 0 {
            return Err(InsightError::config("ensembles need at least one tree"));
        }
        if f.forest.max_depth == 0 || f.boosting.max_depth == 0 {
            return Err(InsightError::config("tree max_depth must be positive"));
        }
        if !(0.0..=1.0).contains(&f.confidence_floor)
            || !(0.0..=1.0).contains(&f.confidence_ceiling)
            || f.confidence_floor > f.confidence_ceiling
        {
            return Err(InsightError::config(
                "forecast confidence floor/ceiling must satisfy 0 <= floor <= ceiling <= 1",
            ));
        }
        for (name, v) in [
            ("forest.sample_ratio", f.forest.sample_ratio),
            ("forest.feature_ratio", f.forest.feature_ratio),
            ("boosting.subsample", f.boosting.subsample),
            ("boosting.learning_rate", f.boosting.learning_rate),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(InsightError::config(format!(
                    "forecast.{name} must be in (0, 1], got {v}"
                )));
            }
        }

        let i = &self.integration;
        if i.trend_decrease_factor > i.trend_increase_factor {
            return Err(InsightError::config(
                "integration.trend_decrease_factor must not exceed trend_increase_factor",
            ));
        }
        if i.data_quality_weight < 0.0
            || i.model_weight < 0.0
            || i.data_quality_weight + i.model_weight <= 0.0
        {
            return Err(InsightError::config(
                "reliability weights must be non-negative with a positive sum",
            ));
        }

        if self.runtime.task_timeout_secs == 0 {
            return Err(InsightError::config("runtime.task_timeout_secs must be positive"));
        }

        Ok(())
    }
}
