//! # Shortage Insight Tracing
//!
//! Unified structured-logging initialization for the workspace binaries.
//!
//! - **Environment filtering**: `RUST_LOG` wins over the configured level
//! - **Output formats**: human-readable or JSON lines
//! - **Service identification**: a root span carrying the service name
//! - **Guard pattern**: the returned guard exits the root span on drop
//!
//! ## Usage
//!
//! ```rust,no_run
//! use insight_tracing::{init, LogFormat, TracingConfig};
//! use tracing::info;
//!
//! fn main() -> insight_error::Result<()> {
//!     let _guard = init(TracingConfig {
//!         service_name: "shortage-analyzer".to_string(),
//!         log_level: "info".to_string(),
//!         format: LogFormat::Pretty,
//!     })?;
//!     info!("analysis started");
//!     Ok(())
//! }
//! ```

use insight_error::{InsightError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Global flag to track if tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log line format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(InsightError::invalid_input(
                "log_format",
                format!("unknown log format '{other}', expected 'pretty' or 'json'"),
            )),
        }
    }
}

/// Configuration for tracing initialization.
///
/// - `service_name`: non-empty, alphanumeric plus `-` and `_`.
/// - `log_level`: one of "trace", "debug", "info", "warn", "error".
/// - `format`: human-readable or JSON output.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub service_name: String,
    pub log_level: String,
    pub format: LogFormat,
}

impl TracingConfig {
    /// Validates the configuration.
    ///
    /// ## Errors
    ///
    /// - `InsightError::InvalidInput` if `service_name` is empty or contains invalid characters
    /// - `InsightError::InvalidInput` if `log_level` is not a valid log level
    pub fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(InsightError::invalid_input(
                "service_name",
                "service name cannot be empty",
            ));
        }

        if !self
            .service_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InsightError::invalid_input(
                "service_name",
                "service name must contain only alphanumeric characters, hyphens, and underscores",
            ));
        }

        if !VALID_LEVELS.contains(&self.log_level.as_str()) {
            return Err(InsightError::invalid_input(
                "log_level",
                format!(
                    "invalid log level '{}', must be one of: {}",
                    self.log_level,
                    VALID_LEVELS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

/// Keeps the service root span entered for the lifetime of the process.
#[derive(Debug)]
pub struct TracingGuard {
    _span: tracing::span::EnteredSpan,
}

/// Initializes the global subscriber.
///
/// Can only succeed once per process; later calls return
/// `InsightError::Config`.
pub fn init(config: TracingConfig) -> Result<TracingGuard> {
    config.validate()?;

    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(InsightError::config("tracing has already been initialized"));
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let init_result = match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_thread_ids(true),
            )
            .try_init(),
    };

    init_result
        .map_err(|e| InsightError::config(format!("failed to initialize tracing: {e}")))?;

    let span = tracing::info_span!("service", name = %config.service_name).entered();
    Ok(TracingGuard { _span: span })
}

/// Whether [`init`] has already been called in this process.
pub fn is_initialized() -> bool {
    TRACING_INITIALIZED.load(Ordering::SeqCst)
}
