//! # Shortage Insight Error Handling
//!
//! This crate provides the unified error type for the shortage insight
//! workspace. It uses `thiserror` for the error definitions and converts
//! into `anyhow::Error` at binary boundaries.
//!
//! ## Categories
//!
//! Every variant belongs to one [`ErrorCategory`]. The category decides how
//! an analysis run reacts to the error:
//!
//! - **DataError**: missing, empty or malformed input; aborts the stage.
//! - **MappingAmbiguity**: a role name could not be resolved; non-fatal.
//! - **ModelTrainingFailure**: one role's model could not be trained; that
//!   role's forecast is skipped and the batch continues.
//! - **ConfigInconsistency**: the inputs disagree on units (slot duration);
//!   fatal for the whole run.
//! - **Internal**: bugs and unexpected states.
//!
//! ## Usage
//!
//! ```rust
//! use insight_error::{InsightError, Result};
//!
//! fn load() -> Result<usize> {
//!     Err(InsightError::EmptyDataset("allocation table has no rows".to_string()))
//! }
//!
//! use anyhow::Context;
//!
//! fn app_code() -> anyhow::Result<()> {
//!     let _rows = load().context("failed to load allocation data");
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the workspace.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Configuration errors (invalid values, unreadable files, etc.)
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors (JSON, YAML, TOML, CSV)
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid input validation errors
    #[error("invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// Resource not found errors
    #[error("{resource_type} not found: {resource_id}")]
    NotFound {
        resource_type: String,
        resource_id: String,
    },

    /// The allocation table (or another mandatory dataset) has no rows
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    /// Observed time-of-day values do not form a valid slot grid
    #[error("malformed time grid: {0}")]
    MalformedTimeGrid(String),

    /// Datasets disagree on units that must be identical within one run
    #[error("configuration inconsistency: {0}")]
    ConfigInconsistency(String),

    /// A role name could not be resolved against the other dataset
    #[error("role mapping ambiguity for '{role}': {reason}")]
    MappingAmbiguity { role: String, reason: String },

    /// Too few historical samples to train a model
    #[error("insufficient data for '{subject}': need at least {required} samples, got {available}")]
    InsufficientData {
        subject: String,
        required: usize,
        available: usize,
    },

    /// Model training or prediction failed numerically
    #[error("model training failed for '{subject}': {reason}")]
    ModelTraining { subject: String, reason: String },

    /// A task exceeded its deadline or was cancelled
    #[error("timeout: {0}")]
    Timeout(String),

    /// Internal errors (bugs, unexpected states, etc.)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Type alias for Results using InsightError
pub type Result<T> = std::result::Result<T, InsightError>;

/// Coarse classification used to decide whether a run can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    DataError,
    MappingAmbiguity,
    ModelTrainingFailure,
    ConfigInconsistency,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataError => write!(f, "data_error"),
            Self::MappingAmbiguity => write!(f, "mapping_ambiguity"),
            Self::ModelTrainingFailure => write!(f, "model_training_failure"),
            Self::ConfigInconsistency => write!(f, "config_inconsistency"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        InsightError::Serialization(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for InsightError {
    fn from(err: csv::Error) -> Self {
        InsightError::Serialization(format!("CSV error: {err}"))
    }
}

impl InsightError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            InsightError::Io(_)
            | InsightError::Serialization(_)
            | InsightError::InvalidInput { .. }
            | InsightError::NotFound { .. }
            | InsightError::EmptyDataset(_)
            | InsightError::MalformedTimeGrid(_) => ErrorCategory::DataError,

            InsightError::Config(_) | InsightError::ConfigInconsistency(_) => {
                ErrorCategory::ConfigInconsistency
            }

            InsightError::MappingAmbiguity { .. } => ErrorCategory::MappingAmbiguity,

            InsightError::InsufficientData { .. }
            | InsightError::ModelTraining { .. }
            | InsightError::Timeout(_) => ErrorCategory::ModelTrainingFailure,

            InsightError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Determines whether this error must abort the whole analysis run.
    ///
    /// Mapping ambiguities and per-role training failures are recorded in the
    /// report instead.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::MappingAmbiguity | ErrorCategory::ModelTrainingFailure
        )
    }

    /// Short stable name of the variant, used as the skip reason in reports.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            InsightError::Config(_) => "ConfigError",
            InsightError::Io(_) => "IoError",
            InsightError::Serialization(_) => "SerializationError",
            InsightError::InvalidInput { .. } => "InvalidInputError",
            InsightError::NotFound { .. } => "NotFoundError",
            InsightError::EmptyDataset(_) => "EmptyDatasetError",
            InsightError::MalformedTimeGrid(_) => "MalformedTimeGridError",
            InsightError::ConfigInconsistency(_) => "ConfigInconsistencyError",
            InsightError::MappingAmbiguity { .. } => "MappingAmbiguity",
            InsightError::InsufficientData { .. } => "InsufficientDataError",
            InsightError::ModelTraining { .. } => "ModelTrainingFailure",
            InsightError::Timeout(_) => "TimeoutError",
            InsightError::Internal(_) => "InternalError",
        }
    }

    // ==========================================
    // Convenience constructors
    // ==========================================

    /// Creates a not found error
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        InsightError::NotFound {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Creates an invalid input error
    #[must_use]
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        InsightError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration error
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        InsightError::Config(msg.into())
    }

    #[must_use]
    pub fn timeout(msg: impl Into<String>) -> Self {
        InsightError::Timeout(msg.into())
    }

    /// Creates an internal error
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        InsightError::Internal(msg.into())
    }
}
