//! Error handling for the shortage analyzer.

pub use insight_error::{ErrorCategory, InsightError, Result};

/// Extension trait for analyzer-specific error construction
pub trait AnalyzerErrorExt {
    /// Creates an empty dataset error
    fn empty_dataset(what: impl Into<String>) -> InsightError {
        InsightError::EmptyDataset(what.into())
    }

    /// Creates a malformed time grid error
    fn malformed_grid(reason: impl Into<String>) -> InsightError {
        InsightError::MalformedTimeGrid(reason.into())
    }

    /// Creates a slot duration mismatch error
    fn slot_mismatch(source: impl Into<String>, expected: u32, found: u32) -> InsightError {
        InsightError::ConfigInconsistency(format!(
            "slot duration mismatch in {}: allocation data uses {} min slots, found {} min",
            source.into(),
            expected,
            found
        ))
    }

    /// Creates an unresolved role error
    fn unmatched_role(role: impl Into<String>, reason: impl Into<String>) -> InsightError {
        InsightError::MappingAmbiguity {
            role: role.into(),
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error
    fn insufficient_samples(
        role: impl Into<String>,
        required: usize,
        available: usize,
    ) -> InsightError {
        InsightError::InsufficientData {
            subject: role.into(),
            required,
            available,
        }
    }

    /// Creates a training failed error
    fn training_failed(role: impl Into<String>, reason: impl Into<String>) -> InsightError {
        InsightError::ModelTraining {
            subject: role.into(),
            reason: reason.into(),
        }
    }

    /// Creates a parse error
    fn parse_error(reason: impl Into<String>) -> InsightError {
        InsightError::Serialization(format!("parse error: {}", reason.into()))
    }
}

impl AnalyzerErrorExt for InsightError {}
