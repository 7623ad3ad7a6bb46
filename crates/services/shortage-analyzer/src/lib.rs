//! Staffing coverage and shortage analysis with per-role demand forecasting.
//!
//! Pipeline: ingest → normalize → resolve roles → coverage → shortage
//! aggregation → forecasting → integration into an [`models::AnalysisReport`].

pub mod config;
pub mod coverage;
pub mod error;
pub mod export;
pub mod forecaster;
pub mod ingest;
pub mod integration;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod service;
pub mod shortage;

pub use config::AnalyzerConfig;
pub use error::{AnalyzerErrorExt, InsightError, Result};
pub use service::AnalysisService;
