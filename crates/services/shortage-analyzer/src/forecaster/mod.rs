//! Per-role demand forecasting with tree ensembles.

pub mod boosting;
pub mod engine;
pub mod features;
pub mod forest;
pub mod metrics;
pub mod model;
pub mod tree;
pub mod validation;

pub use boosting::GradientBoosting;
pub use engine::{role_seed, ForecastEngine, ForecastOutcome, FORECAST_STAGE};
pub use features::{HourlySeries, FEATURE_NAMES};
pub use forest::RandomForest;
pub use model::{build_regressor, Regressor};
pub use tree::{RegressionTree, TreeParams};
