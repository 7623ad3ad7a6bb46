use super::boosting::GradientBoosting;
use super::forest::RandomForest;
use crate::config::ForecastConfig;
use crate::error::Result;
use crate::models::ModelKind;
use crate::service::TaskDeadline;

/// A trainable regression model.
pub trait Regressor: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Trains on feature rows `x` and targets `y`. Checks `deadline`
    /// between internal iterations.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64], deadline: &TaskDeadline) -> Result<()>;

    fn predict(&self, row: &[f64]) -> f64;

    fn predict_many(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict(r)).collect()
    }
}

/// Candidates in selection order; on equal error the earlier one wins.
pub const CANDIDATES: [ModelKind; 2] = [ModelKind::RandomForest, ModelKind::GradientBoosting];

pub fn build_regressor(kind: ModelKind, config: &ForecastConfig, seed: u64) -> Box<dyn Regressor> {
    match kind {
        ModelKind::RandomForest => Box::new(RandomForest::new(config.forest.clone(), seed)),
        ModelKind::GradientBoosting => {
            Box::new(GradientBoosting::new(config.boosting.clone(), seed))
        }
    }
}
