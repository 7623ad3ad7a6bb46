//! Gradient boosting with squared loss.

use super::model::Regressor;
use super::tree::{RegressionTree, TreeParams};
use crate::config::BoostingParams;
use crate::error::{InsightError, Result};
use crate::models::ModelKind;
use crate::service::TaskDeadline;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct GradientBoosting {
    params: BoostingParams,
    seed: u64,
    base: f64,
    stages: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn new(params: BoostingParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            base: 0.0,
            stages: Vec::new(),
        }
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

impl Regressor for GradientBoosting {
    fn kind(&self) -> ModelKind {
        ModelKind::GradientBoosting
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64], deadline: &TaskDeadline) -> Result<()> {
        if x.is_empty() || x.len() != y.len() {
            return Err(InsightError::invalid_input(
                "training_set",
                format!("{} feature rows for {} targets", x.len(), y.len()),
            ));
        }

        let n = x.len();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.stages.clear();
        self.base = y.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![self.base; n];
        let subsample = ((n as f64 * self.params.subsample).ceil() as usize).clamp(1, n);
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_leaf: self.params.min_samples_leaf,
            feature_ratio: 1.0,
        };
        let mut indices: Vec<usize> = (0..n).collect();

        for _ in 0..self.params.n_estimators {
            deadline.check("gradient boosting training")?;
            let residuals: Vec<f64> = y.iter().zip(&predictions).map(|(t, p)| t - p).collect();

            indices.shuffle(&mut rng);
            let mut rows = indices[..subsample].to_vec();
            rows.sort_unstable();

            let tree = RegressionTree::fit(x, &residuals, rows, tree_params, &mut rng);
            for (p, row) in predictions.iter_mut().zip(x) {
                *p += self.params.learning_rate * tree.predict(row);
            }
            self.stages.push(tree);
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.base
            + self
                .stages
                .iter()
                .map(|t| self.params.learning_rate * t.predict(row))
                .sum::<f64>()
    }
}
