//! Bagged random forest over regression trees.

use super::model::Regressor;
use super::tree::{RegressionTree, TreeParams};
use crate::config::ForestParams;
use crate::error::{InsightError, Result};
use crate::models::ModelKind;
use crate::service::TaskDeadline;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RandomForest {
    params: ForestParams,
    seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(params: ForestParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64], deadline: &TaskDeadline) -> Result<()> {
        if x.is_empty() || x.len() != y.len() {
            return Err(InsightError::invalid_input(
                "training_set",
                format!("{} feature rows for {} targets", x.len(), y.len()),
            ));
        }

        self.trees.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let n = x.len();
        let sample_size = ((n as f64 * self.params.sample_ratio) as usize).max(1);
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_leaf: self.params.min_samples_leaf,
            feature_ratio: self.params.feature_ratio,
        };

        for _ in 0..self.params.n_trees {
            deadline.check("random forest training")?;
            let bootstrap: Vec<usize> = (0..sample_size).map(|_| rng.gen_range(0..n)).collect();
            self.trees
                .push(RegressionTree::fit(x, y, bootstrap, tree_params, &mut rng));
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }
}
