//! Bagged ensemble of regression trees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree::{RegressionTree, TreeParams};

/// Random forest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` = all.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    /// Mean impurity decrease per feature, summing to 1 (or all 0).
    importances: Vec<f64>,
}

impl RandomForest {
    /// Fit on row-major `rows` against `targets`. Callers guarantee equal,
    /// non-zero lengths and finite values.
    ///
    /// Tree `i` draws its bootstrap sample and feature order from a ChaCha8
    /// stream seeded with `seed + i`, so a fit is fully reproducible.
    pub fn fit(config: &ForestConfig, rows: &[Vec<f64>], targets: &[f64]) -> Self {
        let n = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let params = config.tree_params();

        let mut trees = Vec::with_capacity(config.n_trees);
        let mut importances = vec![0.0; width];

        for i in 0..config.n_trees.max(1) {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
            let sample: Vec<usize> = if config.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let (tree, raw) = RegressionTree::fit(rows, targets, sample, params, &mut rng);

            let total: f64 = raw.iter().sum();
            if total > 0.0 {
                for (acc, v) in importances.iter_mut().zip(&raw) {
                    *acc += v / total;
                }
            }
            trees.push(tree);
        }

        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            importances.iter_mut().for_each(|v| *v /= sum);
        }

        debug!(trees = trees.len(), samples = n, features = width, "Random forest fitted");
        Self { trees, importances }
    }

    /// Mean of the per-tree predictions.
    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        total / self.trees.len() as f64
    }

    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
