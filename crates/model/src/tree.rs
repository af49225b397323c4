//! CART regression tree grown on squared error.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split; `None` = all of them.
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Nodes live in a flat arena; the root is index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Grower<'a> {
    rows: &'a [Vec<f64>],
    targets: &'a [f64],
    params: TreeParams,
    rng: &'a mut ChaCha8Rng,
    nodes: Vec<Node>,
    /// Total squared-error decrease credited to each feature.
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Grow a tree over `indices` (may repeat, as with a bootstrap sample).
    /// Returns the tree and its raw per-feature squared-error decrease.
    pub fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        indices: Vec<usize>,
        params: TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> (Self, Vec<f64>) {
        let width = rows.first().map_or(0, Vec::len);
        let mut grower = Grower {
            rows,
            targets,
            params,
            rng,
            nodes: Vec::new(),
            importances: vec![0.0; width],
        };
        grower.grow(indices, 0);
        (Self { nodes: grower.nodes }, grower.importances)
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

impl Grower<'_> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let n = indices.len();
        let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
            let y = self.targets[i];
            (s + y, sq + y * y)
        });
        let mean = if n == 0 { 0.0 } else { sum / n as f64 };
        let sse = sum_sq - sum * sum / n.max(1) as f64;

        let splittable = depth < self.params.max_depth
            && n >= self.params.min_samples_split
            && n >= 2 * self.params.min_samples_leaf
            && sse > MIN_GAIN;

        let split = if splittable {
            self.best_split(&indices, sse)
        } else {
            None
        };

        let Some(split) = split else {
            self.nodes.push(Node::Leaf { value: mean });
            return self.nodes.len() - 1;
        };

        self.importances[split.feature] += split.gain;

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.rows[i][split.feature] <= split.threshold);

        // Reserve the slot so the parent precedes its children.
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });
        let left = self.grow(left_idx, depth + 1);
        let right = self.grow(right_idx, depth + 1);
        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }

    /// Sorted sweep per feature with running sums, so each feature costs
    /// one sort instead of one pass per candidate threshold.
    fn best_split(&mut self, indices: &[usize], parent_sse: f64) -> Option<Split> {
        let width = self.importances.len();
        let mut features: Vec<usize> = (0..width).collect();
        features.shuffle(&mut *self.rng);
        if let Some(max) = self.params.max_features {
            features.truncate(max.clamp(1, width));
        }

        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let total_sum: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.targets[i].powi(2)).sum();

        let mut best: Option<Split> = None;
        let mut order = indices.to_vec();

        for feature in features {
            order.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let y = self.targets[order[k - 1]];
                left_sum += y;
                left_sq += y * y;

                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let lo = self.rows[order[k - 1]][feature];
                let hi = self.rows[order[k]][feature];
                if lo >= hi {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / k as f64;
                let right_sse = right_sq - right_sum * right_sum / (n - k) as f64;
                let gain = parent_sse - (left_sse + right_sse);

                if gain > MIN_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    let mid = lo + (hi - lo) / 2.0;
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some(Split {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}
