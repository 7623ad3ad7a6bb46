//! CART regression tree with variance-reduction splits.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Share of features considered at each split.
    pub feature_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
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

/// Nodes live in one arena; children are indices into it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    root: usize,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl RegressionTree {
    /// Fits on the rows of `x`/`y` selected by `rows` (duplicates allowed).
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        rows: Vec<usize>,
        params: TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: 0,
        };
        if rows.is_empty() {
            tree.nodes.push(Node::Leaf { value: 0.0 });
            return tree;
        }
        tree.root = tree.build(x, y, rows, 0, &params, rng);
        tree
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = self.root;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, self.root)
    }

    fn build(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        rows: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let n = rows.len() as f64;
        let sum: f64 = rows.iter().map(|&r| y[r]).sum();
        let sum_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
        let mean = sum / n;
        let sse = sum_sq - sum * sum / n;

        let min_leaf = params.min_samples_leaf.max(1);
        if depth >= params.max_depth || rows.len() < 2 * min_leaf || sse <= 1e-12 {
            return self.push(Node::Leaf { value: mean });
        }

        let n_features = x.get(rows[0]).map(Vec::len).unwrap_or(0);
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        let take = ((n_features as f64 * params.feature_ratio).ceil() as usize).clamp(1, n_features.max(1));
        features.truncate(take);
        features.sort_unstable();

        let Some(best) = best_split(x, y, &rows, &features, min_leaf) else {
            return self.push(Node::Leaf { value: mean });
        };
        if best.sse >= sse - 1e-12 {
            return self.push(Node::Leaf { value: mean });
        }

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| x[r][best.feature] <= best.threshold);

        let left = self.build(x, y, left_rows, depth + 1, params, rng);
        let right = self.build(x, y, right_rows, depth + 1, params, rng);
        self.push(Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        })
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    features: &[usize],
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let n = rows.len();
    let total_sum: f64 = rows.iter().map(|&r| y[r]).sum();
    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let mut best: Option<SplitCandidate> = None;

    for &feature in features {
        let mut sorted: Vec<(f64, f64)> = rows.iter().map(|&r| (x[r][feature], y[r])).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 1..n {
            let (prev_x, prev_y) = sorted[i - 1];
            left_sum += prev_y;
            left_sq += prev_y * prev_y;

            if i < min_leaf || n - i < min_leaf {
                continue;
            }
            let cur_x = sorted[i].0;
            if cur_x <= prev_x {
                continue;
            }

            let nl = i as f64;
            let nr = (n - i) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);

            if best.as_ref().map_or(true, |b| sse < b.sse) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (prev_x + cur_x) / 2.0,
                    sse,
                });
            }
        }
    }
    best
}
