//! CART regression tree (variance reduction), shared by the forest and the
//! boosted ensemble.
//!
//! The caller decides what a leaf stores through a `leaf_value` callback that
//! receives the sample indices that reached the leaf: the forest stores the
//! mean label, boosting stores a Newton step on the log-loss.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, FEATURE_COUNT};

/// Minimum impurity decrease for a split to be accepted.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split; `None` means all of them.
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub root: Node,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Builder<'a, R: Rng> {
    rows: &'a [FeatureVector],
    targets: &'a [f64],
    params: &'a TreeParams,
    rng: &'a mut R,
    leaf_value: &'a dyn Fn(&[usize]) -> f64,
}

impl RegressionTree {
    /// Grow a tree on `rows[indices]` against `targets` (indexed like `rows`).
    ///
    /// `indices` may contain duplicates (bootstrap samples); duplicates count
    /// as separate observations.
    pub fn fit<R: Rng>(
        rows: &[FeatureVector],
        targets: &[f64],
        indices: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
        leaf_value: &dyn Fn(&[usize]) -> f64,
    ) -> Self {
        let mut builder = Builder {
            rows,
            targets,
            params,
            rng,
            leaf_value,
        };
        let root = builder.grow(indices, 0);
        Self { root }
    }

    pub fn predict(&self, row: &FeatureVector) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Structural check for trees that come from outside the trainer: split
    /// features must index into a [`FeatureVector`] and every number must be finite.
    pub fn validate(&self) -> Result<(), String> {
        fn walk(node: &Node) -> Result<(), String> {
            match node {
                Node::Leaf { value } if value.is_finite() => Ok(()),
                Node::Leaf { value } => Err(format!("non-finite leaf value {value}")),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("split on feature {feature}, only {FEATURE_COUNT} exist"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("non-finite split threshold {threshold}"));
                    }
                    walk(left)?;
                    walk(right)
                }
            }
        }
        walk(&self.root)
    }

    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }
}

impl<R: Rng> Builder<'_, R> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> Node {
        let pure = indices
            .first()
            .map(|&first| indices.iter().all(|&i| self.targets[i] == self.targets[first]))
            .unwrap_or(true);

        if depth >= self.params.max_depth || indices.len() < self.params.min_samples_split || pure {
            return self.leaf(&indices);
        }

        let Some(split) = self.best_split(&indices) else {
            return self.leaf(&indices);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.rows[i][split.feature] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return self.leaf(&indices);
        }

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(left, depth + 1)),
            right: Box::new(self.grow(right, depth + 1)),
        }
    }

    fn leaf(&self, indices: &[usize]) -> Node {
        Node::Leaf {
            value: (self.leaf_value)(indices),
        }
    }

    /// Features are visited in random order when subsampling; the search keeps
    /// going past `max_features` until at least one valid split is found.
    fn best_split(&mut self, indices: &[usize]) -> Option<SplitCandidate> {
        let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
        let budget = match self.params.max_features {
            Some(k) => {
                order.shuffle(&mut *self.rng);
                k.clamp(1, FEATURE_COUNT)
            }
            None => FEATURE_COUNT,
        };

        let mut best: Option<SplitCandidate> = None;
        for (visited, &feature) in order.iter().enumerate() {
            if visited >= budget && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(indices, feature) {
                if best.is_none_or(|b| candidate.gain > b.gain) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_on(&self, indices: &[usize], feature: usize) -> Option<SplitCandidate> {
        let mut sorted = indices.to_vec();
        sorted.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));

        let n = sorted.len();
        let total: f64 = sorted.iter().map(|&i| self.targets[i]).sum();
        let parent = total * total / n as f64;
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut best: Option<SplitCandidate> = None;
        let mut left_sum = 0.0;
        for pos in 1..n {
            left_sum += self.targets[sorted[pos - 1]];
            let lo = self.rows[sorted[pos - 1]][feature];
            let hi = self.rows[sorted[pos]][feature];
            if lo >= hi || pos < min_leaf || n - pos < min_leaf {
                continue;
            }
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / pos as f64 + right_sum * right_sum / (n - pos) as f64;
            let gain = score - parent;
            if gain > MIN_GAIN && best.is_none_or(|b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: lo + (hi - lo) / 2.0,
                    gain,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }

    fn mean_of(targets: &[f64]) -> impl Fn(&[usize]) -> f64 + '_ {
        move |idx: &[usize]| idx.iter().map(|&i| targets[i]).sum::<f64>() / idx.len() as f64
    }

    #[test]
    fn single_threshold_is_recovered() {
        let rows: Vec<FeatureVector> = (0..10).map(|i| [0.0, i as f64, 0.0, 0.0, 0.0]).collect();
        let targets: Vec<f64> = (0..10).map(|i| if i >= 6 { 1.0 } else { 0.0 }).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let leaf = mean_of(&targets);

        let tree = RegressionTree::fit(&rows, &targets, (0..10).collect(), &params(4), &mut rng, &leaf);
        match &tree.root {
            Node::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 1);
                assert_eq!(*threshold, 5.5);
            }
            Node::Leaf { .. } => panic!("expected a split"),
        }
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[0.0, 2.0, 0.0, 0.0, 0.0]), 0.0);
        assert_eq!(tree.predict(&[0.0, 8.0, 0.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn depth_limit_produces_mean_leaf() {
        let rows: Vec<FeatureVector> = (0..4).map(|i| [i as f64, 0.0, 0.0, 0.0, 0.0]).collect();
        let targets = vec![0.0, 1.0, 0.0, 1.0];
        let mut rng = StdRng::seed_from_u64(0);
        let leaf = mean_of(&targets);

        let tree = RegressionTree::fit(&rows, &targets, (0..4).collect(), &params(0), &mut rng, &leaf);
        assert_eq!(tree.root, Node::Leaf { value: 0.5 });
    }

    #[test]
    fn constant_features_yield_a_leaf() {
        let rows = vec![[1.0; FEATURE_COUNT]; 6];
        let targets = vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0];
        let mut rng = StdRng::seed_from_u64(3);
        let leaf = mean_of(&targets);
        let p = TreeParams {
            max_features: Some(2),
            ..params(8)
        };

        let tree = RegressionTree::fit(&rows, &targets, (0..6).collect(), &p, &mut rng, &leaf);
        assert_eq!(tree.depth(), 0);
        assert!((tree.predict(&rows[0]) - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_out_of_range_features() {
        let leaf = |value| Box::new(Node::Leaf { value });
        let tree = RegressionTree {
            root: Node::Split {
                feature: 1,
                threshold: 7.0,
                left: leaf(0.0),
                right: leaf(1.0),
            },
        };
        assert!(tree.validate().is_ok());

        let bad_feature = RegressionTree {
            root: Node::Split {
                feature: FEATURE_COUNT,
                threshold: 7.0,
                left: leaf(0.0),
                right: leaf(1.0),
            },
        };
        assert!(bad_feature.validate().unwrap_err().contains("feature 5"));

        let bad_leaf = RegressionTree {
            root: Node::Split {
                feature: 0,
                threshold: 1.0,
                left: leaf(0.0),
                right: leaf(f64::INFINITY),
            },
        };
        assert!(bad_leaf.validate().is_err());
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let rows: Vec<FeatureVector> = (0..5).map(|i| [i as f64, 0.0, 0.0, 0.0, 0.0]).collect();
        // Best unconstrained split isolates the last sample.
        let targets = vec![0.0, 0.0, 0.0, 0.0, 1.0];
        let mut rng = StdRng::seed_from_u64(0);
        let leaf = mean_of(&targets);
        let p = TreeParams {
            min_samples_leaf: 2,
            ..params(1)
        };

        let tree = RegressionTree::fit(&rows, &targets, (0..5).collect(), &p, &mut rng, &leaf);
        match &tree.root {
            Node::Split { threshold, .. } => assert_eq!(*threshold, 2.5),
            Node::Leaf { .. } => panic!("expected a split"),
        }
    }
}
