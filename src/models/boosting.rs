//! Gradient boosted trees on the binomial log-loss.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::FeatureVector;
use crate::error::AppError;
use crate::features::TrainingSet;
use crate::math::{logit, sigmoid};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{Classifier, DECISION_THRESHOLD};

pub const N_ESTIMATORS: usize = 100;
pub const LEARNING_RATE: f64 = 0.1;

const PARAMS: TreeParams = TreeParams {
    max_depth: 3,
    min_samples_split: 2,
    min_samples_leaf: 1,
    max_features: None,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    /// Log-odds of the training base rate.
    pub init: f64,
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn fit(set: &TrainingSet, seed: u64) -> Result<Self, AppError> {
        let n = set.len();
        if n == 0 {
            return Err(AppError::DegenerateTrainingSet(
                "gradient boosting needs at least one row".to_string(),
            ));
        }

        let y: Vec<f64> = set.labels.iter().map(|&v| f64::from(v)).collect();
        let prior = y.iter().sum::<f64>() / n as f64;
        let init = logit(prior);

        let mut raw = vec![init; n];
        let mut trees = Vec::with_capacity(N_ESTIMATORS);
        // Feature subsampling is off, so this is never drawn from.
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..N_ESTIMATORS {
            let prob: Vec<f64> = raw.iter().map(|&r| sigmoid(r)).collect();
            let residual: Vec<f64> = y.iter().zip(&prob).map(|(y, p)| y - p).collect();

            // One Newton step per leaf: Σ residual / Σ p(1-p).
            let newton = |idx: &[usize]| {
                let num: f64 = idx.iter().map(|&i| residual[i]).sum();
                let den: f64 = idx.iter().map(|&i| prob[i] * (1.0 - prob[i])).sum();
                if den.abs() < 1e-150 { 0.0 } else { num / den }
            };

            let tree = RegressionTree::fit(&set.rows, &residual, (0..n).collect(), &PARAMS, &mut rng, &newton);
            for (r, row) in raw.iter_mut().zip(&set.rows) {
                *r += LEARNING_RATE * tree.predict(row);
            }
            trees.push(tree);
        }

        let train_loss = log_loss(&y, &raw);
        if !train_loss.is_finite() {
            return Err(AppError::Training(
                "gradient boosting diverged (non-finite training loss)".to_string(),
            ));
        }
        debug!(trees = trees.len(), train_loss, "gradient boosting trained");

        Ok(Self {
            init,
            learning_rate: LEARNING_RATE,
            trees,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("gradient boosting has no trees".to_string());
        }
        if !(self.init.is_finite() && self.learning_rate.is_finite()) {
            return Err("gradient boosting init and learning_rate must be finite".to_string());
        }
        self.trees.iter().try_for_each(RegressionTree::validate)
    }

    pub fn raw_score(&self, row: &FeatureVector) -> f64 {
        self.init + self.learning_rate * self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }
}

impl Classifier for GradientBoosting {
    fn predict(&self, row: &FeatureVector) -> u8 {
        u8::from(sigmoid(self.raw_score(row)) > DECISION_THRESHOLD)
    }

    fn predict_proba(&self, row: &FeatureVector) -> Option<f64> {
        Some(sigmoid(self.raw_score(row)))
    }
}

fn log_loss(y: &[f64], raw: &[f64]) -> f64 {
    let n = y.len().max(1) as f64;
    y.iter()
        .zip(raw)
        .map(|(&y, &r)| {
            let p = sigmoid(r).clamp(1e-15, 1.0 - 1e-15);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::threshold_problem;

    #[test]
    fn init_is_base_rate_log_odds() {
        let set = TrainingSet {
            rows: vec![[0.0; 5], [1.0; 5], [2.0; 5], [3.0; 5]],
            labels: vec![0, 0, 0, 1],
        };
        let model = GradientBoosting::fit(&set, 0).unwrap();
        assert!((model.init - (0.25f64 / 0.75).ln()).abs() < 1e-12);
        assert_eq!(model.trees.len(), N_ESTIMATORS);
        assert_eq!(model.validate(), Ok(()));
    }

    #[test]
    fn boosting_reduces_loss_and_separates() {
        let set = threshold_problem();
        let model = GradientBoosting::fit(&set, 42).unwrap();
        let y: Vec<f64> = set.labels.iter().map(|&v| f64::from(v)).collect();
        let raw: Vec<f64> = set.rows.iter().map(|r| model.raw_score(r)).collect();
        let base = log_loss(&y, &vec![model.init; y.len()]);
        assert!(log_loss(&y, &raw) < base);

        let correct = set
            .rows
            .iter()
            .zip(&set.labels)
            .filter(|(row, y)| model.predict(row) == **y)
            .count();
        assert!(correct as f64 / set.len() as f64 >= 0.9);
    }

    #[test]
    fn single_class_stays_on_that_class() {
        let set = TrainingSet {
            rows: vec![[0.0; 5], [1.0; 5]],
            labels: vec![1, 1],
        };
        let model = GradientBoosting::fit(&set, 0).unwrap();
        assert_eq!(model.predict(&[0.5; 5]), 1);
        assert!(model.predict_proba(&[0.5; 5]).unwrap() > 0.99);
    }
}
