//! Bagged ensemble of regression trees on 0/1 labels.
//!
//! Each tree sees a bootstrap sample and considers `max_features` random
//! features per split. Trees are trained in parallel; tree `t` draws from its
//! own `StdRng` seeded with `seed + t`, so the ensemble does not depend on
//! thread scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::FeatureVector;
use crate::error::AppError;
use crate::features::TrainingSet;
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{Classifier, DECISION_THRESHOLD};

pub const N_TREES: usize = 100;

const PARAMS: TreeParams = TreeParams {
    max_depth: 32,
    min_samples_split: 2,
    min_samples_leaf: 1,
    // round(sqrt(5))
    max_features: Some(2),
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(set: &TrainingSet, seed: u64) -> Result<Self, AppError> {
        let n = set.len();
        if n == 0 {
            return Err(AppError::DegenerateTrainingSet(
                "random forest needs at least one row".to_string(),
            ));
        }
        let targets: Vec<f64> = set.labels.iter().map(|&y| f64::from(y)).collect();
        let mean = |idx: &[usize]| idx.iter().map(|&i| targets[i]).sum::<f64>() / idx.len() as f64;

        let trees: Vec<RegressionTree> = (0..N_TREES)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(&set.rows, &targets, bootstrap, &PARAMS, &mut rng, &mean)
            })
            .collect();

        debug!(
            trees = trees.len(),
            max_depth = trees.iter().map(RegressionTree::depth).max().unwrap_or(0),
            "random forest trained"
        );
        Ok(Self { trees })
    }
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("random forest has no trees".to_string());
        }
        self.trees.iter().try_for_each(RegressionTree::validate)
    }
}

impl Classifier for RandomForest {
    fn predict(&self, row: &FeatureVector) -> u8 {
        let p = self.predict_proba(row).unwrap_or(0.0);
        u8::from(p > DECISION_THRESHOLD)
    }

    fn predict_proba(&self, row: &FeatureVector) -> Option<f64> {
        if self.trees.is_empty() {
            return None;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Some(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::threshold_problem;

    #[test]
    fn same_seed_same_forest() {
        let set = threshold_problem();
        let a = RandomForest::fit(&set, 7).unwrap();
        let b = RandomForest::fit(&set, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trees.len(), N_TREES);
    }

    #[test]
    fn probabilities_are_vote_shares() {
        let set = threshold_problem();
        let forest = RandomForest::fit(&set, 42).unwrap();
        for row in &set.rows {
            let p = forest.predict_proba(row).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
        // Clear cases far from the boundary.
        assert_eq!(forest.predict(&[0.0, 10.0, 2.0, 5.0, 1.0]), 1);
        assert_eq!(forest.predict(&[0.0, 4.0, 2.0, 9.0, 1.0]), 0);
    }

    #[test]
    fn empty_forest_has_no_probability() {
        let forest = RandomForest { trees: Vec::new() };
        assert_eq!(forest.predict_proba(&[0.0; 5]), None);
        assert_eq!(forest.predict(&[0.0; 5]), 0);
        assert!(forest.validate().is_err());
    }

    #[test]
    fn trained_forest_validates() {
        let forest = RandomForest::fit(&threshold_problem(), 3).unwrap();
        assert_eq!(forest.validate(), Ok(()));
    }
}
