//! Binary classifiers for (student, company) qualification.
//!
//! Every family implements [`Classifier`]; the selector trains them uniformly
//! through [`ClassifierKind::train`] and keeps the result as a serializable
//! [`ClassifierModel`].

pub mod boosting;
pub mod forest;
pub mod logistic;
pub mod trained;
pub mod tree;

pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use trained::TrainedModel;

use serde::{Deserialize, Serialize};

use crate::domain::{ClassifierKind, FeatureVector};
use crate::error::AppError;
use crate::features::TrainingSet;

/// Decision threshold applied to calibrated probabilities.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// A fitted binary classifier.
pub trait Classifier {
    /// Hard 0/1 prediction.
    fn predict(&self, row: &FeatureVector) -> u8;

    /// Probability of the positive class, when the family produces one.
    fn predict_proba(&self, row: &FeatureVector) -> Option<f64> {
        let _ = row;
        None
    }
}

/// A trained classifier of any supported family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
}

impl ClassifierModel {
    pub fn kind(&self) -> ClassifierKind {
        match self {
            ClassifierModel::LogisticRegression(_) => ClassifierKind::LogisticRegression,
            ClassifierModel::RandomForest(_) => ClassifierKind::RandomForest,
            ClassifierModel::GradientBoosting(_) => ClassifierKind::GradientBoosting,
        }
    }

    /// Reject parameters that would make prediction panic or return garbage.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierModel::LogisticRegression(m) => m.validate(),
            ClassifierModel::RandomForest(m) => m.validate(),
            ClassifierModel::GradientBoosting(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierModel::LogisticRegression(m) => m,
            ClassifierModel::RandomForest(m) => m,
            ClassifierModel::GradientBoosting(m) => m,
        }
    }

    /// Share of rows whose prediction equals the label.
    pub fn accuracy(&self, set: &TrainingSet) -> f64 {
        if set.is_empty() {
            return 0.0;
        }
        let hits = set
            .rows
            .iter()
            .zip(&set.labels)
            .filter(|(row, y)| self.predict(row) == **y)
            .count();
        hits as f64 / set.len() as f64
    }
}

impl Classifier for ClassifierModel {
    fn predict(&self, row: &FeatureVector) -> u8 {
        self.inner().predict(row)
    }

    fn predict_proba(&self, row: &FeatureVector) -> Option<f64> {
        self.inner().predict_proba(row)
    }
}

impl ClassifierKind {
    /// Fit this family on `set`. `seed` drives any randomness (bootstrap, feature sampling).
    pub fn train(self, set: &TrainingSet, seed: u64) -> Result<ClassifierModel, AppError> {
        if set.is_empty() {
            return Err(AppError::DegenerateTrainingSet(
                "no rows to train on".to_string(),
            ));
        }
        Ok(match self {
            ClassifierKind::LogisticRegression => {
                ClassifierModel::LogisticRegression(LogisticRegression::fit(set)?)
            }
            ClassifierKind::RandomForest => {
                ClassifierModel::RandomForest(RandomForest::fit(set, seed)?)
            }
            ClassifierKind::GradientBoosting => {
                ClassifierModel::GradientBoosting(GradientBoosting::fit(set, seed)?)
            }
        })
    }
}
