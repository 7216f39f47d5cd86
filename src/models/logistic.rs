//! L2-regularized logistic regression fitted by IRLS (Newton steps).
//!
//! Features are standardized before fitting; the stored coefficients live on
//! the standardized scale together with the means/scales needed to map a raw
//! feature vector onto it.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{FeatureVector, FEATURE_COUNT};
use crate::error::AppError;
use crate::features::TrainingSet;
use crate::math::{sigmoid, solve_weighted_ridge};
use crate::models::{Classifier, DECISION_THRESHOLD};

const RIDGE_LAMBDA: f64 = 1.0;
const MAX_ITER: usize = 100;
const STEP_TOL: f64 = 1e-8;
const MIN_WEIGHT: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub intercept: f64,
    pub coefficients: [f64; FEATURE_COUNT],
    pub means: [f64; FEATURE_COUNT],
    pub scales: [f64; FEATURE_COUNT],
}

impl LogisticRegression {
    pub fn fit(set: &TrainingSet) -> Result<Self, AppError> {
        let n = set.len();
        if n == 0 {
            return Err(AppError::DegenerateTrainingSet(
                "logistic regression needs at least one row".to_string(),
            ));
        }

        let (means, scales) = standardization(&set.rows);
        let p = FEATURE_COUNT + 1;
        let mut x = DMatrix::<f64>::zeros(n, p);
        for (i, row) in set.rows.iter().enumerate() {
            x[(i, 0)] = 1.0;
            for j in 0..FEATURE_COUNT {
                x[(i, j + 1)] = (row[j] - means[j]) / scales[j];
            }
        }

        let mut beta = DVector::<f64>::zeros(p);
        let mut weights = vec![0.0; n];
        let mut z = DVector::<f64>::zeros(n);
        let mut converged = false;

        for iter in 0..MAX_ITER {
            let eta = &x * &beta;
            for i in 0..n {
                let prob = sigmoid(eta[i]);
                let w = (prob * (1.0 - prob)).max(MIN_WEIGHT);
                weights[i] = w;
                z[i] = eta[i] + (f64::from(set.labels[i]) - prob) / w;
            }

            let next = solve_weighted_ridge(&x, &z, &weights, RIDGE_LAMBDA).ok_or_else(|| {
                AppError::Training(format!("IRLS step {iter} is ill-conditioned"))
            })?;
            let step = (&next - &beta).amax();
            beta = next;
            if step < STEP_TOL {
                debug!(iterations = iter + 1, "logistic regression converged");
                converged = true;
                break;
            }
        }
        if !converged {
            debug!(max_iter = MAX_ITER, "logistic regression stopped before convergence");
        }

        let mut coefficients = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            coefficients[j] = beta[j + 1];
        }
        Ok(Self {
            intercept: beta[0],
            coefficients,
            means,
            scales,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        let finite = self.intercept.is_finite()
            && self.coefficients.iter().chain(&self.means).all(|v| v.is_finite());
        if !finite {
            return Err("logistic regression has non-finite parameters".to_string());
        }
        if !self.scales.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err("logistic regression scales must be positive".to_string());
        }
        Ok(())
    }

    /// Linear predictor (log-odds) for a raw feature vector.
    pub fn decision_function(&self, row: &FeatureVector) -> f64 {
        let mut eta = self.intercept;
        for j in 0..FEATURE_COUNT {
            eta += self.coefficients[j] * (row[j] - self.means[j]) / self.scales[j];
        }
        eta
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, row: &FeatureVector) -> u8 {
        u8::from(sigmoid(self.decision_function(row)) > DECISION_THRESHOLD)
    }

    fn predict_proba(&self, row: &FeatureVector) -> Option<f64> {
        Some(sigmoid(self.decision_function(row)))
    }
}

/// Column means and population standard deviations (constant columns get scale 1).
fn standardization(rows: &[FeatureVector]) -> ([f64; FEATURE_COUNT], [f64; FEATURE_COUNT]) {
    let n = rows.len().max(1) as f64;
    let mut means = [0.0; FEATURE_COUNT];
    for row in rows {
        for j in 0..FEATURE_COUNT {
            means[j] += row[j];
        }
    }
    means.iter_mut().for_each(|m| *m /= n);

    let mut scales = [0.0; FEATURE_COUNT];
    for row in rows {
        for j in 0..FEATURE_COUNT {
            let d = row[j] - means[j];
            scales[j] += d * d;
        }
    }
    for s in scales.iter_mut() {
        let sd = (*s / n).sqrt();
        *s = if sd > 1e-12 { sd } else { 1.0 };
    }
    (means, scales)
}
