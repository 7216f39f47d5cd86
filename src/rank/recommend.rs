//! Classifier-based company recommendations for a new student.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{CompanyProfile, FeatureVector, Recommendation, StudentProfile};
use crate::error::AppError;
use crate::features::against_catalog;
use crate::math::round_to;
use crate::models::{Classifier, TrainedModel};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Companies whose qualification probability is at least `threshold`, best first.
///
/// Every catalog company is scored, including ones added after training (the
/// company is not a feature). Each company appears once (its highest-ranked
/// row). When nothing clears the threshold the result is the single
/// `("None", 0.0)` sentinel.
pub fn recommend(
    student: &StudentProfile,
    companies: &[CompanyProfile],
    model: &TrainedModel,
    threshold: f64,
) -> Result<Vec<Recommendation>, AppError> {
    if !(threshold.is_finite() && (0.0..=1.0).contains(&threshold)) {
        return Err(AppError::InvalidInput(format!(
            "threshold must be within [0, 1], got {threshold}"
        )));
    }

    for company in companies {
        if !model.company_encoder().contains(&company.company) {
            debug!(company = %company.company, "company not seen during training");
        }
    }
    let pairs = against_catalog(student, companies, model.department_encoder())?;

    let mut kept = Vec::new();
    for pair in &pairs {
        let p = positive_probability(model.classifier(), &pair.features);
        debug!(company = %pair.company.company, probability = p, "scored company");
        if p >= threshold {
            kept.push(Recommendation {
                company: pair.company.company.clone(),
                probability_percent: round_to(p * 100.0, 2),
            });
        }
    }

    // Ordered on the rounded percentage: companies that round to the same value
    // tie and keep catalog order.
    kept.sort_by(|a, b| b.probability_percent.total_cmp(&a.probability_percent));
    let mut seen = HashSet::new();
    kept.retain(|r| seen.insert(r.company.clone()));

    if kept.is_empty() {
        return Ok(vec![Recommendation::none()]);
    }
    Ok(kept)
}

/// Calibrated probability when available, otherwise the hard prediction as 0.0/1.0.
pub fn positive_probability(classifier: &dyn Classifier, row: &FeatureVector) -> f64 {
    classifier
        .predict_proba(row)
        .unwrap_or_else(|| f64::from(classifier.predict(row)))
}
