//! The deployable unit: classifier plus the encoders it was trained with.

use chrono::{DateTime, Utc};

use crate::domain::ClassifierKind;
use crate::features::FeatureEncoder;
use crate::models::ClassifierModel;

/// Immutable after construction; safe to share across threads.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    classifier: ClassifierModel,
    department_encoder: FeatureEncoder,
    company_encoder: FeatureEncoder,
    holdout_accuracy: f64,
    created_at: DateTime<Utc>,
}

impl TrainedModel {
    pub fn new(
        classifier: ClassifierModel,
        department_encoder: FeatureEncoder,
        company_encoder: FeatureEncoder,
        holdout_accuracy: f64,
    ) -> Self {
        Self::with_timestamp(
            classifier,
            department_encoder,
            company_encoder,
            holdout_accuracy,
            Utc::now(),
        )
    }

    pub(crate) fn with_timestamp(
        classifier: ClassifierModel,
        department_encoder: FeatureEncoder,
        company_encoder: FeatureEncoder,
        holdout_accuracy: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            classifier,
            department_encoder,
            company_encoder,
            holdout_accuracy,
            created_at,
        }
    }

    pub fn classifier(&self) -> &ClassifierModel {
        &self.classifier
    }

    pub fn classifier_kind(&self) -> ClassifierKind {
        self.classifier.kind()
    }

    pub fn department_encoder(&self) -> &FeatureEncoder {
        &self.department_encoder
    }

    pub fn company_encoder(&self) -> &FeatureEncoder {
        &self.company_encoder
    }

    /// Accuracy on the hold-out split used during selection.
    pub fn holdout_accuracy(&self) -> f64 {
        self.holdout_accuracy
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogisticRegression;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn trained_model_is_shareable() {
        assert_send_sync::<TrainedModel>();
    }

    #[test]
    fn kind_follows_the_classifier() {
        let model = TrainedModel::new(
            ClassifierModel::LogisticRegression(LogisticRegression {
                intercept: 0.0,
                coefficients: [0.0; 5],
                means: [0.0; 5],
                scales: [1.0; 5],
            }),
            FeatureEncoder::fit("department", ["CSE"]),
            FeatureEncoder::fit("company", ["Acme"]),
            0.75,
        );
        assert_eq!(model.classifier_kind(), ClassifierKind::LogisticRegression);
        assert_eq!(model.holdout_accuracy(), 0.75);
        assert!(model.company_encoder().contains("Acme"));
    }
}
