//! Model selection across classifier families by hold-out accuracy.
//!
//! Selection rules:
//! 1. Reject sets with no rows or a single label class (also after the split).
//! 2. Train every family in [`ClassifierKind::CANDIDATES`] on the training part.
//! 3. Score each on the held-out part; the strictly highest accuracy wins, so
//!    the earliest candidate wins ties.

use tracing::{debug, info};

use crate::domain::{ClassifierKind, SelectionConfig};
use crate::error::AppError;
use crate::features::TrainingSet;
use crate::fit::split::train_test_split;
use crate::models::ClassifierModel;

/// Hold-out accuracy of one trained candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub kind: ClassifierKind,
    pub accuracy: f64,
}

/// Output of training + selection.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub best: ClassifierModel,
    pub best_kind: ClassifierKind,
    pub best_accuracy: f64,
    /// Every candidate, in training order.
    pub scores: Vec<CandidateScore>,
    pub n_train: usize,
    pub n_test: usize,
}

pub fn select_model(set: &TrainingSet, config: &SelectionConfig) -> Result<ModelSelection, AppError> {
    if set.is_empty() {
        return Err(AppError::DegenerateTrainingSet(
            "no candidate pairs to train on".to_string(),
        ));
    }
    if set.rows.len() != set.labels.len() {
        return Err(AppError::InvalidInput(format!(
            "{} feature rows but {} labels",
            set.rows.len(),
            set.labels.len()
        )));
    }
    ensure_two_classes(set, "training set")?;

    let split = train_test_split(set.len(), config.test_fraction, config.seed)?;
    let train = set.subset(&split.train);
    let test = set.subset(&split.test);
    ensure_two_classes(&train, "training split")?;

    info!(
        n_train = train.len(),
        n_test = test.len(),
        positives = train.positives(),
        "training candidate classifiers"
    );

    let mut models = Vec::with_capacity(ClassifierKind::CANDIDATES.len());
    let mut scores = Vec::with_capacity(ClassifierKind::CANDIDATES.len());
    for kind in ClassifierKind::CANDIDATES {
        let model = kind.train(&train, config.seed)?;
        let accuracy = model.accuracy(&test);
        debug!(model = kind.display_name(), accuracy, "candidate evaluated");
        scores.push(CandidateScore { kind, accuracy });
        models.push(model);
    }

    let best_idx = pick_best(&scores)
        .ok_or_else(|| AppError::Training("no candidate classifier was trained".to_string()))?;
    let best_score = scores[best_idx];
    let best = models.swap_remove(best_idx);

    info!(
        model = best_score.kind.display_name(),
        accuracy = best_score.accuracy,
        "selected classifier"
    );

    Ok(ModelSelection {
        best,
        best_kind: best_score.kind,
        best_accuracy: best_score.accuracy,
        scores,
        n_train: train.len(),
        n_test: test.len(),
    })
}

/// Index of the highest accuracy; the first one wins ties.
pub fn pick_best(scores: &[CandidateScore]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, score) in scores.iter().enumerate() {
        match best {
            Some(b) if score.accuracy <= scores[b].accuracy => {}
            _ => best = Some(i),
        }
    }
    best
}

fn ensure_two_classes(set: &TrainingSet, what: &str) -> Result<(), AppError> {
    let positives = set.positives();
    if positives == 0 || positives == set.len() {
        return Err(AppError::DegenerateTrainingSet(format!(
            "{what} has a single label class ({positives} of {} positive)",
            set.len()
        )));
    }
    Ok(())
}
