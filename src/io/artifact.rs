//! Model artifact read/write.
//!
//! The artifact is one JSON document bundling the classifier with both
//! encoders, so serving can never pair a classifier with the wrong vocabulary.
//! Writes go to `<name>.tmp` next to the target, are fsynced, then renamed.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ClassifierKind;
use crate::error::AppError;
use crate::features::FeatureEncoder;
use crate::models::{ClassifierModel, TrainedModel};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format_version: u32,
    created_at: DateTime<Utc>,
    classifier_kind: ClassifierKind,
    holdout_accuracy: f64,
    classifier: &'a ClassifierModel,
    department_encoder: &'a FeatureEncoder,
    company_encoder: &'a FeatureEncoder,
}

/// Everything optional so missing parts are reported as incomplete rather
/// than as a generic parse failure.
#[derive(Deserialize)]
struct RawArtifact {
    format_version: Option<u32>,
    created_at: Option<DateTime<Utc>>,
    classifier_kind: Option<ClassifierKind>,
    holdout_accuracy: Option<f64>,
    classifier: Option<ClassifierModel>,
    department_encoder: Option<FeatureEncoder>,
    company_encoder: Option<FeatureEncoder>,
}

pub fn write_model(path: &Path, model: &TrainedModel) -> Result<(), AppError> {
    let artifact = ArtifactRef {
        format_version: FORMAT_VERSION,
        created_at: model.created_at(),
        classifier_kind: model.classifier_kind(),
        holdout_accuracy: model.holdout_accuracy(),
        classifier: model.classifier(),
        department_encoder: model.department_encoder(),
        company_encoder: model.company_encoder(),
    };
    let bytes = serde_json::to_vec_pretty(&artifact)?;

    let tmp = tmp_path(path);
    let result = write_synced(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path).map_err(|e| AppError::io(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result?;

    info!(path = %path.display(), kind = model.classifier_kind().display_name(), "model artifact written");
    Ok(())
}

pub fn read_model(path: &Path) -> Result<TrainedModel, AppError> {
    let text = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    parse_model(&text)
}

fn parse_model(text: &str) -> Result<TrainedModel, AppError> {
    let raw: RawArtifact = serde_json::from_str(text)?;

    match raw.format_version {
        Some(FORMAT_VERSION) => {}
        Some(other) => {
            return Err(AppError::IncompleteArtifact(format!(
                "unsupported format_version {other} (expected {FORMAT_VERSION})"
            )));
        }
        None => return Err(missing("format_version")),
    }

    let classifier = raw.classifier.ok_or_else(|| missing("classifier"))?;
    classifier
        .validate()
        .map_err(|e| AppError::IncompleteArtifact(format!("invalid classifier: {e}")))?;
    let department_encoder = raw
        .department_encoder
        .ok_or_else(|| missing("department_encoder"))?
        .reindexed();
    let company_encoder = raw
        .company_encoder
        .ok_or_else(|| missing("company_encoder"))?
        .reindexed();
    let created_at = raw.created_at.ok_or_else(|| missing("created_at"))?;
    let holdout_accuracy = raw.holdout_accuracy.ok_or_else(|| missing("holdout_accuracy"))?;

    if department_encoder.is_empty() || company_encoder.is_empty() {
        return Err(AppError::IncompleteArtifact(
            "encoders must contain at least one class".to_string(),
        ));
    }
    if let Some(kind) = raw.classifier_kind {
        if kind != classifier.kind() {
            return Err(AppError::IncompleteArtifact(format!(
                "classifier_kind says {kind:?} but the classifier is {:?}",
                classifier.kind()
            )));
        }
    }

    Ok(TrainedModel::with_timestamp(
        classifier,
        department_encoder,
        company_encoder,
        holdout_accuracy,
        created_at,
    ))
}

fn missing(part: &str) -> AppError {
    AppError::IncompleteArtifact(format!("missing `{part}`"))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| AppError::io(path, e))?;
    file.write_all(bytes).map_err(|e| AppError::io(path, e))?;
    file.sync_all().map_err(|e| AppError::io(path, e))
}
