use std::path::PathBuf;

use thiserror::Error;

/// Every failure the library and the binary can report.
///
/// Variants map onto process exit codes the same way across the crate:
///
/// - `2`: bad input or configuration (unknown categories, malformed CSV, bad flags)
/// - `3`: not enough usable data (degenerate training sets)
/// - `4`: internal/model failures (numeric breakdown, corrupt artifacts)
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown {field} category: '{value}' was not seen when the model was trained.")]
    UnknownCategory { field: String, value: String },

    #[error("Unknown {field} code: {code}")]
    UnknownCode { field: String, code: usize },

    #[error("Missing required field: `{0}`")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate training set: {0}")]
    DegenerateTrainingSet(String),

    #[error("Model training failed: {0}")]
    Training(String),

    #[error("Incomplete model artifact: {0}")]
    IncompleteArtifact(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::UnknownCategory { .. }
            | AppError::MissingField(_)
            | AppError::InvalidInput(_)
            | AppError::Io { .. }
            | AppError::Csv(_) => 2,
            AppError::DegenerateTrainingSet(_) => 3,
            AppError::UnknownCode { .. }
            | AppError::Training(_)
            | AppError::IncompleteArtifact(_)
            | AppError::Json(_) => 4,
        }
    }

    /// Whether a serving layer should surface this as a request error rather
    /// than a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::UnknownCategory { .. } | AppError::MissingField(_) | AppError::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_is_a_client_error() {
        let err = AppError::UnknownCategory {
            field: "department".to_string(),
            value: "BIO".to_string(),
        };
        assert!(err.is_client_error());
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("department"));
        assert!(err.to_string().contains("BIO"));
    }

    #[test]
    fn degenerate_training_set_uses_insufficient_data_code() {
        let err = AppError::DegenerateTrainingSet("only one class".to_string());
        assert!(!err.is_client_error());
        assert_eq!(err.exit_code(), 3);
    }
}
