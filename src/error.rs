use std::path::PathBuf;
use thiserror::Error;

use crate::types::Dataset;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV processing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source dataset {dataset} not found: {}", path.display())]
    MissingSource { dataset: Dataset, path: PathBuf },

    #[error("Artifact file not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Invalid {artifact} artifact: {message}")]
    InvalidArtifact { artifact: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InsightError {
    /// True for the conditions a consumer should report as "not found"
    /// rather than as an internal failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InsightError::ArtifactNotFound(_) | InsightError::MissingSource { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InsightError>;
