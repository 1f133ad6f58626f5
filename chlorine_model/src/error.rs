use std::path::PathBuf;
use thiserror::Error;

use chlorine_traits::SchemaMismatch;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("dimension mismatch: expected {expected} values, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("non-finite input at column {index}")]
    NonFiniteInput { index: usize },
    #[error("feature schema mismatch: {0}")]
    Schema(#[from] SchemaMismatch),
    #[error("invalid {artifact} artifact: {reason}")]
    InvalidArtifact {
        artifact: &'static str,
        reason: String,
    },
    #[error("read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ModelError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            artifact,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
