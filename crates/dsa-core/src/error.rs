use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the question bank, the answer store and the survey service.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown category, or nothing recorded yet for a generate request.
    #[error("{0}")]
    NotFound(String),

    /// Input rejected at the validation boundary.
    #[error("{0}")]
    Invalid(String),

    #[error("failed to read question source {path}: {source}")]
    QuestionSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed question source: {0}")]
    QuestionFormat(String),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CoreError {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound(reason.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
