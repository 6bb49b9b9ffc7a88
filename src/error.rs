use thiserror::Error;

use crate::schedule::InvariantViolation;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    Invalid(String),
}

impl From<InvariantViolation> for StorageError {
    fn from(violation: InvariantViolation) -> Self {
        StorageError::Invalid(violation.to_string())
    }
}
