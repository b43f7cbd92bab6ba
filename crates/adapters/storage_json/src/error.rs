//! Storage-specific error type wrapping filesystem and JSON errors.

use ruletree_domain::error::RuleTreeError;

/// Errors originating from the JSON directory storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing a rule file failed.
    #[error("io error")]
    Io(#[from] std::io::Error),

    /// Failed to serialize a rule.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for RuleTreeError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
