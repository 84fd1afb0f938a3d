use dk_codec::CodecError;
use dk_core::InvalidKeyError;
use dk_storage::StorageError;

/// Errors from the operations layer.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),

    #[error("card validation failed: {0}")]
    Validation(#[from] CodecError),

    #[error("card not found: {key}")]
    CardNotFound { key: String },

    #[error("card already exists: {key}")]
    CardAlreadyExists { key: String },

    #[error("rename source and destination resolve to the same path: {path}")]
    RenameSamePath { path: String },

    #[error("relation type not allowed: {rel_type}")]
    RelationType { rel_type: String },

    #[error("gildash symbol indexer is not configured")]
    GildashNotConfigured,

    /// A file-side write failed after the store transaction committed, and
    /// rolling the store back failed too. Operator attention may be needed.
    #[error("compensation failed: write error: {operation}; rollback error: {compensation}")]
    Compensation {
        operation: Box<EngineError>,
        compensation: Box<EngineError>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Only store contention is retried; every other error propagates
    /// immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_retryable())
    }
}
