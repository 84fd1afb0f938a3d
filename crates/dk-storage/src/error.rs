/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema version mismatch: expected at most {expected}, found {actual}")]
    SchemaMismatch { expected: u32, actual: u32 },

    #[error("invalid row: {reason}")]
    InvalidRow { reason: String },
}

impl StorageError {
    /// Store-busy contention is the only retryable error class.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Sqlite(e) if is_sqlite_busy(e))
    }
}

fn is_sqlite_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked,
                ..
            },
            _
        )
    )
}

/// Foreign-key violations on relation and code-link inserts are skipped with
/// a warning instead of failing the surrounding transaction.
pub(crate) fn is_fk_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                ..
            },
            _
        )
    )
}
