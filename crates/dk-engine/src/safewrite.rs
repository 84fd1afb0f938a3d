use std::future::Future;

use crate::error::EngineError;

/// Run a store mutation followed by its file-side counterpart, rolling the
/// store back when the file side fails.
///
/// 1. `db_action` runs first (synchronous; the store never suspends). Its
///    failure propagates with no compensation.
/// 2. `file_action` runs next; on success the db result is returned.
/// 3. If `file_action` fails, `compensate` runs with the db result. A
///    successful compensation re-raises the file error; a failed one raises
///    [`EngineError::Compensation`] carrying both errors.
pub async fn safe_write<T, Db, FileFn, FileFut, CompFn, CompFut>(
    db_action: Db,
    file_action: FileFn,
    compensate: CompFn,
) -> Result<T, EngineError>
where
    Db: FnOnce() -> Result<T, EngineError>,
    FileFn: FnOnce() -> FileFut,
    FileFut: Future<Output = Result<(), EngineError>>,
    CompFn: FnOnce(&T) -> CompFut,
    CompFut: Future<Output = Result<(), EngineError>>,
{
    let db_result = db_action()?;
    match file_action().await {
        Ok(()) => Ok(db_result),
        Err(file_err) => match compensate(&db_result).await {
            Ok(()) => Err(file_err),
            Err(comp_err) => {
                let err = EngineError::Compensation {
                    operation: Box::new(file_err),
                    compensation: Box::new(comp_err),
                };
                tracing::error!(error = %err, "store rollback failed after file write error");
                Err(err)
            }
        },
    }
}
