//! Card file I/O. Reads distinguish "absent" from "malformed"; writes create
//! parent directories and overwrite.

use std::io;
use std::path::Path;

use dk_codec::{parse_card_file, serialize_card_file, CardFile};

use crate::error::EngineError;

/// A path under a non-directory counts as absent, same as a missing file.
fn is_absent(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::NotFound | io::ErrorKind::NotADirectory)
}

/// Read and parse the card file at `path`; `None` when the file is absent.
pub async fn read_card(path: &Path) -> Result<Option<CardFile>, EngineError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(parse_card_file(&text)?)),
        Err(e) if is_absent(e.kind()) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Serialize and write `card` to `path`, creating parent directories.
pub async fn write_card(path: &Path, card: &CardFile) -> Result<(), EngineError> {
    let text = serialize_card_file(card)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, text).await?;
    Ok(())
}

/// Remove the card file at `path`; `false` when it was already absent.
pub async fn delete_card(path: &Path) -> Result<bool, EngineError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if is_absent(e.kind()) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub async fn card_exists(path: &Path) -> Result<bool, EngineError> {
    match tokio::fs::metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if is_absent(e.kind()) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
