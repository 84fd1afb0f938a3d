use async_trait::async_trait;
use serde::Serialize;

/// A symbol reported by the gildash code indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolHit {
    pub name: String,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Errors from the gildash backend.
#[derive(Debug, thiserror::Error)]
pub enum GildashError {
    #[error("file not indexed: {file}")]
    FileNotIndexed { file: String },

    #[error("gildash backend error: {0}")]
    Backend(String),
}

/// The external code-symbol indexer, treated as an opaque capability.
///
/// The engine degrades gracefully when no indexer is configured: context
/// assembly returns empty resolutions, while the explicit link operations
/// raise [`crate::EngineError::GildashNotConfigured`].
#[async_trait(?Send)]
pub trait Gildash {
    /// Symbols matching `name`, optionally narrowed to one file.
    async fn find_symbols(
        &self,
        name: &str,
        file: Option<&str>,
    ) -> Result<Vec<SymbolHit>, GildashError>;
}
