use std::path::{Path, PathBuf};

use crate::retry::RetryPolicy;

/// Relation types accepted by default when no custom allow-list is given.
pub const DEFAULT_RELATION_TYPES: &[&str] =
    &["depends-on", "relates-to", "extends", "supersedes", "blocks"];

/// Configuration for a [`crate::Deck`].
#[derive(Debug, Clone)]
pub struct DeckConfig {
    /// Directory holding the `*.card.md` files.
    pub cards_dir: PathBuf,
    /// Location of the SQLite index.
    pub db_path: PathBuf,
    /// Allow-list of relation types.
    pub relation_types: Vec<String>,
    /// Back-off policy for store contention.
    pub retry: RetryPolicy,
}

impl DeckConfig {
    /// Conventional layout under a project root: cards in `<root>/cards`,
    /// index in `<root>/.deckard/index.sqlite`.
    pub fn at(root: &Path) -> Self {
        Self {
            cards_dir: root.join("cards"),
            db_path: root.join(".deckard").join("index.sqlite"),
            relation_types: DEFAULT_RELATION_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            retry: RetryPolicy::default(),
        }
    }
}
