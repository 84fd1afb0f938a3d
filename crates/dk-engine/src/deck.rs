use std::path::{Path, PathBuf};

use dk_core::card_file_path;
use dk_storage::Store;

use crate::config::DeckConfig;
use crate::error::EngineError;
use crate::gildash::Gildash;
use crate::lock::KeyLocks;

/// One deck of cards: the cards directory, its SQLite index, the per-key
/// lock map, and an optional gildash indexer.
///
/// The deck is the context every operation runs against. It is not safe to
/// share across OS threads; all operations assume a single event loop. The
/// lock map is dropped with the deck, so two decks over the same directory
/// serialize nothing between each other.
pub struct Deck {
    config: DeckConfig,
    store: Store,
    locks: KeyLocks,
    gildash: Option<Box<dyn Gildash>>,
}

impl Deck {
    /// Open the index (creating it if needed) and assemble a deck.
    pub fn open(config: DeckConfig) -> Result<Self, EngineError> {
        let store = Store::open(&config.db_path)?;
        Ok(Self {
            config,
            store,
            locks: KeyLocks::new(),
            gildash: None,
        })
    }

    /// Attach a gildash symbol indexer.
    pub fn with_gildash(mut self, gildash: Box<dyn Gildash>) -> Self {
        self.gildash = Some(gildash);
        self
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn cards_dir(&self) -> &Path {
        &self.config.cards_dir
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn locks(&self) -> &KeyLocks {
        &self.locks
    }

    pub fn gildash(&self) -> Option<&dyn Gildash> {
        self.gildash.as_deref()
    }

    pub fn relation_type_allowed(&self, rel_type: &str) -> bool {
        self.config.relation_types.iter().any(|t| t == rel_type)
    }

    /// On-disk path of the card file for `key`.
    pub fn card_path(&self, key: &str) -> PathBuf {
        card_file_path(&self.config.cards_dir, key)
    }
}
