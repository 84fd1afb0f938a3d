mod config;
mod deck;
mod error;
pub mod fileio;
mod gildash;
mod lock;
pub mod ops;
mod retry;
mod safewrite;

pub use config::{DeckConfig, DEFAULT_RELATION_TYPES};
pub use deck::Deck;
pub use error::EngineError;
pub use gildash::{Gildash, GildashError, SymbolHit};
pub use lock::{KeyGuard, KeyLocks};
pub use retry::{with_retry, RetryPolicy};
pub use safewrite::safe_write;
