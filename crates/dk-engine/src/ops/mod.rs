//! The operations layer: every public verb over a [`Deck`].
//!
//! Write operations share one protocol: validate input, acquire the per-key
//! lock, wrap the attempt in busy-retry, and inside the attempt run the
//! store mutation and the file mutation through [`safe_write`].

mod links;
mod query;
mod sync;
mod write;

pub use links::{
    resolve_card_code_links, validate_code_links, CodeLinkIssue, LinkIssue, ResolvedCodeLink,
};
pub use query::{
    deck_status, find_affected_cards, find_cards_by_symbol, get_card, get_card_context,
    get_relation_graph, list_cards, search_cards, CardContext, DeckStatus, EdgeDirection,
    GraphDirection, GraphNode, GraphOptions, StatusCount,
};
pub use sync::{
    bulk_sync, export_card_to_file, prune_orphan_names, remove_card_by_file, sync_card_from_file,
    validate_cards, ConsistencyReport, KeyMismatch, StaleRow, SyncFailure, SyncReport,
};
pub use write::{
    create_card, delete_card, rename_card, update_card, update_card_status, CreateCardInput,
    UpdateCardInput,
};

use std::time::SystemTime;

use rusqlite::Connection;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use dk_codec::CardFile;
use dk_core::{Card, RelationSpec};
use dk_storage::{CardRepo, ClassificationRepo, CodeLinkRepo, RelationRepo, StorageError};

use crate::deck::Deck;
use crate::error::EngineError;

pub(crate) fn now_utc() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

pub(crate) fn rfc3339_from(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Empty optional lists collapse to "absent" so serialized front matter
/// omits them.
pub(crate) fn non_empty<T>(values: Option<Vec<T>>) -> Option<Vec<T>> {
    values.filter(|v| !v.is_empty())
}

pub(crate) fn check_relation_types(
    deck: &Deck,
    relations: Option<&[RelationSpec]>,
) -> Result<(), EngineError> {
    for spec in relations.unwrap_or_default() {
        if !deck.relation_type_allowed(&spec.rel_type) {
            return Err(EngineError::RelationType {
                rel_type: spec.rel_type.clone(),
            });
        }
    }
    Ok(())
}

/// Write a card file's entire state into the store: upsert the row and
/// replace all four auxiliary sets. Used by create, sync, and the
/// sync-from-file compensations; runs inside the caller's transaction.
pub(crate) fn apply_card_file(
    conn: &Connection,
    file: &CardFile,
    file_path: &str,
    updated_at: &str,
) -> Result<(), StorageError> {
    let fm = &file.frontmatter;
    CardRepo::new(conn).upsert(&Card {
        key: fm.key.clone(),
        summary: fm.summary.clone(),
        status: fm.status,
        constraints: fm.constraints.clone(),
        body: file.body.clone(),
        file_path: file_path.to_string(),
        updated_at: updated_at.to_string(),
    })?;
    RelationRepo::new(conn).replace_for_card(&fm.key, fm.relations.as_deref().unwrap_or_default())?;
    ClassificationRepo::new(conn)
        .replace_keywords(&fm.key, fm.keywords.as_deref().unwrap_or_default())?;
    ClassificationRepo::new(conn).replace_tags(&fm.key, fm.tags.as_deref().unwrap_or_default())?;
    CodeLinkRepo::new(conn).replace_for_card(&fm.key, fm.code_links.as_deref().unwrap_or_default())?;
    Ok(())
}
