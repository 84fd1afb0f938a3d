use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::Serialize;

use dk_codec::{CardFile, CardFrontMatter};
use dk_core::{key_from_file_path, normalize_slug, parse_full_key, CARD_FILE_SUFFIX};
use dk_storage::{CardFilter, StorageError};

use crate::deck::Deck;
use crate::error::EngineError;
use crate::fileio;

use super::{apply_card_file, non_empty, rfc3339_from};

/// Sync one card file into the store: upsert the row and replace all four
/// auxiliary sets to match the file. Idempotent; `updated_at` comes from the
/// file's mtime so a repeated sync leaves the store byte-identical.
pub async fn sync_card_from_file(deck: &Deck, path: &Path) -> Result<String, EngineError> {
    let file = fileio::read_card(path)
        .await?
        .ok_or_else(|| EngineError::CardNotFound {
            key: path.display().to_string(),
        })?;
    let key = parse_full_key(&file.frontmatter.key)?;

    let modified = tokio::fs::metadata(path)
        .await?
        .modified()
        .map(rfc3339_from)
        .unwrap_or_default();
    let path_str = path.to_string_lossy().into_owned();

    let tx = deck.store().transaction()?;
    apply_card_file(&tx, &file, &path_str, &modified)?;
    tx.commit().map_err(StorageError::Sqlite)?;

    tracing::debug!(%key, "card synced from file");
    Ok(key)
}

/// Drop the row (and cascaded children) whose `file_path` is `path`.
/// No-op when no row matches.
pub async fn remove_card_by_file(deck: &Deck, path: &Path) -> Result<bool, EngineError> {
    let path_str = path.to_string_lossy();
    match deck.store().cards().find_by_file_path(&path_str)? {
        Some(card) => {
            deck.store().cards().delete_by_key(&card.key)?;
            tracing::debug!(key = %card.key, "card removed for deleted file");
            Ok(true)
        }
        None => Ok(false),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub file_path: String,
    pub error: String,
}

/// Result of a [`bulk_sync`] run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub synced: usize,
    pub failures: Vec<SyncFailure>,
}

/// Sync every `*.card.md` under `dir` (default: the cards directory),
/// accumulating per-file failures instead of aborting. A missing directory
/// propagates.
pub async fn bulk_sync(deck: &Deck, dir: Option<&Path>) -> Result<SyncReport, EngineError> {
    let dir = dir.unwrap_or_else(|| deck.cards_dir());
    tokio::fs::metadata(dir).await?;

    let mut report = SyncReport {
        synced: 0,
        failures: Vec::new(),
    };
    for path in scan_card_files(dir) {
        match sync_card_from_file(deck, &path).await {
            Ok(_) => report.synced += 1,
            Err(e) => report.failures.push(SyncFailure {
                file_path: path.to_string_lossy().into_owned(),
                error: e.to_string(),
            }),
        }
    }
    tracing::info!(
        synced = report.synced,
        failed = report.failures.len(),
        "bulk sync finished"
    );
    Ok(report)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleRow {
    pub key: String,
    pub file_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMismatch {
    pub key: String,
    pub file_path: String,
    /// The key the filename implies.
    pub file_key: String,
}

/// Read-only diff of the filesystem against the card rows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    /// Rows whose file is gone.
    pub stale_db_rows: Vec<StaleRow>,
    /// Card files no row points at.
    pub orphan_files: Vec<String>,
    /// Rows whose key differs from the filename-derived key.
    pub key_mismatches: Vec<KeyMismatch>,
}

/// Reconcile the store against `dir` (default: the cards directory) without
/// mutating either side.
pub async fn validate_cards(
    deck: &Deck,
    dir: Option<&Path>,
) -> Result<ConsistencyReport, EngineError> {
    let dir = dir.unwrap_or_else(|| deck.cards_dir());
    tokio::fs::metadata(dir).await?;

    let rows = deck.store().cards().list(&CardFilter::default())?;
    let files = scan_card_files(dir);

    let known_paths: HashSet<&str> = rows.iter().map(|c| c.file_path.as_str()).collect();
    let orphan_files = files
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !known_paths.contains(p.as_str()))
        .collect();

    let mut stale_db_rows = Vec::new();
    let mut key_mismatches = Vec::new();
    for row in &rows {
        let row_path = Path::new(&row.file_path);
        if !fileio::card_exists(row_path).await? {
            stale_db_rows.push(StaleRow {
                key: row.key.clone(),
                file_path: row.file_path.clone(),
            });
        }
        if let Some(file_key) = key_from_file_path(dir, row_path) {
            if file_key != row.key {
                key_mismatches.push(KeyMismatch {
                    key: row.key.clone(),
                    file_path: row.file_path.clone(),
                    file_key,
                });
            }
        }
    }

    Ok(ConsistencyReport {
        stale_db_rows,
        orphan_files,
        key_mismatches,
    })
}

/// Regenerate the card file for `key` from store state. Only forward
/// relations appear in the front matter; empty sets are omitted.
pub async fn export_card_to_file(deck: &Deck, key: &str) -> Result<CardFile, EngineError> {
    let key = normalize_slug(key)?;
    let _guard = deck.locks().acquire(&key).await;

    let row = deck
        .store()
        .cards()
        .find_by_key(&key)?
        .ok_or_else(|| EngineError::CardNotFound { key: key.clone() })?;

    let forward: Vec<_> = deck
        .store()
        .relations()
        .find_by_card_key(&key)?
        .into_iter()
        .filter(|r| !r.is_reverse)
        .map(|r| dk_core::RelationSpec {
            rel_type: r.rel_type,
            target: r.dst_card_key,
        })
        .collect();
    let keywords = deck.store().classifications().find_keywords_by_card(&key)?;
    let tags = deck.store().classifications().find_tags_by_card(&key)?;
    let links: Vec<_> = deck
        .store()
        .code_links()
        .find_by_card_key(&key)?
        .iter()
        .map(|l| l.spec())
        .collect();

    let file = CardFile {
        frontmatter: CardFrontMatter {
            key: key.clone(),
            summary: row.summary,
            status: row.status,
            tags: non_empty(Some(tags)),
            keywords: non_empty(Some(keywords)),
            relations: non_empty(Some(forward)),
            code_links: non_empty(Some(links)),
            constraints: row.constraints,
        },
        body: row.body,
    };
    fileio::write_card(Path::new(&row.file_path), &file).await?;

    tracing::info!(%key, "card exported to file");
    Ok(file)
}

/// Drop interned keyword and tag names no card references anymore.
/// Returns how many names were removed.
pub async fn prune_orphan_names(deck: &Deck) -> Result<usize, EngineError> {
    let removed = deck.store().classifications().prune_orphans()?;
    if removed > 0 {
        tracing::info!(removed, "pruned orphaned classification names");
    }
    Ok(removed)
}

/// All card files under `dir`, sorted for deterministic iteration.
fn scan_card_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(CARD_FILE_SUFFIX) {
            files.push(entry.into_path());
        }
    }
    files
}
