use std::path::Path;

use dk_codec::{validate_fields, CardFields, CardFile, CardFrontMatter};
use dk_core::{normalize_slug, Card, CardStatus, CodeLinkSpec, RelationSpec};
use dk_storage::{CardRepo, ClassificationRepo, CodeLinkRepo, RelationRepo, StorageError};

use crate::deck::Deck;
use crate::error::EngineError;
use crate::fileio;
use crate::retry::with_retry;
use crate::safewrite::safe_write;

use super::sync::sync_card_from_file;
use super::{apply_card_file, check_relation_types, non_empty, now_utc};

/// Input for [`create_card`].
#[derive(Debug, Clone, Default)]
pub struct CreateCardInput {
    pub slug: String,
    pub summary: String,
    pub status: Option<CardStatus>,
    pub body: Option<String>,
    pub constraints: Option<serde_json::Value>,
    pub keywords: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub relations: Option<Vec<RelationSpec>>,
    pub code_links: Option<Vec<CodeLinkSpec>>,
}

impl CreateCardInput {
    fn fields(&self) -> CardFields<'_> {
        CardFields {
            summary: Some(&self.summary),
            body: self.body.as_deref(),
            keywords: self.keywords.as_deref(),
            tags: self.tags.as_deref(),
            relations: self.relations.as_deref(),
            code_links: self.code_links.as_deref(),
        }
    }
}

/// Input for [`update_card`]. `None` keeps the prior value; for the optional
/// list fields an empty vec deletes, and `constraints` uses the inner option
/// for the same purpose.
#[derive(Debug, Clone, Default)]
pub struct UpdateCardInput {
    pub summary: Option<String>,
    pub status: Option<CardStatus>,
    pub body: Option<String>,
    pub constraints: Option<Option<serde_json::Value>>,
    pub keywords: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub relations: Option<Vec<RelationSpec>>,
    pub code_links: Option<Vec<CodeLinkSpec>>,
}

impl UpdateCardInput {
    fn fields(&self) -> CardFields<'_> {
        CardFields {
            summary: self.summary.as_deref(),
            body: self.body.as_deref(),
            keywords: self.keywords.as_deref(),
            tags: self.tags.as_deref(),
            relations: self.relations.as_deref(),
            code_links: self.code_links.as_deref(),
        }
    }
}

/// Create a new card: index row and file in one safe-write.
pub async fn create_card(deck: &Deck, input: CreateCardInput) -> Result<CardFile, EngineError> {
    validate_fields(&input.fields())?;
    let key = normalize_slug(&input.slug)?;
    let path = deck.card_path(&key);

    let _guard = deck.locks().acquire(&key).await;
    with_retry(&deck.config().retry, || create_attempt(deck, &input, &key, &path)).await
}

async fn create_attempt(
    deck: &Deck,
    input: &CreateCardInput,
    key: &str,
    path: &Path,
) -> Result<CardFile, EngineError> {
    check_relation_types(deck, input.relations.as_deref())?;
    if fileio::card_exists(path).await? {
        return Err(EngineError::CardAlreadyExists {
            key: key.to_string(),
        });
    }

    let card_file = CardFile {
        frontmatter: CardFrontMatter {
            key: key.to_string(),
            summary: input.summary.clone(),
            status: input.status.unwrap_or_default(),
            tags: non_empty(input.tags.clone()),
            keywords: non_empty(input.keywords.clone()),
            relations: non_empty(input.relations.clone()),
            code_links: non_empty(input.code_links.clone()),
            constraints: input.constraints.clone(),
        },
        body: input.body.clone().unwrap_or_default(),
    };
    let path_str = path.to_string_lossy().into_owned();
    let updated_at = now_utc();

    safe_write(
        || {
            let tx = deck.store().transaction()?;
            apply_card_file(&tx, &card_file, &path_str, &updated_at)?;
            tx.commit().map_err(StorageError::Sqlite)?;
            Ok(())
        },
        || fileio::write_card(path, &card_file),
        |_| async {
            deck.store().cards().delete_by_key(key)?;
            Ok(())
        },
    )
    .await?;

    tracing::info!(key, "card created");
    Ok(card_file)
}

/// Update an existing card. Unspecified fields keep their prior value.
pub async fn update_card(
    deck: &Deck,
    key: &str,
    input: UpdateCardInput,
) -> Result<CardFile, EngineError> {
    validate_fields(&input.fields())?;
    let key = normalize_slug(key)?;
    let path = deck.card_path(&key);

    let _guard = deck.locks().acquire(&key).await;
    with_retry(&deck.config().retry, || update_attempt(deck, &key, &path, &input)).await
}

/// Change only the status of a card.
pub async fn update_card_status(
    deck: &Deck,
    key: &str,
    status: CardStatus,
) -> Result<CardFile, EngineError> {
    update_card(
        deck,
        key,
        UpdateCardInput {
            status: Some(status),
            ..Default::default()
        },
    )
    .await
}

async fn update_attempt(
    deck: &Deck,
    key: &str,
    path: &Path,
    input: &UpdateCardInput,
) -> Result<CardFile, EngineError> {
    let existing = fileio::read_card(path)
        .await?
        .ok_or_else(|| EngineError::CardNotFound {
            key: key.to_string(),
        })?;
    // A file whose front matter names some other key is not this card.
    if existing.frontmatter.key != key {
        return Err(EngineError::CardNotFound {
            key: key.to_string(),
        });
    }
    check_relation_types(deck, input.relations.as_deref())?;

    let next = merge_card_file(&existing, input);
    let path_str = path.to_string_lossy().into_owned();
    let updated_at = now_utc();

    safe_write(
        || {
            let tx = deck.store().transaction()?;
            let fm = &next.frontmatter;
            CardRepo::new(&tx).upsert(&Card {
                key: fm.key.clone(),
                summary: fm.summary.clone(),
                status: fm.status,
                constraints: fm.constraints.clone(),
                body: next.body.clone(),
                file_path: path_str.clone(),
                updated_at: updated_at.clone(),
            })?;
            if input.relations.is_some() {
                RelationRepo::new(&tx)
                    .replace_for_card(key, fm.relations.as_deref().unwrap_or_default())?;
            }
            if input.keywords.is_some() {
                ClassificationRepo::new(&tx)
                    .replace_keywords(key, fm.keywords.as_deref().unwrap_or_default())?;
            }
            if input.tags.is_some() {
                ClassificationRepo::new(&tx)
                    .replace_tags(key, fm.tags.as_deref().unwrap_or_default())?;
            }
            if input.code_links.is_some() {
                CodeLinkRepo::new(&tx)
                    .replace_for_card(key, fm.code_links.as_deref().unwrap_or_default())?;
            }
            tx.commit().map_err(StorageError::Sqlite)?;
            Ok(())
        },
        || fileio::write_card(path, &next),
        // The file still holds the prior state; re-syncing restores the rows.
        |_| async { sync_card_from_file(deck, path).await.map(|_| ()) },
    )
    .await?;

    tracing::info!(key, "card updated");
    Ok(next)
}

fn merge_card_file(existing: &CardFile, input: &UpdateCardInput) -> CardFile {
    let prior = &existing.frontmatter;
    CardFile {
        frontmatter: CardFrontMatter {
            key: prior.key.clone(),
            summary: input.summary.clone().unwrap_or_else(|| prior.summary.clone()),
            status: input.status.unwrap_or(prior.status),
            tags: match &input.tags {
                None => prior.tags.clone(),
                Some(values) => non_empty(Some(values.clone())),
            },
            keywords: match &input.keywords {
                None => prior.keywords.clone(),
                Some(values) => non_empty(Some(values.clone())),
            },
            relations: match &input.relations {
                None => prior.relations.clone(),
                Some(values) => non_empty(Some(values.clone())),
            },
            code_links: match &input.code_links {
                None => prior.code_links.clone(),
                Some(values) => non_empty(Some(values.clone())),
            },
            constraints: match &input.constraints {
                None => prior.constraints.clone(),
                Some(value) => value.clone(),
            },
        },
        body: input.body.clone().unwrap_or_else(|| existing.body.clone()),
    }
}

/// Delete a card: index row and file in one safe-write.
pub async fn delete_card(deck: &Deck, key: &str) -> Result<(), EngineError> {
    let key = normalize_slug(key)?;
    let path = deck.card_path(&key);

    let _guard = deck.locks().acquire(&key).await;
    with_retry(&deck.config().retry, || delete_attempt(deck, &key, &path)).await
}

async fn delete_attempt(deck: &Deck, key: &str, path: &Path) -> Result<(), EngineError> {
    if !fileio::card_exists(path).await? {
        return Err(EngineError::CardNotFound {
            key: key.to_string(),
        });
    }

    safe_write(
        || {
            deck.store().cards().delete_by_key(key)?;
            Ok(())
        },
        || async {
            fileio::delete_card(path).await?;
            Ok(())
        },
        // The file is still on disk, so it can repopulate the rows.
        |_| async { sync_card_from_file(deck, path).await.map(|_| ()) },
    )
    .await?;

    tracing::info!(key, "card deleted");
    Ok(())
}

/// Rename a card, preserving its row fields, forward relations,
/// classifications, and code links under the new key.
pub async fn rename_card(
    deck: &Deck,
    old_key: &str,
    new_slug: &str,
) -> Result<CardFile, EngineError> {
    let old_key = normalize_slug(old_key)?;
    let new_key = normalize_slug(new_slug)?;
    let old_path = deck.card_path(&old_key);
    let new_path = deck.card_path(&new_key);
    if old_path == new_path {
        return Err(EngineError::RenameSamePath {
            path: old_path.to_string_lossy().into_owned(),
        });
    }

    // Both endpoints are locked in ascending key order to avoid deadlocking
    // against a rename running the other way.
    let _guards = deck.locks().acquire_pair(&old_key, &new_key).await;
    with_retry(&deck.config().retry, || {
        rename_attempt(deck, &old_key, &new_key, &old_path, &new_path)
    })
    .await
}

async fn rename_attempt(
    deck: &Deck,
    old_key: &str,
    new_key: &str,
    old_path: &Path,
    new_path: &Path,
) -> Result<CardFile, EngineError> {
    let old_file = fileio::read_card(old_path)
        .await?
        .ok_or_else(|| EngineError::CardNotFound {
            key: old_key.to_string(),
        })?;
    if fileio::card_exists(new_path).await? {
        return Err(EngineError::CardAlreadyExists {
            key: new_key.to_string(),
        });
    }

    // File first: move, then rewrite the front-matter key in place.
    if let Some(parent) = new_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::rename(old_path, new_path).await?;

    let mut new_file = old_file.clone();
    new_file.frontmatter.key = new_key.to_string();
    if let Err(e) = fileio::write_card(new_path, &new_file).await {
        undo_move(old_path, new_path, &old_file).await;
        return Err(e);
    }

    if let Err(e) = rename_rows(deck, old_key, new_key, new_path, &new_file) {
        undo_move(old_path, new_path, &old_file).await;
        return Err(e);
    }

    tracing::info!(old_key, new_key, "card renamed");
    Ok(new_file)
}

/// Move the old card row to the new key in one transaction, carrying over
/// its forward relations, keywords, tags, and code links.
fn rename_rows(
    deck: &Deck,
    old_key: &str,
    new_key: &str,
    new_path: &Path,
    new_file: &CardFile,
) -> Result<(), EngineError> {
    let tx = deck.store().transaction()?;

    let forward: Vec<RelationSpec> = RelationRepo::new(&tx)
        .find_by_card_key(old_key)?
        .into_iter()
        .filter(|r| !r.is_reverse)
        .map(|r| RelationSpec {
            rel_type: r.rel_type,
            target: r.dst_card_key,
        })
        .collect();
    let keywords = ClassificationRepo::new(&tx).find_keywords_by_card(old_key)?;
    let tags = ClassificationRepo::new(&tx).find_tags_by_card(old_key)?;
    let links: Vec<_> = CodeLinkRepo::new(&tx)
        .find_by_card_key(old_key)?
        .iter()
        .map(|l| l.spec())
        .collect();
    let old_row = CardRepo::new(&tx).find_by_key(old_key)?;

    CardRepo::new(&tx).delete_by_key(old_key)?;

    let fm = &new_file.frontmatter;
    let card = match old_row {
        // Row fields win over the file: summary, status, constraints, and
        // body carry over from the index.
        Some(row) => Card {
            key: new_key.to_string(),
            summary: row.summary,
            status: row.status,
            constraints: row.constraints,
            body: row.body,
            file_path: new_path.to_string_lossy().into_owned(),
            updated_at: now_utc(),
        },
        // Never-synced card: fall back to the file contents.
        None => Card {
            key: new_key.to_string(),
            summary: fm.summary.clone(),
            status: fm.status,
            constraints: fm.constraints.clone(),
            body: new_file.body.clone(),
            file_path: new_path.to_string_lossy().into_owned(),
            updated_at: now_utc(),
        },
    };
    CardRepo::new(&tx).upsert(&card)?;
    RelationRepo::new(&tx).replace_for_card(new_key, &forward)?;
    ClassificationRepo::new(&tx).replace_keywords(new_key, &keywords)?;
    ClassificationRepo::new(&tx).replace_tags(new_key, &tags)?;
    CodeLinkRepo::new(&tx).replace_for_card(new_key, &links)?;

    tx.commit().map_err(StorageError::Sqlite)?;
    Ok(())
}

/// Best-effort undo of the file move: put the original file (with its
/// original front-matter key) back where it was.
async fn undo_move(old_path: &Path, new_path: &Path, old_file: &CardFile) {
    if let Err(e) = tokio::fs::rename(new_path, old_path).await {
        tracing::warn!(error = %e, "failed to move card file back after rename failure");
        return;
    }
    if let Err(e) = fileio::write_card(old_path, old_file).await {
        tracing::warn!(error = %e, "failed to restore front-matter key after rename failure");
    }
}
