use rusqlite::{params, Connection, Row};

use dk_core::{Card, CardStatus};

use crate::error::StorageError;

const CARD_COLUMNS: &str = "key, summary, status, constraints_json, body, file_path, updated_at";

/// Filter for [`CardRepo::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CardFilter {
    pub status: Option<CardStatus>,
}

/// Repository for `card` rows.
pub struct CardRepo<'c> {
    conn: &'c Connection,
}

impl<'c> CardRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert or update a card row.
    ///
    /// A plain upsert on the key: child rows (relations, mappings, code
    /// links) are untouched, unlike `INSERT OR REPLACE` which would delete
    /// and cascade them away.
    pub fn upsert(&self, card: &Card) -> Result<(), StorageError> {
        let constraints_json = card
            .constraints
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StorageError::InvalidRow {
                reason: format!("unserializable constraints for {}: {e}", card.key),
            })?;
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO card (key, summary, status, constraints_json, body, file_path, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(key) DO UPDATE SET \
                 summary = excluded.summary, \
                 status = excluded.status, \
                 constraints_json = excluded.constraints_json, \
                 body = excluded.body, \
                 file_path = excluded.file_path, \
                 updated_at = excluded.updated_at",
        )?;
        stmt.execute(params![
            card.key,
            card.summary,
            card.status.as_str(),
            constraints_json,
            card.body,
            card.file_path,
            card.updated_at,
        ])?;
        Ok(())
    }

    pub fn find_by_key(&self, key: &str) -> Result<Option<Card>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {CARD_COLUMNS} FROM card WHERE key = ?1"))?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_card(row)?)),
            None => Ok(None),
        }
    }

    pub fn find_by_file_path(&self, file_path: &str) -> Result<Option<Card>, StorageError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {CARD_COLUMNS} FROM card WHERE file_path = ?1"
        ))?;
        let mut rows = stmt.query(params![file_path])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_card(row)?)),
            None => Ok(None),
        }
    }

    pub fn exists_by_key(&self, key: &str) -> Result<bool, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM card WHERE key = ?1")?;
        Ok(stmt.exists(params![key])?)
    }

    /// Delete a card row; relations, mappings, and code links cascade.
    pub fn delete_by_key(&self, key: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM card WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// List cards ordered by key.
    pub fn list(&self, filter: &CardFilter) -> Result<Vec<Card>, StorageError> {
        let mut results = Vec::new();
        match filter.status {
            Some(status) => {
                let mut stmt = self.conn.prepare_cached(&format!(
                    "SELECT {CARD_COLUMNS} FROM card WHERE status = ?1 ORDER BY key"
                ))?;
                let mut rows = stmt.query(params![status.as_str()])?;
                while let Some(row) = rows.next()? {
                    results.push(row_to_card(row)?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare_cached(&format!("SELECT {CARD_COLUMNS} FROM card ORDER BY key"))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    results.push(row_to_card(row)?);
                }
            }
        }
        Ok(results)
    }

    /// Full-text search over `(key, summary, body)`, best match first.
    /// An empty or whitespace-only query returns no rows.
    pub fn search(&self, query: &str) -> Result<Vec<Card>, StorageError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        // Columns are qualified: card_fts shadows key/summary/body.
        let mut stmt = self.conn.prepare_cached(
            "SELECT card.key, card.summary, card.status, card.constraints_json, \
             card.body, card.file_path, card.updated_at FROM card \
             JOIN card_fts ON card_fts.rowid = card.rowid \
             WHERE card_fts MATCH ?1 \
             ORDER BY card_fts.rank",
        )?;
        let mut rows = stmt.query(params![query])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(row_to_card(row)?);
        }
        Ok(results)
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM card", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Card counts grouped by status, ordered by status text.
    pub fn count_by_status(&self) -> Result<Vec<(CardStatus, usize)>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT status, COUNT(*) FROM card GROUP BY status ORDER BY status")?;
        let mut rows = stmt.query([])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let status_str: String = row.get(0)?;
            let status = CardStatus::parse(&status_str).ok_or_else(|| StorageError::InvalidRow {
                reason: format!("unknown card status: {status_str}"),
            })?;
            let count: i64 = row.get(1)?;
            results.push((status, count as usize));
        }
        Ok(results)
    }
}

fn row_to_card(row: &Row<'_>) -> Result<Card, StorageError> {
    let status_str: String = row.get(2)?;
    let status = CardStatus::parse(&status_str).ok_or_else(|| StorageError::InvalidRow {
        reason: format!("unknown card status: {status_str}"),
    })?;
    let constraints_json: Option<String> = row.get(3)?;
    let constraints = constraints_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| StorageError::InvalidRow {
            reason: format!("corrupt constraints json: {e}"),
        })?;
    Ok(Card {
        key: row.get(0)?,
        summary: row.get(1)?,
        status,
        constraints,
        body: row.get(4)?,
        file_path: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::Store;

    pub(crate) fn make_card(key: &str) -> Card {
        Card {
            key: key.to_string(),
            summary: format!("summary of {key}"),
            status: CardStatus::Draft,
            constraints: None,
            body: String::new(),
            file_path: format!("/cards/{key}.card.md"),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn upsert_then_find_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let mut card = make_card("auth/login");
        card.constraints = Some(serde_json::json!({"p99Ms": 120}));
        card.body = "body text".into();
        store.cards().upsert(&card).unwrap();

        let loaded = store.cards().find_by_key("auth/login").unwrap().unwrap();
        assert_eq!(loaded, card);

        let by_path = store
            .cards()
            .find_by_file_path("/cards/auth/login.card.md")
            .unwrap()
            .unwrap();
        assert_eq!(by_path.key, "auth/login");
    }

    #[test]
    fn upsert_updates_in_place() {
        let store = Store::open_in_memory().unwrap();
        let mut card = make_card("a");
        store.cards().upsert(&card).unwrap();
        card.summary = "changed".into();
        card.status = CardStatus::Accepted;
        store.cards().upsert(&card).unwrap();

        let loaded = store.cards().find_by_key("a").unwrap().unwrap();
        assert_eq!(loaded.summary, "changed");
        assert_eq!(loaded.status, CardStatus::Accepted);
        assert_eq!(store.cards().count().unwrap(), 1);
    }

    #[test]
    fn exists_and_delete() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();
        assert!(store.cards().exists_by_key("a").unwrap());
        assert!(store.cards().delete_by_key("a").unwrap());
        assert!(!store.cards().exists_by_key("a").unwrap());
        assert!(!store.cards().delete_by_key("a").unwrap());
    }

    #[test]
    fn list_filters_by_status() {
        let store = Store::open_in_memory().unwrap();
        let mut a = make_card("a");
        a.status = CardStatus::Accepted;
        let b = make_card("b");
        store.cards().upsert(&a).unwrap();
        store.cards().upsert(&b).unwrap();

        let all = store.cards().list(&CardFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, "a");

        let accepted = store
            .cards()
            .list(&CardFilter {
                status: Some(CardStatus::Accepted),
            })
            .unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].key, "a");
    }

    #[test]
    fn search_matches_summary_and_body() {
        let store = Store::open_in_memory().unwrap();
        let mut a = make_card("a");
        a.summary = "token rotation policy".into();
        let mut b = make_card("b");
        b.body = "rotation happens nightly".into();
        let c = make_card("c");
        store.cards().upsert(&a).unwrap();
        store.cards().upsert(&b).unwrap();
        store.cards().upsert(&c).unwrap();

        let hits = store.cards().search("rotation").unwrap();
        let keys: Vec<&str> = hits.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(hits.len(), 2);
        assert!(keys.contains(&"a") && keys.contains(&"b"));
    }

    #[test]
    fn search_empty_query_returns_nothing() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();
        assert!(store.cards().search("").unwrap().is_empty());
        assert!(store.cards().search("   ").unwrap().is_empty());
    }

    #[test]
    fn file_path_is_unique() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();
        let mut clash = make_card("b");
        clash.file_path = "/cards/a.card.md".into();
        assert!(store.cards().upsert(&clash).is_err());
    }
}
