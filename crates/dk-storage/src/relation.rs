use rusqlite::{params, Connection};

use dk_core::{CardRelation, RelationSpec};

use crate::error::{is_fk_violation, StorageError};

/// Repository for `card_relation` edges.
pub struct RelationRepo<'c> {
    conn: &'c Connection,
}

impl<'c> RelationRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Replace the edges owned by `key` with `relations`.
    ///
    /// Owned edges are the card's forward edges (`src = key`) and the mirror
    /// rows its forward edges produced on other cards (`dst = key` and
    /// `is_reverse`). Forward edges other cards point at `key` are left
    /// alone. Each new forward edge is inserted together with its mirror; an
    /// edge whose target card is missing is skipped with a warning.
    pub fn replace_for_card(
        &self,
        key: &str,
        relations: &[RelationSpec],
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM card_relation \
             WHERE (src_card_key = ?1 AND is_reverse = 0) \
                OR (dst_card_key = ?1 AND is_reverse = 1)",
            params![key],
        )?;

        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO card_relation (type, src_card_key, dst_card_key, is_reverse) \
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for spec in relations {
            match stmt.execute(params![spec.rel_type, key, spec.target, 0i64]) {
                Ok(_) => {}
                Err(e) if is_fk_violation(&e) => {
                    tracing::warn!(
                        card = key,
                        target = %spec.target,
                        rel_type = %spec.rel_type,
                        "skipping relation to missing card"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
            stmt.execute(params![spec.rel_type, spec.target, key, 1i64])?;
        }
        Ok(())
    }

    /// Total number of stored edges, mirrors included.
    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM card_relation", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All edges departing `key`, forward and reverse, in insertion order.
    pub fn find_by_card_key(&self, key: &str) -> Result<Vec<CardRelation>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT type, src_card_key, dst_card_key, is_reverse \
             FROM card_relation WHERE src_card_key = ?1 ORDER BY id",
        )?;
        let mut rows = stmt.query(params![key])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let is_reverse: i64 = row.get(3)?;
            results.push(CardRelation {
                rel_type: row.get(0)?,
                src_card_key: row.get(1)?,
                dst_card_key: row.get(2)?,
                is_reverse: is_reverse != 0,
            });
        }
        Ok(results)
    }
}
