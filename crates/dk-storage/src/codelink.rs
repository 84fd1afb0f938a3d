use rusqlite::{params, Connection, Row};

use dk_core::{CodeLink, CodeLinkSpec};

use crate::error::{is_fk_violation, StorageError};

const LINK_COLUMNS: &str = "card_key, kind, file, symbol";

/// Repository for `code_link` rows.
pub struct CodeLinkRepo<'c> {
    conn: &'c Connection,
}

impl<'c> CodeLinkRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Replace all code links owned by `key`. A link whose owning card is
    /// missing is skipped with a warning.
    pub fn replace_for_card(&self, key: &str, links: &[CodeLinkSpec]) -> Result<(), StorageError> {
        self.delete_by_card_key(key)?;
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO code_link (card_key, kind, file, symbol) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for link in links {
            match stmt.execute(params![key, link.kind, link.file, link.symbol]) {
                Ok(_) => {}
                Err(e) if is_fk_violation(&e) => {
                    tracing::warn!(
                        card = key,
                        symbol = %link.symbol,
                        "skipping code link for missing card"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn find_by_card_key(&self, key: &str) -> Result<Vec<CodeLink>, StorageError> {
        self.query(
            &format!("SELECT {LINK_COLUMNS} FROM code_link WHERE card_key = ?1 ORDER BY id"),
            params![key],
        )
    }

    /// Links for a symbol name, optionally narrowed to one file.
    pub fn find_by_symbol(
        &self,
        symbol: &str,
        file: Option<&str>,
    ) -> Result<Vec<CodeLink>, StorageError> {
        match file {
            Some(file) => self.query(
                &format!(
                    "SELECT {LINK_COLUMNS} FROM code_link \
                     WHERE symbol = ?1 AND file = ?2 ORDER BY id"
                ),
                params![symbol, file],
            ),
            None => self.query(
                &format!("SELECT {LINK_COLUMNS} FROM code_link WHERE symbol = ?1 ORDER BY id"),
                params![symbol],
            ),
        }
    }

    pub fn find_by_file(&self, file: &str) -> Result<Vec<CodeLink>, StorageError> {
        self.query(
            &format!("SELECT {LINK_COLUMNS} FROM code_link WHERE file = ?1 ORDER BY id"),
            params![file],
        )
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM code_link", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn delete_by_card_key(&self, key: &str) -> Result<usize, StorageError> {
        Ok(self
            .conn
            .execute("DELETE FROM code_link WHERE card_key = ?1", params![key])?)
    }

    fn query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<CodeLink>, StorageError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = stmt.query(params)?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(row_to_link(row)?);
        }
        Ok(results)
    }
}

fn row_to_link(row: &Row<'_>) -> Result<CodeLink, StorageError> {
    Ok(CodeLink {
        card_key: row.get(0)?,
        kind: row.get(1)?,
        file: row.get(2)?,
        symbol: row.get(3)?,
    })
}
