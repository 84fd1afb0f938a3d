use std::path::Path;

use rusqlite::{Connection, Transaction};

use crate::card::CardRepo;
use crate::classification::ClassificationRepo;
use crate::codelink::CodeLinkRepo;
use crate::error::StorageError;
use crate::relation::RelationRepo;

/// Forward-only migrations, applied serially; `PRAGMA user_version` records
/// how many have run.
const MIGRATIONS: &[&str] = &[SCHEMA_V1];

const SCHEMA_V1: &str = "
CREATE TABLE card (
    key              TEXT PRIMARY KEY,
    summary          TEXT NOT NULL,
    status           TEXT NOT NULL,
    constraints_json TEXT,
    body             TEXT NOT NULL,
    file_path        TEXT NOT NULL UNIQUE,
    updated_at       TEXT NOT NULL
);

CREATE TABLE card_relation (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    type         TEXT NOT NULL,
    src_card_key TEXT NOT NULL REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
    dst_card_key TEXT NOT NULL REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
    is_reverse   INTEGER NOT NULL DEFAULT 0,
    UNIQUE(type, src_card_key, dst_card_key)
);

CREATE INDEX idx_card_relation_src ON card_relation(src_card_key);
CREATE INDEX idx_card_relation_dst ON card_relation(dst_card_key);

CREATE TABLE keyword (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE card_keyword (
    card_key   TEXT NOT NULL REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
    keyword_id INTEGER NOT NULL REFERENCES keyword(id),
    PRIMARY KEY (card_key, keyword_id)
);

CREATE TABLE tag (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE card_tag (
    card_key TEXT NOT NULL REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
    tag_id   INTEGER NOT NULL REFERENCES tag(id),
    PRIMARY KEY (card_key, tag_id)
);

CREATE TABLE code_link (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    card_key TEXT NOT NULL REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
    kind     TEXT NOT NULL,
    file     TEXT NOT NULL,
    symbol   TEXT NOT NULL,
    UNIQUE(card_key, kind, file, symbol)
);

CREATE INDEX idx_code_link_card ON code_link(card_key);
CREATE INDEX idx_code_link_symbol ON code_link(symbol);
CREATE INDEX idx_code_link_file ON code_link(file);

CREATE VIRTUAL TABLE card_fts USING fts5(key, summary, body);

CREATE TRIGGER card_ai AFTER INSERT ON card BEGIN
    INSERT INTO card_fts(rowid, key, summary, body)
    VALUES (new.rowid, new.key, new.summary, new.body);
END;

CREATE TRIGGER card_ad AFTER DELETE ON card BEGIN
    DELETE FROM card_fts WHERE rowid = old.rowid;
END;

CREATE TRIGGER card_au AFTER UPDATE ON card BEGIN
    UPDATE card_fts SET key = new.key, summary = new.summary, body = new.body
    WHERE rowid = old.rowid;
END;
";

/// SQLite-backed card index.
///
/// Owns the connection; the four repositories are lightweight views over it
/// and compose inside a single transaction. The engine is single-threaded,
/// so transactions are taken through `unchecked_transaction`.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the index at `db_path`, creating parent directories.
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        configure_pragmas(&conn)?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory index (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        configure_pragmas(&conn)?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn cards(&self) -> CardRepo<'_> {
        CardRepo::new(&self.conn)
    }

    pub fn relations(&self) -> RelationRepo<'_> {
        RelationRepo::new(&self.conn)
    }

    pub fn classifications(&self) -> ClassificationRepo<'_> {
        ClassificationRepo::new(&self.conn)
    }

    pub fn code_links(&self) -> CodeLinkRepo<'_> {
        CodeLinkRepo::new(&self.conn)
    }

    /// Begin a transaction spanning any combination of repositories.
    pub fn transaction(&self) -> Result<Transaction<'_>, StorageError> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Expose the raw connection for advanced usage (e.g., testing).
    #[doc(hidden)]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn configure_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;\
         PRAGMA busy_timeout = 5000;\
         PRAGMA foreign_keys = ON;",
    )?;
    Ok(())
}

fn migrate(conn: &Connection) -> Result<(), StorageError> {
    let applied: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let expected = MIGRATIONS.len() as u32;
    if applied > expected {
        return Err(StorageError::SchemaMismatch {
            expected,
            actual: applied,
        });
    }
    for (i, sql) in MIGRATIONS.iter().enumerate().skip(applied as usize) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", (i + 1) as u32)?;
        tx.commit()?;
    }
    Ok(())
}
