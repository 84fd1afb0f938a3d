use rusqlite::{params, Connection};

use crate::error::StorageError;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Keyword,
    Tag,
}

impl Kind {
    fn name_table(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Tag => "tag",
        }
    }

    fn map_table(self) -> &'static str {
        match self {
            Self::Keyword => "card_keyword",
            Self::Tag => "card_tag",
        }
    }

    fn id_column(self) -> &'static str {
        match self {
            Self::Keyword => "keyword_id",
            Self::Tag => "tag_id",
        }
    }
}

/// Repository for the two parallel classification structures, keywords and
/// tags: interned `(name)` rows plus `(card_key, name)` mappings.
pub struct ClassificationRepo<'c> {
    conn: &'c Connection,
}

impl<'c> ClassificationRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Replace the card's keyword mappings; names are interned and shared
    /// across cards. An empty list clears the mappings.
    pub fn replace_keywords(&self, key: &str, names: &[String]) -> Result<(), StorageError> {
        self.replace(Kind::Keyword, key, names)
    }

    /// Replace the card's tag mappings. See [`Self::replace_keywords`].
    pub fn replace_tags(&self, key: &str, names: &[String]) -> Result<(), StorageError> {
        self.replace(Kind::Tag, key, names)
    }

    pub fn find_keywords_by_card(&self, key: &str) -> Result<Vec<String>, StorageError> {
        self.find(Kind::Keyword, key)
    }

    pub fn find_tags_by_card(&self, key: &str) -> Result<Vec<String>, StorageError> {
        self.find(Kind::Tag, key)
    }

    /// Clear both mapping kinds for a card; interned names stay behind.
    pub fn delete_by_card_key(&self, key: &str) -> Result<(), StorageError> {
        for kind in [Kind::Keyword, Kind::Tag] {
            self.conn.execute(
                &format!("DELETE FROM {} WHERE card_key = ?1", kind.map_table()),
                params![key],
            )?;
        }
        Ok(())
    }

    /// Number of interned keyword and tag names.
    pub fn count_names(&self) -> Result<(usize, usize), StorageError> {
        let mut counts = [0usize; 2];
        for (slot, kind) in counts.iter_mut().zip([Kind::Keyword, Kind::Tag]) {
            let count: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", kind.name_table()),
                [],
                |row| row.get(0),
            )?;
            *slot = count as usize;
        }
        Ok((counts[0], counts[1]))
    }

    /// Remove interned names no mapping references. Returns how many were
    /// removed.
    pub fn prune_orphans(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        for kind in [Kind::Keyword, Kind::Tag] {
            removed += self.conn.execute(
                &format!(
                    "DELETE FROM {name} WHERE id NOT IN (SELECT {id_col} FROM {map})",
                    name = kind.name_table(),
                    id_col = kind.id_column(),
                    map = kind.map_table(),
                ),
                [],
            )?;
        }
        Ok(removed)
    }

    fn replace(&self, kind: Kind, key: &str, names: &[String]) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("DELETE FROM {} WHERE card_key = ?1", kind.map_table()),
            params![key],
        )?;
        let mut intern = self.conn.prepare_cached(&format!(
            "INSERT OR IGNORE INTO {} (name) VALUES (?1)",
            kind.name_table()
        ))?;
        let mut map = self.conn.prepare_cached(&format!(
            "INSERT OR IGNORE INTO {map} (card_key, {id_col}) \
             SELECT ?1, id FROM {name} WHERE name = ?2",
            map = kind.map_table(),
            id_col = kind.id_column(),
            name = kind.name_table(),
        ))?;
        for name in names {
            intern.execute(params![name])?;
            map.execute(params![key, name])?;
        }
        Ok(())
    }

    fn find(&self, kind: Kind, key: &str) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT n.name FROM {name} n \
             JOIN {map} m ON m.{id_col} = n.id \
             WHERE m.card_key = ?1 ORDER BY n.name",
            name = kind.name_table(),
            map = kind.map_table(),
            id_col = kind.id_column(),
        ))?;
        let mut rows = stmt.query(params![key])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(row.get(0)?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::tests::make_card;
    use crate::store::Store;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn keyword_rows(store: &Store) -> i64 {
        store
            .connection()
            .query_row("SELECT COUNT(*) FROM keyword", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn replace_and_find() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();

        store
            .classifications()
            .replace_keywords("a", &names(&["session", "auth"]))
            .unwrap();
        store
            .classifications()
            .replace_tags("a", &names(&["backend"]))
            .unwrap();

        assert_eq!(
            store.classifications().find_keywords_by_card("a").unwrap(),
            names(&["auth", "session"])
        );
        assert_eq!(
            store.classifications().find_tags_by_card("a").unwrap(),
            names(&["backend"])
        );
    }

    #[test]
    fn names_are_interned_across_cards() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();
        store.cards().upsert(&make_card("b")).unwrap();

        store
            .classifications()
            .replace_keywords("a", &names(&["shared"]))
            .unwrap();
        store
            .classifications()
            .replace_keywords("b", &names(&["shared"]))
            .unwrap();

        assert_eq!(keyword_rows(&store), 1);
    }

    #[test]
    fn empty_list_clears_mappings_but_keeps_names() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();
        store
            .classifications()
            .replace_keywords("a", &names(&["orphan-to-be"]))
            .unwrap();

        store.classifications().replace_keywords("a", &[]).unwrap();
        assert!(store
            .classifications()
            .find_keywords_by_card("a")
            .unwrap()
            .is_empty());
        assert_eq!(keyword_rows(&store), 1);
    }

    #[test]
    fn prune_removes_only_unreferenced_names() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();
        store
            .classifications()
            .replace_keywords("a", &names(&["kept", "dropped"]))
            .unwrap();
        store
            .classifications()
            .replace_keywords("a", &names(&["kept"]))
            .unwrap();

        let removed = store.classifications().prune_orphans().unwrap();
        assert_eq!(removed, 1);
        assert_eq!(keyword_rows(&store), 1);
        assert_eq!(
            store.classifications().find_keywords_by_card("a").unwrap(),
            names(&["kept"])
        );
    }

    #[test]
    fn card_delete_cascades_mappings() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();
        store
            .classifications()
            .replace_keywords("a", &names(&["k"]))
            .unwrap();

        store.cards().delete_by_key("a").unwrap();
        let mappings: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM card_keyword", [], |r| r.get(0))
            .unwrap();
        assert_eq!(mappings, 0);
        // The interned name survives until an explicit prune.
        assert_eq!(keyword_rows(&store), 1);
    }

    #[test]
    fn duplicate_names_in_input_collapse() {
        let store = Store::open_in_memory().unwrap();
        store.cards().upsert(&make_card("a")).unwrap();
        store
            .classifications()
            .replace_keywords("a", &names(&["dup", "dup"]))
            .unwrap();
        assert_eq!(
            store.classifications().find_keywords_by_card("a").unwrap(),
            names(&["dup"])
        );
    }
}
