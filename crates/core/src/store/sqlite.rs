use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::indexer::IndexerDefinition;

use super::migrations::Migrator;
use super::{IndexerStore, StoreError};

/// SQLite-backed indexer store
pub struct SqliteIndexerStore {
    conn: Mutex<Connection>,
}

impl SqliteIndexerStore {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Result<Self, StoreError> {
        Migrator::new().run(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Schema version currently applied.
    pub fn schema_version(&self) -> Result<u32, StoreError> {
        let conn = self.conn.lock().unwrap();
        Migrator::current_version(&conn)
    }

    fn row_to_definition(row: &Row<'_>) -> rusqlite::Result<(String, String, String, bool)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn into_definition(
        (name, implementation, settings, enabled): (String, String, String, bool),
    ) -> Result<IndexerDefinition, StoreError> {
        let settings = serde_json::from_str(&settings)
            .map_err(|e| StoreError::Serialization(format!("settings of {}: {}", name, e)))?;
        Ok(IndexerDefinition {
            name,
            implementation,
            enabled,
            settings,
        })
    }
}

impl IndexerStore for SqliteIndexerStore {
    fn upsert(&self, definition: &IndexerDefinition) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();

        let settings = serde_json::to_string(&definition.settings)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        conn.query_row(
            r#"
            INSERT INTO indexers (name, implementation, settings, enabled, added_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(name) DO UPDATE SET
                implementation = excluded.implementation,
                settings = excluded.settings,
                enabled = excluded.enabled
            RETURNING id
            "#,
            params![
                definition.name,
                definition.implementation,
                settings,
                definition.enabled,
                Utc::now().to_rfc3339(),
            ],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list(&self) -> Result<Vec<IndexerDefinition>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT name, implementation, settings, enabled FROM indexers ORDER BY name")
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_definition)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut definitions = Vec::new();
        for row in rows {
            let row = row.map_err(|e| StoreError::Database(e.to_string()))?;
            definitions.push(Self::into_definition(row)?);
        }
        Ok(definitions)
    }

    fn get(&self, name: &str) -> Result<Option<IndexerDefinition>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT name, implementation, settings, enabled FROM indexers WHERE name = ?1",
                params![name],
                Self::row_to_definition,
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(Self::into_definition).transpose()
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        let deleted = conn
            .execute("DELETE FROM indexers WHERE name = ?1", params![name])
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if deleted == 0 {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> SqliteIndexerStore {
        SqliteIndexerStore::in_memory().unwrap()
    }

    fn definition(name: &str) -> IndexerDefinition {
        IndexerDefinition::new(
            name,
            "NorBits",
            serde_json::json!({"username": "alice", "password": "pw"}),
        )
    }

    #[test]
    fn test_new_store_is_fully_migrated() {
        let store = create_test_store();
        assert_eq!(
            store.schema_version().unwrap(),
            Migrator::new().latest_version()
        );
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_and_get() {
        let store = create_test_store();
        store.upsert(&definition("NorBits")).unwrap();

        let loaded = store.get("NorBits").unwrap().unwrap();
        assert_eq!(loaded, definition("NorBits"));
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_same_name_ignoring_case() {
        let store = create_test_store();
        let first = store.upsert(&definition("NorBits")).unwrap();

        let mut updated = definition("norbits");
        updated.enabled = false;
        updated.settings = serde_json::json!({"username": "bob", "password": "pw"});
        let second = store.upsert(&updated).unwrap();

        assert_eq!(first, second);
        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].enabled);
        assert_eq!(all[0].settings["username"], "bob");
    }

    #[test]
    fn test_list_ordered_by_name() {
        let store = create_test_store();
        store.upsert(&definition("zeta")).unwrap();
        store.upsert(&definition("alpha")).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.upsert(&definition("NorBits")).unwrap();

        store.remove("norbits").unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(matches!(
            store.remove("norbits"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("indexerd.db");

        {
            let store = SqliteIndexerStore::new(&path).unwrap();
            store.upsert(&definition("NorBits")).unwrap();
        }

        let store = SqliteIndexerStore::new(&path).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(
            store.schema_version().unwrap(),
            Migrator::new().latest_version()
        );
    }
}
