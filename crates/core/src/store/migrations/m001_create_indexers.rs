use rusqlite::Transaction;

use crate::store::StoreError;

use super::Migration;

/// Creates the `indexers` table.
pub struct CreateIndexers;

impl Migration for CreateIndexers {
    fn version(&self) -> u32 {
        1
    }

    fn name(&self) -> &'static str {
        "create_indexers"
    }

    fn up(&self, tx: &Transaction<'_>) -> Result<(), StoreError> {
        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS indexers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                implementation TEXT NOT NULL,
                settings TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                added_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_indexers_implementation ON indexers(implementation);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }
}
