//! Versioned schema migrations.
//!
//! Each [`Migration`] runs in its own transaction together with the bump of
//! `PRAGMA user_version`, so a failed migration leaves the database at the
//! previous version.

mod m001_create_indexers;
mod m002_freeleech_wedge_options;

pub use m001_create_indexers::CreateIndexers;
pub use m002_freeleech_wedge_options::{
    migrate as migrate_freeleech_settings, FreeleechWedge, FreeleechWedgeOptions, SettingsRow,
};

use rusqlite::{Connection, Transaction};
use tracing::{debug, info};

use crate::metrics;

use super::StoreError;

/// A single schema or data migration.
pub trait Migration: Send + Sync {
    /// Target `user_version`; strictly increasing across migrations.
    fn version(&self) -> u32;

    fn name(&self) -> &'static str;

    fn up(&self, tx: &Transaction<'_>) -> Result<(), StoreError>;
}

/// Applies pending migrations in version order.
pub struct Migrator {
    migrations: Vec<Box<dyn Migration>>,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator {
    /// All known migrations.
    pub fn new() -> Self {
        Self::with_migrations(vec![
            Box::new(CreateIndexers),
            Box::new(FreeleechWedgeOptions),
        ])
    }

    pub fn with_migrations(mut migrations: Vec<Box<dyn Migration>>) -> Self {
        migrations.sort_by_key(|m| m.version());
        Self { migrations }
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version()).unwrap_or(0)
    }

    pub fn current_version(conn: &Connection) -> Result<u32, StoreError> {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Apply every migration newer than the database, returning how many ran.
    pub fn run(&self, conn: &mut Connection) -> Result<usize, StoreError> {
        let current = Self::current_version(conn)?;
        let mut applied = 0;

        for migration in self.migrations.iter().filter(|m| m.version() > current) {
            debug!(
                version = migration.version(),
                name = migration.name(),
                "Applying migration"
            );

            let tx = conn
                .transaction()
                .map_err(|e| StoreError::Database(e.to_string()))?;
            migration.up(&tx)?;
            tx.pragma_update(None, "user_version", migration.version())
                .map_err(|e| StoreError::Database(e.to_string()))?;
            tx.commit()
                .map_err(|e| StoreError::Database(e.to_string()))?;

            metrics::MIGRATIONS_APPLIED.inc();
            info!(
                version = migration.version(),
                name = migration.name(),
                "Migration applied"
            );
            applied += 1;
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Migration for Failing {
        fn version(&self) -> u32 {
            2
        }

        fn name(&self) -> &'static str {
            "failing"
        }

        fn up(&self, tx: &Transaction<'_>) -> Result<(), StoreError> {
            tx.execute_batch("CREATE TABLE scratch (id INTEGER)")
                .map_err(|e| StoreError::Database(e.to_string()))?;
            Err(StoreError::Database("boom".to_string()))
        }
    }

    #[test]
    fn test_run_applies_all_then_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        let migrator = Migrator::new();

        assert_eq!(Migrator::current_version(&conn).unwrap(), 0);
        assert_eq!(migrator.run(&mut conn).unwrap(), 2);
        assert_eq!(Migrator::current_version(&conn).unwrap(), 2);
        assert_eq!(migrator.run(&mut conn).unwrap(), 0);
    }

    #[test]
    fn test_failed_migration_rolls_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        let migrator = Migrator::with_migrations(vec![Box::new(Failing), Box::new(CreateIndexers)]);

        assert!(migrator.run(&mut conn).is_err());
        assert_eq!(Migrator::current_version(&conn).unwrap(), 1);

        let scratch: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'scratch'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(scratch, 0);
    }

    #[test]
    fn test_latest_version() {
        assert_eq!(Migrator::new().latest_version(), 2);
        assert_eq!(Migrator::with_migrations(Vec::new()).latest_version(), 0);
    }
}
