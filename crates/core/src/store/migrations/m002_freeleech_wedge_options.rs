//! Replace the MyAnonamouse boolean `freeleech` setting with the
//! three-way `useFreeleechWedge` option.

use rusqlite::{params, Transaction};
use serde_json::Value;
use tracing::info;

use crate::store::StoreError;

use super::Migration;

const IMPLEMENTATION: &str = "MyAnonamouse";
const LEGACY_KEY: &str = "freeleech";
const WEDGE_KEY: &str = "useFreeleechWedge";

/// When to spend a freeleech wedge on a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum FreeleechWedge {
    Never = 0,
    Preferred = 1,
    Required = 2,
}

impl FreeleechWedge {
    /// The old flag only distinguished "always" from "never".
    pub fn from_legacy(freeleech: bool) -> Self {
        if freeleech {
            FreeleechWedge::Required
        } else {
            FreeleechWedge::Never
        }
    }
}

/// An indexer's id and raw settings JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRow {
    pub id: i64,
    pub settings: String,
}

/// Rewrite the rows that still carry a boolean `freeleech`.
///
/// Only changed rows are returned. Rows with invalid JSON, a non-object
/// document, or a missing or non-boolean flag are left alone, which also
/// makes a second pass a no-op.
pub fn migrate(rows: &[SettingsRow]) -> Vec<SettingsRow> {
    rows.iter()
        .filter_map(|row| {
            migrate_settings(&row.settings).map(|settings| SettingsRow {
                id: row.id,
                settings,
            })
        })
        .collect()
}

fn migrate_settings(raw: &str) -> Option<String> {
    let mut value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object_mut()?;
    let freeleech = object.get(LEGACY_KEY)?.as_bool()?;

    object.remove(LEGACY_KEY);
    object.insert(
        WEDGE_KEY.to_string(),
        Value::from(FreeleechWedge::from_legacy(freeleech) as i64),
    );

    serde_json::to_string(&value).ok()
}

pub struct FreeleechWedgeOptions;

impl Migration for FreeleechWedgeOptions {
    fn version(&self) -> u32 {
        2
    }

    fn name(&self) -> &'static str {
        "freeleech_wedge_options"
    }

    fn up(&self, tx: &Transaction<'_>) -> Result<(), StoreError> {
        let rows = {
            let mut stmt = tx
                .prepare("SELECT id, settings FROM indexers WHERE implementation = ?1")
                .map_err(|e| StoreError::Database(e.to_string()))?;
            let rows = stmt
                .query_map(params![IMPLEMENTATION], |row| {
                    Ok(SettingsRow {
                        id: row.get(0)?,
                        settings: row.get(1)?,
                    })
                })
                .map_err(|e| StoreError::Database(e.to_string()))?;
            let collected = rows
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StoreError::Database(e.to_string()))?;
            collected
        };

        let updated = migrate(&rows);

        let mut stmt = tx
            .prepare("UPDATE indexers SET settings = ?1 WHERE id = ?2")
            .map_err(|e| StoreError::Database(e.to_string()))?;
        for row in &updated {
            stmt.execute(params![row.settings, row.id])
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        info!(
            scanned = rows.len(),
            updated = updated.len(),
            "Converted freeleech flags to wedge options"
        );
        Ok(())
    }
}
