//! SQLite-backed per-item acknowledgment store.
//!
//! One row per ItemID with its current status. The evaluator reads the
//! status to decide suppression and registers newly-seen items as
//! `Active`; the `Handled` transition is written only by an external
//! actor (the `ack` CLI command).

use std::path::PathBuf;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::StoreError;

/// Acknowledgment state of one reminder item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReminderStatus {
    /// Alerts fire according to due-date math.
    Active,
    /// Acknowledged out of band; never alerted again.
    Handled,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Active => "Active",
            ReminderStatus::Handled => "Handled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(ReminderStatus::Active),
            "Handled" => Some(ReminderStatus::Handled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value status lookup keyed by ItemID.
///
/// `put` is insert-or-overwrite, so first-seen registration is idempotent
/// across overlapping invocations.
pub trait StatusStore {
    fn get(&self, item_id: &str) -> Result<Option<ReminderStatus>, StoreError>;
    fn put(&self, item_id: &str, status: ReminderStatus) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<(String, ReminderStatus)>, StoreError>;
}

/// SQLite database holding the status table.
pub struct StatusDb {
    conn: Connection,
    table: String,
}

impl StatusDb {
    /// Open the database at `~/.config/duebell/duebell.db`.
    ///
    /// Creates the file and the configured table if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the table name is not a plain identifier or
    /// the database cannot be opened or migrated.
    pub fn open(table: &str) -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::QueryFailed(format!("data dir unavailable: {e}")))?
            .join("duebell.db");
        Self::open_at(path, table)
    }

    /// Open the database at an explicit path (used by tests with tempdirs).
    pub fn open_at(path: PathBuf, table: &str) -> Result<Self, StoreError> {
        validate_table(table)?;
        let conn =
            Connection::open(&path).map_err(|source| StoreError::OpenFailed { path, source })?;
        let db = Self {
            conn,
            table: table.to_string(),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory(table: &str) -> Result<Self, StoreError> {
        validate_table(table)?;
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            table: table.to_string(),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        // Table names cannot be bound as parameters; `validate_table`
        // restricted this to a plain identifier.
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                item_id TEXT PRIMARY KEY,
                status  TEXT NOT NULL
            );",
            self.table
        ))?;
        Ok(())
    }
}

fn validate_table(table: &str) -> Result<(), StoreError> {
    let ok = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidTable(table.to_string()))
    }
}

impl StatusStore for StatusDb {
    fn get(&self, item_id: &str) -> Result<Option<ReminderStatus>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT status FROM {} WHERE item_id = ?1", self.table))?;
        let mut rows = stmt.query(params![item_id])?;
        match rows.next()? {
            Some(row) => {
                let value: String = row.get(0)?;
                ReminderStatus::parse(&value)
                    .map(Some)
                    .ok_or_else(|| StoreError::UnknownStatus {
                        item_id: item_id.to_string(),
                        value,
                    })
            }
            None => Ok(None),
        }
    }

    fn put(&self, item_id: &str, status: ReminderStatus) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (item_id, status) VALUES (?1, ?2)
                 ON CONFLICT(item_id) DO UPDATE SET status = excluded.status",
                self.table
            ),
            params![item_id, status.as_str()],
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<(String, ReminderStatus)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT item_id, status FROM {} ORDER BY item_id", self.table))?;
        let mut out = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let item_id: String = row.get(0)?;
            let value: String = row.get(1)?;
            let status =
                ReminderStatus::parse(&value).ok_or_else(|| StoreError::UnknownStatus {
                    item_id: item_id.clone(),
                    value,
                })?;
            out.push((item_id, status));
        }
        Ok(out)
    }
}
