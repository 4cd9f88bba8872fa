//! Persistence for Dramashelf: named JSON slots (sqlite-backed or in memory),
//! plus the favorites, settings and catalog files built on top of them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;
use rusqlite::{Connection, OptionalExtension as _};

mod catalog;
mod error;
mod favorites;
mod settings;

pub use catalog::{load_catalog, parse_catalog};
pub use error::{BoxError, CatalogError, StorageError};
pub use favorites::{
    BatchOutcome, FAVORITES_KEY, FavoritesExport, FavoritesStore, Toggled, export_file_name,
};
pub use settings::{SETTINGS_KEY, load_settings, save_settings};

/// A key/value store of serialized values, one value per named slot.
///
/// Access is synchronous and assumes a single owner; callers do their own
/// read-modify-write.
pub trait SlotStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug)]
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("open sqlite db at {}", path.as_ref().display()))?;
        let storage = Self { conn };
        storage.migrate()?;
        tracing::debug!(path = %path.as_ref().display(), "opened slot database");
        Ok(storage)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    fn migrate(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS slots (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
                );
                "#,
            )
            .context("create slots table")?;
        Ok(())
    }

    pub fn list_keys(&self) -> anyhow::Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM slots ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }
}

impl SlotStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row("SELECT value FROM slots WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|err| StorageError::Read {
                key: key.to_string(),
                source: err.into(),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                r#"
                INSERT INTO slots (key, value, updated_at) VALUES (?, ?, unixepoch())
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                (key, value),
            )
            .map(|_| ())
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                source: err.into(),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM slots WHERE key = ?", [key])
            .map(|_| ())
            .map_err(|err| StorageError::Delete {
                key: key.to_string(),
                source: err.into(),
            })
    }
}

/// In-memory slots. Writes can be made to fail, which stands in for a full
/// or disabled backing store.
#[derive(Debug, Default)]
pub struct MemorySlots {
    values: RefCell<HashMap<String, String>>,
    reject_writes: Cell<bool>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }
}

impl SlotStore for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Write {
                key: key.to_string(),
                source: "storage quota exceeded".into(),
            });
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
