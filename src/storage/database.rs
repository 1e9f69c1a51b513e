//! `SQLite` database connection and operations.
//!
//! The database is stored at `~/.accessaid/accessaid.db` and holds the
//! `kv_store` table that backs persisted snapshots such as the sync queue.

use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::Paths;
use crate::error::AccessAidError;

use super::kv::KeyValueStore;
use super::migrations;

/// Database connection wrapper.
///
/// The connection sits behind a mutex so the database can be shared with
/// the sync queue across threads.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, AccessAidError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, AccessAidError> {
        let conn = Connection::open(path).map_err(|e| {
            AccessAidError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, AccessAidError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AccessAidError::Database(format!("Failed to open in-memory database: {e}"))
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, AccessAidError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| AccessAidError::Database(format!("Failed to enable foreign keys: {e}")))?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, AccessAidError> {
        let conn = self.lock()?;
        migrations::get_version(&conn)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AccessAidError> {
        self.conn
            .lock()
            .map_err(|_| AccessAidError::Database("Database connection lock poisoned".to_string()))
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, AccessAidError> {
        let conn = self.lock()?;
        conn.query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| AccessAidError::Database(format!("Failed to read key {key}: {e}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AccessAidError> {
        let conn = self.lock()?;
        conn.execute(
            r"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
              ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|e| AccessAidError::Database(format!("Failed to write key {key}: {e}")))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AccessAidError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .map_err(|e| AccessAidError::Database(format!("Failed to remove key {key}: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.schema_version().unwrap() > 0);
    }

    #[test]
    fn test_get_missing_key() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("sync_queue").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.set("sync_queue", "[]").unwrap();
        db.set("sync_queue", "[1]").unwrap();
        assert_eq!(db.get("sync_queue").unwrap(), Some("[1]".to_string()));

        db.remove("sync_queue").unwrap();
        assert_eq!(db.get("sync_queue").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let db = Database::open_at(&db_path).unwrap();
            db.set("greeting", "hello").unwrap();
        }

        let db = Database::open_at(&db_path).unwrap();
        assert_eq!(db.get("greeting").unwrap(), Some("hello".to_string()));
        assert!(db_path.exists());
    }
}
