//! Storage layer for handbook.
//!
//! This module provides `SQLite`-backed durable records: small named values
//! grouped by scope, the way a browser keeps local storage per origin. Each
//! handbook file is one scope.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A durable key-value record store.
///
/// Values are written whole; there are no partial updates.
pub trait RecordStore {
    /// Read the record `key` in `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn read_record(&self, scope: &str, key: &str) -> Result<Option<String>>;

    /// Create or overwrite the record `key` in `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn write_record(&self, scope: &str, key: &str, value: &str) -> Result<()>;

    /// Delete the record `key` in `scope`, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn delete_record(&self, scope: &str, key: &str) -> Result<bool>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn read_record(&self, scope: &str, key: &str) -> Result<Option<String>> {
        (**self).read_record(scope, key)
    }

    fn write_record(&self, scope: &str, key: &str, value: &str) -> Result<()> {
        (**self).write_record(scope, key, value)
    }

    fn delete_record(&self, scope: &str, key: &str) -> Result<bool> {
        (**self).delete_record(scope, key)
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Scope the record belongs to.
    pub scope: String,
    /// Record name.
    pub key: String,
    /// Stored value.
    pub value: String,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

/// Storage engine for handbook records.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in a scope, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn records_in_scope(&self, scope: &str) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT scope, key, value, updated_at
            FROM records WHERE scope = ?1 ORDER BY key
            ",
        )?;

        let records = stmt
            .query_map([scope], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Distinct scopes with at least one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn scopes(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT scope FROM records ORDER BY scope")?;
        let scopes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(scopes)
    }

    /// Count total records in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_records = self.count()?;
        let total_scopes: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT scope) FROM records", [], |row| {
                    row.get(0)
                })?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM records ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last_updated = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_records,
            total_scopes,
            last_updated,
            db_size_bytes,
        })
    }

    /// Convert a database row to a Record struct.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
        let updated_at: String = row.get(3)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        Ok(Record {
            scope: row.get(0)?,
            key: row.get(1)?,
            value: row.get(2)?,
            updated_at,
        })
    }
}

impl RecordStore for Storage {
    fn read_record(&self, scope: &str, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE scope = ?1 AND key = ?2",
                params![scope, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_record(&self, scope: &str, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.conn.execute(
            r"
            INSERT INTO records (scope, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![scope, key, value, updated_at],
        )?;
        Ok(())
    }

    fn delete_record(&self, scope: &str, key: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM records WHERE scope = ?1 AND key = ?2",
            params![scope, key],
        )?;
        Ok(affected > 0)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of records stored.
    pub total_records: i64,
    /// Number of distinct scopes (handbooks).
    pub total_scopes: i64,
    /// When any record was last written.
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
