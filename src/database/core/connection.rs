//! Database connection management
//!
//! This module provides the connection wrapper and the storage target it opens.

use crate::error::{Result, StoreError};
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name used when no storage target is configured
pub const DEFAULT_DB_FILE: &str = "store_results.db";

/// Where the results database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// A SQLite file on disk, created if it does not exist
    File(PathBuf),
    /// A private in-memory database, gone once the connection is dropped
    Memory,
}

impl Default for StorageTarget {
    fn default() -> Self {
        StorageTarget::File(PathBuf::from(DEFAULT_DB_FILE))
    }
}

impl StorageTarget {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        StorageTarget::File(path.into())
    }

    /// File path of the target, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        match self {
            StorageTarget::File(p) => Some(p.as_path()),
            StorageTarget::Memory => None,
        }
    }
}

impl fmt::Display for StorageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageTarget::File(p) => write!(f, "{}", p.display()),
            StorageTarget::Memory => write!(f, ":memory:"),
        }
    }
}

/// Whether an SQLite error means the file itself cannot be used
pub(crate) fn is_storage_failure(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::DiskFull
        ),
        _ => false,
    }
}

/// Column description as reported by `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// Core database connection wrapper
///
/// `DatabaseConn` owns the SQLite connection for the duration of one unit of
/// work. The connection is closed when the wrapper is dropped, on success and
/// error paths alike.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database for the given target
    ///
    /// File targets are created if missing; their parent directory is not.
    pub fn open(target: &StorageTarget) -> Result<Self> {
        let conn = match target {
            StorageTarget::File(p) => {
                Connection::open(p).map_err(|e| StoreError::unavailable(target.to_string(), e))?
            }
            StorageTarget::Memory => Connection::open_in_memory()
                .map_err(|e| StoreError::unavailable(target.to_string(), e))?,
        };

        let db = DatabaseConn { conn };
        db.probe(target)?;
        debug!("opened database at {}", target);
        Ok(db)
    }

    /// Open an existing database file without write access
    ///
    /// Fails with `StorageUnavailable` if the file does not exist.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::unavailable(display.as_str(), e))?;

        let db = DatabaseConn { conn };
        db.probe(&StorageTarget::file(path))?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&StorageTarget::Memory)
    }

    /// Force SQLite to read the file header so unusable files fail at open time
    ///
    /// Only file-level failures count as unavailable storage. Anything else,
    /// such as another process holding a lock, is a failed statement.
    fn probe(&self, target: &StorageTarget) -> Result<()> {
        self.conn
            .query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(|e| {
                if is_storage_failure(&e) {
                    StoreError::unavailable(target.to_string(), e)
                } else {
                    StoreError::statement("read schema version", e)
                }
            })?;
        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.conn
            .execute(sql, [])
            .map_err(|e| StoreError::statement("execute", e))
    }

    /// Start the transaction that groups the schema statements
    ///
    /// Nothing becomes durable until `commit`; dropping the transaction rolls back.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| StoreError::statement("begin schema transaction", e))
    }

    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                [table_name],
                |row| row.get::<_, bool>(0),
            )
            .map_err(|e| StoreError::statement(format!("look up table {}", table_name), e))
    }

    /// Number of rows currently stored in `table_name`
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table_name.replace('"', "\"\""));
        self.conn
            .query_row(&sql, [], |row| row.get::<_, u64>(0))
            .map_err(|e| StoreError::statement(format!("count rows of {}", table_name), e))
    }

    /// List the columns of a table in declaration order
    ///
    /// Returns an empty list when the table does not exist.
    pub fn table_columns(&self, table_name: &str) -> Result<Vec<ColumnInfo>> {
        let context = format!("read columns of {}", table_name);
        let mut stmt = self
            .conn
            .prepare("SELECT name, type, dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(|e| StoreError::statement(context.as_str(), e))?;

        let rows = stmt
            .query_map([table_name], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    decl_type: row.get(1)?,
                    default_value: row.get(2)?,
                    primary_key: row.get::<_, i64>(3)? > 0,
                })
            })
            .map_err(|e| StoreError::statement(context.as_str(), e))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::statement(context.as_str(), e))
    }

    /// Names of all user tables, excluding SQLite's internal ones
    pub fn user_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(|e| StoreError::statement("list tables", e))?;

        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| StoreError::statement("list tables", e))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| StoreError::statement("list tables", e))?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::database::core::SchemaDefinitions;

    fn sqlite_failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn test_in_memory_starts_without_tables() {
        let db = DatabaseConn::open_in_memory().unwrap();
        assert!(db.user_tables().unwrap().is_empty());
        assert!(!db.table_exists("classification").unwrap());
    }

    #[test]
    fn test_default_target() {
        let target = StorageTarget::default();
        assert_eq!(target.path(), Some(Path::new(DEFAULT_DB_FILE)));
        assert_eq!(target.to_string(), "store_results.db");
        assert_eq!(StorageTarget::Memory.path(), None);
    }

    #[test]
    fn test_prediction_tables_exist_once_created() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute(SchemaDefinitions::REGRESSION_TABLE).unwrap();

        assert!(db.table_exists("regression").unwrap());
        assert!(!db.table_exists("classification").unwrap());
    }

    #[test]
    fn test_count_classification_rows() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute(SchemaDefinitions::CLASSIFICATION_TABLE).unwrap();
        assert_eq!(db.table_count("classification").unwrap(), 0);

        db.execute(
            "INSERT INTO classification (model_name, predicted_label) \
             VALUES ('knn', 'cat'), ('knn', 'dog'), ('svm', 'cat')",
        )
        .unwrap();
        assert_eq!(db.table_count("classification").unwrap(), 3);
    }

    #[test]
    fn test_lock_contention_is_not_a_storage_failure() {
        assert!(!is_storage_failure(&sqlite_failure(rusqlite::ffi::SQLITE_BUSY)));
        assert!(!is_storage_failure(&sqlite_failure(rusqlite::ffi::SQLITE_LOCKED)));
        assert!(is_storage_failure(&sqlite_failure(rusqlite::ffi::SQLITE_NOTADB)));
        assert!(is_storage_failure(&sqlite_failure(rusqlite::ffi::SQLITE_CANTOPEN)));
        assert!(!is_storage_failure(&rusqlite::Error::InvalidQuery));
    }

    #[test]
    fn test_table_columns() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, score REAL DEFAULT 0.5)")
            .unwrap();

        let columns = db.table_columns("t").unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert!(columns[0].primary_key);
        assert_eq!(columns[1].decl_type, "REAL");
        assert_eq!(columns[1].default_value.as_deref(), Some("0.5"));

        assert!(db.table_columns("missing").unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let target = StorageTarget::file(dir.path().join("no-such-dir").join("x.db"));

        let err = DatabaseConn::open(&target).err().unwrap();
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_read_only_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DatabaseConn::open_read_only(&dir.path().join("absent.db"))
            .err()
            .unwrap();
        assert!(err.is_storage_unavailable());
        assert!(!dir.path().join("absent.db").exists());
    }
}
