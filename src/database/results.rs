//! Results database storage
//!
//! Entry points for bootstrapping the prediction tables and for reporting on
//! an existing database file without touching it.

use crate::database::core::{
    DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, StorageTarget,
};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Handle to an initialized results database
///
/// Opening the handle guarantees both prediction tables exist. The connection
/// is released when the handle is dropped.
pub struct ResultsDatabase {
    db: DatabaseConn,
    target: StorageTarget,
}

impl ResultsDatabase {
    /// Open the results database and ensure its tables exist
    ///
    /// Existing tables and their rows are left untouched.
    pub fn open(target: &StorageTarget) -> Result<Self> {
        let db = DatabaseConn::open(target)?;
        SchemaManager::new(&db).initialize()?;
        info!("results database ready at {}", target);

        Ok(Self {
            db,
            target: target.clone(),
        })
    }

    /// Create an in-memory results database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&StorageTarget::Memory)
    }

    pub fn target(&self) -> &StorageTarget {
        &self.target
    }

    /// Get the underlying database connection
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }

    pub fn schema_status(&self) -> Result<SchemaStatus> {
        SchemaManager::new(&self.db).check_status()
    }

    /// Row counts for every managed table
    pub fn table_counts(&self) -> Result<Vec<TableReport>> {
        table_reports(&self.db)
    }
}

/// Ensure the prediction tables exist at the given target
///
/// Opens (creating if needed) the database file, creates any missing table,
/// commits, and closes the connection again.
pub fn initialize_storage(target: &StorageTarget) -> Result<()> {
    let db = ResultsDatabase::open(target)?;
    drop(db);
    Ok(())
}

/// Row count of one managed table; `rows` is `None` when the table is absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
}

/// Snapshot of a results database file
#[derive(Debug, Clone, Serialize)]
pub struct StorageReport {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub schema: SchemaStatus,
    pub tables: Vec<TableReport>,
}

/// Report on the database at `path` without creating or modifying it
pub fn inspect_storage(path: &Path) -> Result<StorageReport> {
    let display = path.display().to_string();

    if !path.exists() {
        return Ok(StorageReport {
            path: display,
            exists: false,
            size_bytes: None,
            schema: SchemaStatus::NotInitialized,
            tables: SchemaDefinitions::TABLES
                .iter()
                .map(|t| TableReport {
                    name: t.name.to_string(),
                    rows: None,
                })
                .collect(),
        });
    }

    let size_bytes = std::fs::metadata(path).ok().map(|m| m.len());
    let db = DatabaseConn::open_read_only(path)?;
    let schema = SchemaManager::new(&db).check_status()?;
    let tables = table_reports(&db)?;

    Ok(StorageReport {
        path: display,
        exists: true,
        size_bytes,
        schema,
        tables,
    })
}

fn table_reports(db: &DatabaseConn) -> Result<Vec<TableReport>> {
    SchemaDefinitions::TABLES
        .iter()
        .map(|t| -> Result<TableReport> {
            let rows = if db.table_exists(t.name)? {
                Some(db.table_count(t.name)?)
            } else {
                None
            };
            Ok(TableReport {
                name: t.name.to_string(),
                rows,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = ResultsDatabase::open_in_memory().unwrap();
        assert_eq!(db.schema_status().unwrap(), SchemaStatus::Current);
        assert_eq!(db.target(), &StorageTarget::Memory);
    }

    #[test]
    fn test_tables_start_empty() {
        let db = ResultsDatabase::open_in_memory().unwrap();
        let counts = db.table_counts().unwrap();

        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|t| t.rows == Some(0)));
    }

    #[test]
    fn test_storage_assigns_id_and_timestamp() {
        let db = ResultsDatabase::open_in_memory().unwrap();
        let conn = db.connection();

        conn.execute(
            "INSERT INTO classification (model_name, features, predicted_label) VALUES (?1, ?2, ?3)",
            ["iris-tree", "[5.1, 3.5, 1.4, 0.2]", "setosa"],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO classification (model_name, features, predicted_label) VALUES (?1, ?2, ?3)",
            ["iris-tree", "[6.2, 2.9, 4.3, 1.3]", "versicolor"],
        )
        .unwrap();

        let ids: Vec<i64> = conn
            .prepare("SELECT id FROM classification ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);

        let timestamp: String = conn
            .query_row("SELECT timestamp FROM classification WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[test]
    fn test_regression_value_is_real() {
        let db = ResultsDatabase::open_in_memory().unwrap();
        let conn = db.connection();

        conn.execute(
            "INSERT INTO regression (model_name, features, predicted_value) VALUES (?1, ?2, ?3)",
            rusqlite::params!["housing-lr", "{\"rooms\": 3}", 241_500.75_f64],
        )
        .unwrap();

        let value: f64 = conn
            .query_row("SELECT predicted_value FROM regression", [], |row| row.get(0))
            .unwrap();
        assert!((value - 241_500.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_initialize_storage_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store_results.db");

        initialize_storage(&StorageTarget::file(&path)).unwrap();

        assert!(path.exists());
        let report = inspect_storage(&path).unwrap();
        assert!(report.exists);
        assert_eq!(report.schema, SchemaStatus::Current);
    }

    #[test]
    fn test_inspect_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");

        let report = inspect_storage(&path).unwrap();
        assert!(!report.exists);
        assert_eq!(report.schema, SchemaStatus::NotInitialized);
        assert!(report.tables.iter().all(|t| t.rows.is_none()));
        assert!(!path.exists());
    }

    #[test]
    fn test_report_serializes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store_results.db");
        initialize_storage(&StorageTarget::file(&path)).unwrap();

        let report = inspect_storage(&path).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["schema"]["state"], "current");
        assert_eq!(json["tables"][0]["name"], "classification");
        assert_eq!(json["tables"][0]["rows"], 0);
    }
}
