//! Database schema management
//!
//! This module holds the table definitions for the results database and the
//! manager that creates and verifies them.

use crate::database::core::connection::{ColumnInfo, DatabaseConn};
use crate::error::{Result, StoreError};
use serde::Serialize;
use tracing::info;

/// Expected shape of a single column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub decl_type: &'static str,
    pub primary_key: bool,
}

impl ColumnSpec {
    const fn new(name: &'static str, decl_type: &'static str) -> Self {
        Self {
            name,
            decl_type,
            primary_key: false,
        }
    }

    const fn primary(name: &'static str, decl_type: &'static str) -> Self {
        Self {
            name,
            decl_type,
            primary_key: true,
        }
    }

    fn matches(&self, column: &ColumnInfo) -> bool {
        self.name == column.name
            && self.decl_type.eq_ignore_ascii_case(&column.decl_type)
            && self.primary_key == column.primary_key
    }
}

/// A table managed by the schema initializer
#[derive(Debug, Clone, Copy)]
pub struct TableDefinition {
    pub name: &'static str,
    pub create_sql: &'static str,
    pub columns: &'static [ColumnSpec],
}

/// Schema definitions for all tables in the results database
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// Classification predictions, one row per predicted label
    pub const CLASSIFICATION_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS classification (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            model_name TEXT,
            features TEXT,
            predicted_label TEXT,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#;

    /// Regression predictions, one row per predicted value
    pub const REGRESSION_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS regression (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            model_name TEXT,
            features TEXT,
            predicted_value REAL,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#;

    pub const CLASSIFICATION_COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::primary("id", "INTEGER"),
        ColumnSpec::new("model_name", "TEXT"),
        ColumnSpec::new("features", "TEXT"),
        ColumnSpec::new("predicted_label", "TEXT"),
        ColumnSpec::new("timestamp", "DATETIME"),
    ];

    pub const REGRESSION_COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::primary("id", "INTEGER"),
        ColumnSpec::new("model_name", "TEXT"),
        ColumnSpec::new("features", "TEXT"),
        ColumnSpec::new("predicted_value", "REAL"),
        ColumnSpec::new("timestamp", "DATETIME"),
    ];

    /// Tables in creation order
    pub const TABLES: &'static [TableDefinition] = &[
        TableDefinition {
            name: "classification",
            create_sql: Self::CLASSIFICATION_TABLE,
            columns: Self::CLASSIFICATION_COLUMNS,
        },
        TableDefinition {
            name: "regression",
            create_sql: Self::REGRESSION_TABLE,
            columns: Self::REGRESSION_COLUMNS,
        },
    ];
}

/// Schema manager for the results database
///
/// Creates the prediction tables and reports on their state. It never drops
/// or rewrites an existing table.
pub struct SchemaManager<'a> {
    db: &'a DatabaseConn,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(db: &'a DatabaseConn) -> Self {
        Self { db }
    }

    /// Initialize the database schema
    ///
    /// Creates every table that does not exist yet, inside one transaction.
    /// Nothing is committed unless all statements succeed.
    pub fn initialize(&self) -> Result<()> {
        let tx = self.db.transaction()?;

        for table in SchemaDefinitions::TABLES {
            tx.execute(table.create_sql, [])
                .map_err(|e| StoreError::statement(format!("create table {}", table.name), e))?;
        }

        tx.commit()
            .map_err(|e| StoreError::statement("commit", e))?;

        info!(
            "ensured tables: {}",
            SchemaDefinitions::TABLES
                .iter()
                .map(|t| t.name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(())
    }

    /// Check the current schema status
    pub fn check_status(&self) -> Result<SchemaStatus> {
        let mut missing = Vec::new();

        for table in SchemaDefinitions::TABLES {
            if !self.db.table_exists(table.name)? {
                missing.push(table.name.to_string());
                continue;
            }
            if !self.verify_columns(table)? {
                return Ok(SchemaStatus::Mismatched {
                    table: table.name.to_string(),
                });
            }
        }

        if missing.is_empty() {
            Ok(SchemaStatus::Current)
        } else if missing.len() == SchemaDefinitions::TABLES.len() {
            Ok(SchemaStatus::NotInitialized)
        } else {
            Ok(SchemaStatus::Incomplete { missing })
        }
    }

    /// Compare a table's live columns against its definition
    fn verify_columns(&self, table: &TableDefinition) -> Result<bool> {
        let columns = self.db.table_columns(table.name)?;
        Ok(columns.len() == table.columns.len()
            && table
                .columns
                .iter()
                .zip(columns.iter())
                .all(|(spec, column)| spec.matches(column)))
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchemaStatus {
    /// Neither prediction table exists
    NotInitialized,

    /// Both tables exist with the expected columns
    Current,

    /// Some tables are missing
    Incomplete { missing: Vec<String> },

    /// A table exists but its columns differ from the definition
    Mismatched { table: String },
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaStatus::NotInitialized => write!(f, "not initialized"),
            SchemaStatus::Current => write!(f, "current"),
            SchemaStatus::Incomplete { missing } => {
                write!(f, "incomplete (missing: {})", missing.join(", "))
            }
            SchemaStatus::Mismatched { table } => write!(f, "mismatched table: {}", table),
        }
    }
}
