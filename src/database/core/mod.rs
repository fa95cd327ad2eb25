//! Core database infrastructure
//!
//! - `DatabaseConn`: SQLite connection wrapper and `StorageTarget`
//! - `SchemaManager`: schema initialization and verification
//! - `SchemaStatus`: schema state enumeration

mod connection;
mod schema;

pub use connection::{ColumnInfo, DatabaseConn, StorageTarget, DEFAULT_DB_FILE};
pub use schema::{ColumnSpec, SchemaDefinitions, SchemaManager, SchemaStatus, TableDefinition};
