//! Database module
//!
//! This module provides all database functionality for store-results, organized into:
//!
//! - **core**: SQLite connection wrapper, storage targets, schema definitions
//! - **results**: the results database handle, initialization and inspection
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # DatabaseConn and StorageTarget
//! │   └── schema      # classification / regression table definitions
//! │
//! └── results         # initialize_storage, inspect_storage, ResultsDatabase
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use store_results::database::{initialize_storage, StorageTarget};
//!
//! // Bootstrap ./store_results.db
//! initialize_storage(&StorageTarget::default())?;
//!
//! // Or an isolated file
//! initialize_storage(&StorageTarget::file("/tmp/predictions.db"))?;
//! ```

pub mod core;
mod results;

pub use core::{
    ColumnInfo, ColumnSpec, DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus,
    StorageTarget, TableDefinition, DEFAULT_DB_FILE,
};

pub use results::{
    initialize_storage, inspect_storage, ResultsDatabase, StorageReport, TableReport,
};
