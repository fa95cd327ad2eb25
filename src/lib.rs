#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! store-results - local storage bootstrap for prediction records
//!
//! Creates the SQLite database that classification and regression models
//! write their predictions into. The crate only guarantees the schema:
//! producers insert rows on their own.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `cli` (default) | `store-results` binary | `clap`, `tabled`, `tracing-subscriber` |
//!
//! The library itself always builds with just `rusqlite` and friends:
//!
//! ```toml
//! store-results = { version = "0.1", default-features = false }
//! ```
//!
//! # Tables
//!
//! - `classification(id, model_name, features, predicted_label, timestamp)`
//! - `regression(id, model_name, features, predicted_value, timestamp)`
//!
//! `id` is assigned by SQLite (`AUTOINCREMENT`) and `timestamp` defaults to
//! `CURRENT_TIMESTAMP` at insertion time.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use store_results::{initialize_storage, StorageTarget};
//!
//! // Safe to call repeatedly: existing tables and rows are left alone
//! initialize_storage(&StorageTarget::default())?;
//! ```

pub mod config;
pub mod database;
pub mod error;

pub use config::{format_size, StoreConfig};

pub use database::{
    initialize_storage, inspect_storage, DatabaseConn, ResultsDatabase, SchemaDefinitions,
    SchemaManager, SchemaStatus, StorageReport, StorageTarget, TableReport, DEFAULT_DB_FILE,
};

pub use error::{Result, StoreError};
