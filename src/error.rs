//! Error types for storage initialization

use thiserror::Error;

/// Errors raised while bootstrapping or inspecting the results database
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be created, opened, or is not a SQLite database
    #[error("storage unavailable at '{path}': {source}")]
    StorageUnavailable {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A schema statement (or its commit) failed after the connection was opened
    #[error("schema statement failed ({context}): {source}")]
    SchemaStatementFailure {
        context: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<String>, source: rusqlite::Error) -> Self {
        StoreError::StorageUnavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn statement(context: impl Into<String>, source: rusqlite::Error) -> Self {
        StoreError::SchemaStatementFailure {
            context: context.into(),
            source,
        }
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable { .. })
    }

    pub fn is_schema_failure(&self) -> bool {
        matches!(self, StoreError::SchemaStatementFailure { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
