//! SqliteStore failures
//!
//! Opening a LearnTree database can fail on the path (directory creation, permissions) or
//! while creating the `trees`/`nodes`/`flashcards` schema. After that, failures come from
//! single statements or from a node insert or flashcard batch naming a row that is gone.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`SqliteStore`](crate::db::SqliteStore)
///
/// `TreeStore` callers receive these inside `anyhow::Error`; the workflow reports them as
/// `TreeServiceError::Storage` tagged with the stage that was running.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// libsql could not open the database file
    #[error("Failed to open tree database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// A `CREATE TABLE`/`CREATE INDEX` for trees, nodes, or flashcards failed
    #[error("Failed to create tree schema: {0}")]
    InitializationFailed(String),

    /// The database directory could not be created for lack of permission
    #[error("No permission to create tree database at {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to create directory for tree database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// Connection setup outside a specific statement
    #[error("libsql error: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// A pragma, insert, or query failed; `context` names the statement
    #[error("Statement failed: {context}")]
    SqlExecutionError { context: String },

    /// `create_node` named a parent that does not exist, or `create_flashcards` a node
    /// that does not exist
    #[error("Missing {entity} {id}")]
    MissingReference { entity: &'static str, id: i64 },
}

impl DatabaseError {
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    /// `entity` is the row kind as it reads in messages, e.g. `"parent node"`
    pub fn missing(entity: &'static str, id: i64) -> Self {
        Self::MissingReference { entity, id }
    }
}
