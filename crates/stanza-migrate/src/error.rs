//! Error types for schema reconciliation.

use std::path::PathBuf;

/// Errors that can occur while planning or applying schema changes.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The connection URL uses a scheme no dialect handles.
    #[error("Unsupported database URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The connection URL carries no database name.
    #[error("Database URL has no database name: {0}")]
    MissingDatabaseName(String),

    /// The target database does not exist.
    #[error("Unknown database '{0}'")]
    UnknownDatabase(String),

    /// A statement hit a uniqueness conflict.
    #[error("Conflict while executing: {statement}")]
    Conflict {
        /// The statement that conflicted.
        statement: String,
    },

    /// A live column carries a data type no dialect kind maps to.
    #[error("Unrecognized data type '{data_type}' on column '{table}.{column}'")]
    UnknownDataType {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// The reported data type.
        data_type: String,
    },

    /// The introspected shape is invalid as a declared table.
    #[error("Introspected schema is invalid: {0}")]
    InvalidSchema(#[from] stanza_core::SchemaError),

    /// Snapshot file not found.
    #[error("Schema snapshot not found: {0}")]
    SnapshotNotFound(PathBuf),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading/writing snapshot files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
