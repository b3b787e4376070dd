//! Error types for record loading.

use thiserror::Error;

/// Errors that can occur while loading source tables.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Underlying DBF structure or I/O failure.
    #[error(transparent)]
    Dbf(#[from] bpx_dbf::DbfError),

    /// Required field missing from a source table.
    #[error("table {table} is missing field {field}")]
    MissingField { table: String, field: String },
}

/// Result type alias for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
