//! Error types for DBF file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading DBF files.
#[derive(Debug, Error)]
pub enum DbfError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid DBF file structure.
    #[error("invalid DBF file: {message}")]
    InvalidFormat { message: String },

    /// Version byte outside the dBase III family.
    #[error("unsupported DBF version byte 0x{version:02X}")]
    UnsupportedVersion { version: u8 },

    /// Field descriptor carries an unknown type code.
    #[error("unsupported field type 0x{code:02X} for field {name}")]
    UnsupportedFieldType { name: String, code: u8 },

    /// Field descriptor area is not terminated by 0x0D.
    #[error("field descriptor terminator missing")]
    MissingFieldTerminator,

    /// File ends before the declared record count is reached.
    #[error("truncated record data: expected {expected} records, found {actual}")]
    TruncatedRecords { expected: u32, actual: u32 },

    /// Numeric field content could not be parsed.
    #[error("failed to parse numeric field {field}: {value:?}")]
    NumericParse { field: String, value: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DBF operations.
pub type Result<T> = std::result::Result<T, DbfError>;

impl DbfError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
