//! Error types for the data model.

use thiserror::Error;

/// Errors that can occur when constructing model values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Medical record number is empty or contains non-digit characters.
    #[error("invalid medical record number: {value:?}")]
    InvalidRecordNumber { value: String },

    /// Medical record number exceeds the 7-digit limit.
    #[error("medical record number '{value}' exceeds 7 digits")]
    RecordNumberTooLong { value: String },

    /// Measurement timestamp fields are malformed.
    #[error("invalid measurement timestamp: date {date:?} time {time:?}")]
    InvalidTimestamp { date: String, time: String },

    /// Paired measurement with neither a systolic nor a diastolic value.
    #[error("paired measurement must carry at least one reading")]
    EmptyMeasurement,
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
