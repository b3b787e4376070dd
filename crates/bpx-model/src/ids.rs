//! Identifier newtypes.

use std::fmt;

use crate::error::{ModelError, Result};

/// Width of a normalized medical record number.
pub const RECORD_NUMBER_LEN: usize = 7;

/// A normalized 7-digit medical record number.
///
/// The record number is the join key between the patient master table and
/// the measurement history table. Source files store it with inconsistent
/// width, so parsing trims the input and left-pads with zeros to exactly
/// seven digits: `480319` becomes `0480319`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct MedicalRecordNumber(String);

impl MedicalRecordNumber {
    /// Parse and normalize a raw record number.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidRecordNumber`] for empty or non-digit
    /// input and [`ModelError::RecordNumberTooLong`] when the trimmed value
    /// exceeds seven digits.
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError::InvalidRecordNumber {
                value: trimmed.to_string(),
            });
        }
        if trimmed.len() > RECORD_NUMBER_LEN {
            return Err(ModelError::RecordNumberTooLong {
                value: trimmed.to_string(),
            });
        }
        Ok(Self(format!("{trimmed:0>width$}", width = RECORD_NUMBER_LEN)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MedicalRecordNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
