//! Measurement types.

use std::fmt;

use crate::error::{ModelError, Result};
use crate::ids::MedicalRecordNumber;

/// A measurement instant in the source tables.
///
/// Dates use the ROC (Minguo) calendar as fixed-width `YYYMMDD` digits and
/// times are `HHMMSS`. Because both fields are fixed width, lexicographic
/// order equals chronological order, which the pairer relies on.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct RocTimestamp {
    date: String,
    time: String,
}

impl RocTimestamp {
    /// Build a timestamp from raw table fields.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidTimestamp`] when the date is shorter
    /// than 7 digits or either field contains non-digit characters.
    pub fn new(date: impl AsRef<str>, time: impl AsRef<str>) -> Result<Self> {
        let date = date.as_ref().trim().to_string();
        let time = time.as_ref().trim().to_string();
        let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if date.len() < 7 || !digits(&date) || !digits(&time) {
            return Err(ModelError::InvalidTimestamp { date, time });
        }
        Ok(Self { date, time })
    }

    /// Measurement date, ROC `YYYMMDD`.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Measurement time, `HHMMSS`.
    pub fn time(&self) -> &str {
        &self.time
    }

    /// ROC year-month (`YYYMM`), used for the fee period field.
    pub fn year_month(&self) -> &str {
        &self.date[..5]
    }

    /// Full digit string `YYYMMDDHHMMSS`.
    pub fn datetime_digits(&self) -> String {
        format!("{}{}", self.date, self.time)
    }

    /// Minute-resolution digit string `YYYMMDDHHMM`.
    pub fn minute_digits(&self) -> String {
        let minute = if self.time.len() >= 4 {
            &self.time[..4]
        } else {
            self.time.as_str()
        };
        format!("{}{minute}", self.date)
    }
}

impl fmt::Display for RocTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

/// Which side of a blood-pressure measurement a reading carries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum BpKind {
    Systolic,
    Diastolic,
}

impl BpKind {
    /// Reporting name mandated by the schema (收縮壓 / 舒張壓).
    pub fn label(self) -> &'static str {
        match self {
            Self::Systolic => "收縮壓",
            Self::Diastolic => "舒張壓",
        }
    }
}

/// A single blood-pressure reading taken from the history table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BpReading {
    pub mrn: MedicalRecordNumber,
    pub at: RocTimestamp,
    pub kind: BpKind,
    /// Value in mmHg.
    pub value: u16,
    /// Item description from the source row.
    pub description: String,
    /// Reference-range text from the source row, when present.
    pub reference: Option<String>,
}

/// A systolic/diastolic pair recorded at one instant.
///
/// Either side may be absent when the keep-partial policy is active, but
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PairedMeasurement {
    pub mrn: MedicalRecordNumber,
    pub at: RocTimestamp,
    pub systolic: Option<u16>,
    pub diastolic: Option<u16>,
}

impl PairedMeasurement {
    /// Build a complete pair.
    pub fn full(mrn: MedicalRecordNumber, at: RocTimestamp, systolic: u16, diastolic: u16) -> Self {
        Self {
            mrn,
            at,
            systolic: Some(systolic),
            diastolic: Some(diastolic),
        }
    }

    /// Build a one-sided measurement.
    pub fn partial(mrn: MedicalRecordNumber, at: RocTimestamp, kind: BpKind, value: u16) -> Self {
        let (systolic, diastolic) = match kind {
            BpKind::Systolic => (Some(value), None),
            BpKind::Diastolic => (None, Some(value)),
        };
        Self {
            mrn,
            at,
            systolic,
            diastolic,
        }
    }

    /// Validate the at-least-one-reading invariant.
    pub fn validate(&self) -> Result<()> {
        if self.systolic.is_none() && self.diastolic.is_none() {
            return Err(ModelError::EmptyMeasurement);
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.systolic.is_some() && self.diastolic.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_orders_chronologically() {
        let earlier = RocTimestamp::new("1130105", "093000").expect("ts");
        let later = RocTimestamp::new("1130105", "101500").expect("ts");
        assert!(earlier < later);
        assert_eq!(earlier.year_month(), "11301");
        assert_eq!(later.minute_digits(), "11301051015");
    }

    #[test]
    fn timestamp_rejects_short_dates() {
        assert!(RocTimestamp::new("11301", "093000").is_err());
        assert!(RocTimestamp::new("113O105", "093000").is_err());
    }

    #[test]
    fn partial_measurement_sides() {
        let mrn = MedicalRecordNumber::parse("480319").expect("mrn");
        let at = RocTimestamp::new("1130105", "093000").expect("ts");
        let partial = PairedMeasurement::partial(mrn, at, BpKind::Diastolic, 80);
        assert_eq!(partial.systolic, None);
        assert_eq!(partial.diastolic, Some(80));
        assert!(!partial.is_complete());
        partial.validate().expect("one side present");
    }
}
