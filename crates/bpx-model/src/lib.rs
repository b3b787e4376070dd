//! Data model for the blood-pressure export pipeline.

pub mod error;
pub mod ids;
pub mod options;
pub mod patient;
pub mod reading;

pub use error::{ModelError, Result};
pub use ids::{MedicalRecordNumber, RECORD_NUMBER_LEN};
pub use options::{PairingPolicy, UnmatchedPolicy};
pub use patient::{Patient, non_empty};
pub use reading::{BpKind, BpReading, PairedMeasurement, RocTimestamp};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_serializes() {
        let reading = BpReading {
            mrn: MedicalRecordNumber::parse("480319").expect("mrn"),
            at: RocTimestamp::new("1130105", "093000").expect("ts"),
            kind: BpKind::Systolic,
            value: 120,
            description: "收縮壓".to_string(),
            reference: Some("90-130".to_string()),
        };
        let json = serde_json::to_string(&reading).expect("serialize reading");
        let round: BpReading = serde_json::from_str(&json).expect("deserialize reading");
        assert_eq!(round, reading);
    }
}
