//! Patient master record.

use crate::ids::MedicalRecordNumber;

/// Demographics loaded from the patient master table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Patient {
    pub mrn: MedicalRecordNumber,
    /// Patient name; absent when the master row left it blank.
    pub name: Option<String>,
    pub sex: Option<String>,
    /// Birth date in ROC `YYYMMDD` digits.
    pub birth_date: Option<String>,
    /// National person identifier; optional in the export schema.
    pub person_id: Option<String>,
}

impl Patient {
    /// Build a patient with only the record number set.
    pub fn new(mrn: MedicalRecordNumber) -> Self {
        Self {
            mrn,
            name: None,
            sex: None,
            birth_date: None,
            person_id: None,
        }
    }
}

/// Turn a trimmed table field into an optional value, treating blanks as
/// absent.
pub fn non_empty(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_become_none() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty(" 王小明 "), Some("王小明".to_string()));
    }
}
