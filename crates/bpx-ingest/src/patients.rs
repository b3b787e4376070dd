//! Patient master table loading.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, warn};

use bpx_dbf::{DbfTable, read_dbf};
use bpx_model::{MedicalRecordNumber, Patient, non_empty};

use crate::error::{IngestError, Result};

/// File name of the patient master table.
pub const PATIENT_TABLE: &str = "CO01M.DBF";

/// Result of loading the patient master table.
#[derive(Debug)]
pub struct PatientLoad {
    /// Matched patients keyed by record number.
    pub patients: BTreeMap<MedicalRecordNumber, Patient>,
    /// Requested identifiers with no master row.
    pub missing: Vec<MedicalRecordNumber>,
    /// Master rows skipped because of a malformed record number.
    pub skipped: usize,
}

/// Load patients matching the requested record numbers.
///
/// Identifiers with no master row are reported in [`PatientLoad::missing`],
/// never as an error.
pub fn load_patients(
    data_dir: &Path,
    requested: &BTreeSet<MedicalRecordNumber>,
) -> Result<PatientLoad> {
    let path = data_dir.join(PATIENT_TABLE);
    let table = read_dbf(&path)?;
    debug!(
        path = %path.display(),
        records = table.num_records(),
        "patient master table loaded"
    );

    let mrn_idx = require_field(&table, PATIENT_TABLE, "KCSTMR")?;
    let name_idx = require_field(&table, PATIENT_TABLE, "MNAME")?;
    let sex_idx = require_field(&table, PATIENT_TABLE, "MSEX")?;
    let birth_idx = require_field(&table, PATIENT_TABLE, "MBIRTHDT")?;
    let person_idx = require_field(&table, PATIENT_TABLE, "MPERSONID")?;

    let mut patients = BTreeMap::new();
    let mut skipped = 0usize;
    for record in &table.records {
        let raw = record.values[mrn_idx].to_string();
        let mrn = match MedicalRecordNumber::parse(&raw) {
            Ok(mrn) => mrn,
            Err(error) => {
                warn!(%error, "skipping master row with malformed record number");
                skipped += 1;
                continue;
            }
        };
        if !requested.contains(&mrn) {
            continue;
        }
        patients.insert(
            mrn.clone(),
            Patient {
                mrn,
                name: non_empty(record.values[name_idx].to_string()),
                sex: non_empty(record.values[sex_idx].to_string()),
                birth_date: non_empty(record.values[birth_idx].to_string()),
                person_id: non_empty(record.values[person_idx].to_string()),
            },
        );
    }

    let missing: Vec<MedicalRecordNumber> = requested
        .iter()
        .filter(|mrn| !patients.contains_key(*mrn))
        .cloned()
        .collect();
    for mrn in &missing {
        warn!(mrn = %mrn, "no master row for requested patient");
    }

    Ok(PatientLoad {
        patients,
        missing,
        skipped,
    })
}

/// Resolve a required field index or fail with the table name.
pub(crate) fn require_field(table: &DbfTable, table_name: &str, field: &str) -> Result<usize> {
    table
        .field_index(field)
        .ok_or_else(|| IngestError::MissingField {
            table: table_name.to_string(),
            field: field.to_string(),
        })
}
