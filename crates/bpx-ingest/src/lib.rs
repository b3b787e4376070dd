//! Record loading for the blood-pressure export pipeline.
//!
//! Reads the two source tables (`CO01M.DBF` patient master, `CO18H.DBF`
//! measurement history), filters rows by requested record numbers and date
//! range, and reports unmatched identifiers as warnings rather than errors.

pub mod error;
pub mod history;
pub mod patients;

pub use error::{IngestError, Result};
pub use history::{
    DateFilter, HISTORY_TABLE, ReadingLoad, is_bp_row, load_bp_readings, parse_bp_values,
};
pub use patients::{PATIENT_TABLE, PatientLoad, load_patients};
