//! NHI reporting-schema codes.
//!
//! Fixed values mandated by the health-insurance upload format for
//! physiological blood-pressure measurements.

/// Report category (`h1`).
pub const REPORT_TYPE: &str = "1";
/// Medical category (`h3`): western medicine outpatient.
pub const MEDICAL_CATEGORY: &str = "11";
/// Case classification (`h6`): outpatient.
pub const CASE_TYPE: &str = "01";
/// Treatment item code for blood pressure (`h7`).
pub const BP_ITEM_CODE: &str = "0023";
/// Visit sequence (`h8`).
pub const VISIT_SEQUENCE: &str = "1";
/// Principal diagnosis code (`h15`): hypertension.
pub const DIAGNOSIS_CODE: &str = "Y00006";
/// Referral flag (`h26`).
pub const TRANSFER_FLAG: &str = "0";

/// Measurement method (`r3`).
pub const TEST_METHOD: &str = "生理量測血壓(OBPM)";
/// Unit for both readings (`r5`).
pub const BP_UNIT: &str = "mmHg";
/// Reference range for the systolic reading (`r6-1`).
pub const SYSTOLIC_REFERENCE: &str = "90-130";
/// Reference range for the diastolic reading (`r6-1`).
pub const DIASTOLIC_REFERENCE: &str = "60-80";
/// Report-item sequence numbers (`r1`).
pub const SYSTOLIC_SEQUENCE: &str = "1";
pub const DIASTOLIC_SEQUENCE: &str = "2";

/// Defaults used when the caller does not override them.
pub const DEFAULT_HOSPITAL_CODE: &str = "3522013684";
pub const DEFAULT_PHYSICIAN_ID: &str = "N125074991";
