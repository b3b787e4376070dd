//! Measurement history table loading.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};

use bpx_dbf::read_dbf;
use bpx_model::{BpKind, BpReading, MedicalRecordNumber, RocTimestamp, non_empty};

use crate::error::Result;
use crate::patients::require_field;

/// File name of the measurement history table.
pub const HISTORY_TABLE: &str = "CO18H.DBF";

/// Item code the history table uses for combined blood-pressure rows.
const BP_ITEM_CODE: &str = "BP";

/// Description markers identifying blood-pressure rows.
const BP_MARKERS: [&str; 3] = ["收縮壓", "舒張壓", "血壓"];

/// Inclusive ROC-date range filter.
///
/// Dates are fixed-width `YYYMMDD` digits, so lexicographic comparison is
/// chronological.
#[derive(Debug, Clone, Default)]
pub struct DateFilter {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateFilter {
    pub fn contains(&self, date: &str) -> bool {
        if let Some(from) = &self.from {
            if date < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if date > to.as_str() {
                return false;
            }
        }
        true
    }
}

/// Result of loading the history table.
#[derive(Debug)]
pub struct ReadingLoad {
    pub readings: Vec<BpReading>,
    /// Blood-pressure rows skipped as malformed (bad identifier, date, or
    /// value).
    pub skipped: usize,
}

/// Load blood-pressure readings for the requested patients.
///
/// Rows pass a cascade of filters: date range, blood-pressure
/// classification, patient match, then value parsing. Malformed
/// blood-pressure rows are skipped with a warning and counted.
pub fn load_bp_readings(
    data_dir: &Path,
    requested: &BTreeSet<MedicalRecordNumber>,
    filter: &DateFilter,
) -> Result<ReadingLoad> {
    let path = data_dir.join(HISTORY_TABLE);
    let table = read_dbf(&path)?;
    debug!(
        path = %path.display(),
        records = table.num_records(),
        "history table loaded"
    );

    let mrn_idx = require_field(&table, HISTORY_TABLE, "KCSTMR")?;
    let date_idx = require_field(&table, HISTORY_TABLE, "HDATE")?;
    let time_idx = require_field(&table, HISTORY_TABLE, "HTIME")?;
    let item_idx = require_field(&table, HISTORY_TABLE, "HITEM")?;
    let desc_idx = require_field(&table, HISTORY_TABLE, "HDSCP")?;
    let value_idx = require_field(&table, HISTORY_TABLE, "HVAL")?;
    let rule_idx = require_field(&table, HISTORY_TABLE, "HRULE")?;

    let mut readings = Vec::new();
    let mut skipped = 0usize;
    for record in &table.records {
        let date = record.values[date_idx].to_string();
        let date = date.trim();
        if !filter.contains(date) {
            continue;
        }

        let item = record.values[item_idx].to_string();
        let description = record.values[desc_idx].to_string();
        if !is_bp_row(item.trim(), &description) {
            continue;
        }

        let mrn = match MedicalRecordNumber::parse(record.values[mrn_idx].to_string()) {
            Ok(mrn) => mrn,
            Err(error) => {
                warn!(%error, "skipping history row with malformed record number");
                skipped += 1;
                continue;
            }
        };
        if !requested.contains(&mrn) {
            continue;
        }

        let time = record.values[time_idx].to_string();
        let at = match RocTimestamp::new(date, time.trim()) {
            Ok(at) => at,
            Err(error) => {
                warn!(mrn = %mrn, %error, "skipping history row with malformed timestamp");
                skipped += 1;
                continue;
            }
        };

        let value_text = record.values[value_idx].to_string();
        let Some(values) = parse_bp_values(value_text.trim(), &description) else {
            warn!(
                mrn = %mrn,
                value = %value_text.trim(),
                "skipping history row with unparsable value"
            );
            skipped += 1;
            continue;
        };

        let reference = non_empty(record.values[rule_idx].to_string());
        for (kind, value) in values {
            readings.push(BpReading {
                mrn: mrn.clone(),
                at: at.clone(),
                kind,
                value,
                description: description.clone(),
                reference: reference.clone(),
            });
        }
    }

    Ok(ReadingLoad { readings, skipped })
}

/// Classify a history row as a blood-pressure row.
///
/// Matches the combined `BP` item code or any blood-pressure marker in the
/// description.
pub fn is_bp_row(item: &str, description: &str) -> bool {
    if item.eq_ignore_ascii_case(BP_ITEM_CODE) {
        return true;
    }
    BP_MARKERS.iter().any(|marker| description.contains(marker))
        || description.to_uppercase().contains(BP_ITEM_CODE)
}

/// Parse the value field of a blood-pressure row.
///
/// Combined rows spell the value as `systolic/diastolic` (`"120/80"`);
/// split rows carry a single number whose side comes from the description.
/// Returns `None` when the value or the side cannot be determined.
pub fn parse_bp_values(value: &str, description: &str) -> Option<Vec<(BpKind, u16)>> {
    if let Some((systolic, diastolic)) = value.split_once('/') {
        let systolic = parse_mmhg(systolic)?;
        let diastolic = parse_mmhg(diastolic)?;
        return Some(vec![
            (BpKind::Systolic, systolic),
            (BpKind::Diastolic, diastolic),
        ]);
    }
    let kind = if description.contains("收縮壓") {
        BpKind::Systolic
    } else if description.contains("舒張壓") {
        BpKind::Diastolic
    } else {
        return None;
    };
    Some(vec![(kind, parse_mmhg(value)?)])
}

/// Parse one mmHg value, truncating any fraction like the legacy system.
fn parse_mmhg(text: &str) -> Option<u16> {
    let value = text.trim().parse::<f64>().ok()?;
    if !(0.0..=f64::from(u16::MAX)).contains(&value) {
        return None;
    }
    Some(value as u16)
}
