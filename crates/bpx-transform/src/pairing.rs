//! Systolic/diastolic pairing.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use tracing::{debug, warn};

use bpx_model::{
    BpKind, BpReading, MedicalRecordNumber, PairedMeasurement, PairingPolicy, RocTimestamp,
    UnmatchedPolicy,
};

/// Plausible systolic range in mmHg.
pub const SYSTOLIC_RANGE: RangeInclusive<u16> = 50..=250;
/// Plausible diastolic range in mmHg.
pub const DIASTOLIC_RANGE: RangeInclusive<u16> = 30..=150;

/// How many following readings a systolic reading may look ahead when
/// searching for its diastolic partner on the same day.
const PAIRING_LOOKAHEAD: usize = 2;

/// Check a reading value against the plausible range for its side.
pub fn in_plausible_range(kind: BpKind, value: u16) -> bool {
    match kind {
        BpKind::Systolic => SYSTOLIC_RANGE.contains(&value),
        BpKind::Diastolic => DIASTOLIC_RANGE.contains(&value),
    }
}

/// Result of pairing one batch of readings.
#[derive(Debug, Default)]
pub struct PairingOutcome {
    /// Paired (or kept-partial) measurements, ordered by patient then time.
    pub measurements: Vec<PairedMeasurement>,
    /// Readings dropped for having no partner, under the drop policy.
    pub dropped_singletons: usize,
    /// Later duplicates of an already-seen (timestamp, side) reading.
    pub dropped_duplicates: usize,
    /// Readings rejected by the plausibility ranges.
    pub out_of_range: usize,
}

/// Pair readings into reportable measurements.
///
/// Readings are grouped per patient, sorted by timestamp (systolic before
/// diastolic at the same instant), deduplicated, then paired: each systolic
/// reading takes the first diastolic reading on the same day within a
/// bounded lookahead window. Unmatched readings follow the policy. The
/// whole transformation is deterministic and order-preserving.
pub fn pair_readings(readings: Vec<BpReading>, policy: &PairingPolicy) -> PairingOutcome {
    let mut outcome = PairingOutcome::default();

    let mut by_patient: BTreeMap<MedicalRecordNumber, Vec<BpReading>> = BTreeMap::new();
    for reading in readings {
        if !in_plausible_range(reading.kind, reading.value) {
            warn!(
                mrn = %reading.mrn,
                kind = ?reading.kind,
                value = reading.value,
                "rejecting reading outside plausible range"
            );
            outcome.out_of_range += 1;
            continue;
        }
        by_patient.entry(reading.mrn.clone()).or_default().push(reading);
    }

    for (mrn, mut group) in by_patient {
        group.sort_by(|a, b| (&a.at, a.kind).cmp(&(&b.at, b.kind)));
        dedupe_readings(&mut group, &mut outcome);
        let mut measurements = pair_patient_group(&mrn, &group, policy, &mut outcome);
        if policy.latest_only {
            keep_latest(&mut measurements);
        }
        outcome.measurements.append(&mut measurements);
    }

    debug!(
        measurements = outcome.measurements.len(),
        dropped_singletons = outcome.dropped_singletons,
        dropped_duplicates = outcome.dropped_duplicates,
        out_of_range = outcome.out_of_range,
        "pairing complete"
    );
    outcome
}

/// Drop later readings that repeat an already-seen (timestamp, side) key.
fn dedupe_readings(group: &mut Vec<BpReading>, outcome: &mut PairingOutcome) {
    let mut seen: BTreeSet<(RocTimestamp, BpKind)> = BTreeSet::new();
    group.retain(|reading| {
        if seen.insert((reading.at.clone(), reading.kind)) {
            true
        } else {
            warn!(
                mrn = %reading.mrn,
                at = %reading.at,
                kind = ?reading.kind,
                "dropping duplicate reading"
            );
            outcome.dropped_duplicates += 1;
            false
        }
    });
}

fn pair_patient_group(
    mrn: &MedicalRecordNumber,
    group: &[BpReading],
    policy: &PairingPolicy,
    outcome: &mut PairingOutcome,
) -> Vec<PairedMeasurement> {
    let mut consumed = vec![false; group.len()];
    let mut measurements = Vec::new();

    for i in 0..group.len() {
        if consumed[i] || group[i].kind != BpKind::Systolic {
            continue;
        }
        let window_end = (i + 1 + PAIRING_LOOKAHEAD).min(group.len());
        let partner = (i + 1..window_end).find(|&j| {
            !consumed[j]
                && group[j].kind == BpKind::Diastolic
                && group[j].at.date() == group[i].at.date()
        });
        if let Some(j) = partner {
            consumed[i] = true;
            consumed[j] = true;
            measurements.push(PairedMeasurement::full(
                mrn.clone(),
                group[i].at.clone(),
                group[i].value,
                group[j].value,
            ));
        }
    }

    // Everything left over has no partner.
    for (i, reading) in group.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        match policy.unmatched {
            UnmatchedPolicy::Drop => {
                warn!(
                    mrn = %reading.mrn,
                    at = %reading.at,
                    kind = ?reading.kind,
                    "dropping unmatched reading"
                );
                outcome.dropped_singletons += 1;
            }
            UnmatchedPolicy::KeepPartial => {
                measurements.push(PairedMeasurement::partial(
                    mrn.clone(),
                    reading.at.clone(),
                    reading.kind,
                    reading.value,
                ));
            }
        }
    }

    measurements.sort_by(|a, b| a.at.cmp(&b.at));
    measurements
}

/// Retain only the chronologically newest measurement.
fn keep_latest(measurements: &mut Vec<PairedMeasurement>) {
    if let Some(latest) = measurements.iter().map(|m| m.at.clone()).max() {
        measurements.retain(|m| m.at == latest);
        measurements.truncate(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mrn(value: &str) -> MedicalRecordNumber {
        MedicalRecordNumber::parse(value).expect("mrn")
    }

    fn reading(id: &str, date: &str, time: &str, kind: BpKind, value: u16) -> BpReading {
        BpReading {
            mrn: mrn(id),
            at: RocTimestamp::new(date, time).expect("ts"),
            kind,
            value,
            description: kind.label().to_string(),
            reference: None,
        }
    }

    #[test]
    fn pairs_same_timestamp_readings() {
        let readings = vec![
            reading("480319", "1130105", "093000", BpKind::Systolic, 120),
            reading("480319", "1130105", "093000", BpKind::Diastolic, 80),
        ];
        let outcome = pair_readings(readings, &PairingPolicy::default());
        assert_eq!(outcome.measurements.len(), 1);
        let pair = &outcome.measurements[0];
        assert_eq!(pair.systolic, Some(120));
        assert_eq!(pair.diastolic, Some(80));
        assert_eq!(pair.at.datetime_digits(), "1130105093000");
    }

    #[test]
    fn input_order_does_not_matter_for_same_instant() {
        let readings = vec![
            reading("480319", "1130105", "093000", BpKind::Diastolic, 80),
            reading("480319", "1130105", "093000", BpKind::Systolic, 120),
        ];
        let outcome = pair_readings(readings, &PairingPolicy::default());
        assert_eq!(outcome.measurements.len(), 1);
        assert!(outcome.measurements[0].is_complete());
    }

    #[test]
    fn drops_singletons_by_default() {
        let readings = vec![reading("480319", "1130105", "093000", BpKind::Systolic, 120)];
        let outcome = pair_readings(readings, &PairingPolicy::default());
        assert!(outcome.measurements.is_empty());
        assert_eq!(outcome.dropped_singletons, 1);
    }

    #[test]
    fn keeps_partials_when_configured() {
        let policy = PairingPolicy::default().with_unmatched(UnmatchedPolicy::KeepPartial);
        let readings = vec![reading("480319", "1130105", "093000", BpKind::Diastolic, 80)];
        let outcome = pair_readings(readings, &policy);
        assert_eq!(outcome.measurements.len(), 1);
        assert_eq!(outcome.measurements[0].systolic, None);
        assert_eq!(outcome.measurements[0].diastolic, Some(80));
        assert_eq!(outcome.dropped_singletons, 0);
    }

    #[test]
    fn does_not_pair_across_days() {
        let readings = vec![
            reading("480319", "1130105", "235900", BpKind::Systolic, 120),
            reading("480319", "1130106", "000100", BpKind::Diastolic, 80),
        ];
        let outcome = pair_readings(readings, &PairingPolicy::default());
        assert!(outcome.measurements.is_empty());
        assert_eq!(outcome.dropped_singletons, 2);
    }

    #[test]
    fn duplicate_at_one_instant_first_wins() {
        let readings = vec![
            reading("480319", "1130105", "093000", BpKind::Systolic, 120),
            reading("480319", "1130105", "093000", BpKind::Systolic, 150),
            reading("480319", "1130105", "093000", BpKind::Diastolic, 80),
        ];
        let outcome = pair_readings(readings, &PairingPolicy::default());
        assert_eq!(outcome.measurements.len(), 1);
        assert_eq!(outcome.measurements[0].systolic, Some(120));
        assert_eq!(outcome.dropped_duplicates, 1);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let readings = vec![
            reading("480319", "1130105", "093000", BpKind::Systolic, 320),
            reading("480319", "1130105", "093000", BpKind::Diastolic, 80),
        ];
        let outcome = pair_readings(readings, &PairingPolicy::default());
        assert_eq!(outcome.out_of_range, 1);
        assert!(outcome.measurements.is_empty());
        assert_eq!(outcome.dropped_singletons, 1);
    }

    #[test]
    fn latest_only_keeps_newest_measurement() {
        let policy = PairingPolicy::default().with_latest_only(true);
        let readings = vec![
            reading("480319", "1130105", "093000", BpKind::Systolic, 120),
            reading("480319", "1130105", "093000", BpKind::Diastolic, 80),
            reading("480319", "1130201", "140000", BpKind::Systolic, 130),
            reading("480319", "1130201", "140000", BpKind::Diastolic, 85),
        ];
        let outcome = pair_readings(readings, &policy);
        assert_eq!(outcome.measurements.len(), 1);
        assert_eq!(outcome.measurements[0].at.date(), "1130201");
        assert_eq!(outcome.measurements[0].systolic, Some(130));
    }

    #[test]
    fn groups_are_ordered_by_patient_then_time() {
        let readings = vec![
            reading("860718", "1130105", "080000", BpKind::Systolic, 110),
            reading("860718", "1130105", "080000", BpKind::Diastolic, 70),
            reading("480319", "1130106", "093000", BpKind::Systolic, 120),
            reading("480319", "1130106", "093000", BpKind::Diastolic, 80),
            reading("480319", "1130104", "093000", BpKind::Systolic, 125),
            reading("480319", "1130104", "093000", BpKind::Diastolic, 82),
        ];
        let outcome = pair_readings(readings, &PairingPolicy::default());
        let keys: Vec<(String, String)> = outcome
            .measurements
            .iter()
            .map(|m| (m.mrn.to_string(), m.at.date().to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("0480319".to_string(), "1130104".to_string()),
                ("0480319".to_string(), "1130106".to_string()),
                ("0860718".to_string(), "1130105".to_string()),
            ]
        );
    }
}
