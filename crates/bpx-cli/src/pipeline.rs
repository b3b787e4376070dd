//! Export pipeline orchestration.
//!
//! Wires the stages together: collect requested identifiers, load the two
//! source tables, pair readings, write the Big5 XML document.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use bpx_ingest::{DateFilter, load_bp_readings, load_patients};
use bpx_model::{MedicalRecordNumber, PairingPolicy};
use bpx_report::{ExportOptions, write_export};
use bpx_transform::pair_readings;

use crate::logging::redact_value;

/// Everything one export run needs.
#[derive(Debug)]
pub struct ExportRequest {
    /// Directory holding `CO01M.DBF` and `CO18H.DBF`.
    pub data_dir: PathBuf,
    /// Destination for the XML document.
    pub output: PathBuf,
    /// Record numbers given directly on the command line.
    pub patients: Vec<String>,
    /// Optional file with one record number per line.
    pub patient_file: Option<PathBuf>,
    pub date_filter: DateFilter,
    pub policy: PairingPolicy,
    pub options: ExportOptions,
    /// Run every stage but skip writing the output file.
    pub dry_run: bool,
}

/// Per-patient line of the run summary.
#[derive(Debug)]
pub struct PatientSummary {
    pub mrn: MedicalRecordNumber,
    pub name: Option<String>,
    /// Readings loaded from the history table, before pairing.
    pub readings: usize,
    /// Measurements exported for this patient.
    pub measurements: usize,
    /// Whether the master table had a row for this identifier.
    pub matched: bool,
}

/// Outcome of one export run.
#[derive(Debug)]
pub struct ExportResult {
    pub requested: usize,
    pub found: usize,
    pub missing: Vec<MedicalRecordNumber>,
    pub readings: usize,
    /// Malformed source rows skipped during loading.
    pub rows_skipped: usize,
    pub measurements: usize,
    pub dropped_singletons: usize,
    pub dropped_duplicates: usize,
    pub out_of_range: usize,
    pub patients: Vec<PatientSummary>,
    /// Written output path, `None` on a dry run.
    pub output: Option<PathBuf>,
}

/// Collect requested record numbers from flags and an optional list file.
///
/// List files carry one identifier per line; blank lines and `#` comments
/// are ignored. Identifiers are normalized and de-duplicated. Any
/// identifier that fails to normalize is an error.
pub fn collect_patient_ids(
    patients: &[String],
    patient_file: Option<&Path>,
) -> Result<BTreeSet<MedicalRecordNumber>> {
    let mut requested = BTreeSet::new();
    for raw in patients {
        let mrn = MedicalRecordNumber::parse(raw)
            .with_context(|| format!("invalid record number {raw:?}"))?;
        requested.insert(mrn);
    }
    if let Some(path) = patient_file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read patient list {}", path.display()))?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mrn = MedicalRecordNumber::parse(line).with_context(|| {
                format!("invalid record number {line:?} in {}", path.display())
            })?;
            requested.insert(mrn);
        }
    }
    if requested.is_empty() {
        bail!("no patients requested; use --patients or --patient-file");
    }
    Ok(requested)
}

/// Run the export pipeline end to end.
pub fn run_export(request: &ExportRequest) -> Result<ExportResult> {
    let span = info_span!("export", data_dir = %request.data_dir.display());
    let _guard = span.enter();

    let requested = collect_patient_ids(&request.patients, request.patient_file.as_deref())?;
    let requested_count = requested.len();

    let patient_load = load_patients(&request.data_dir, &requested)
        .context("load patient master table")?;
    let matched: BTreeSet<MedicalRecordNumber> = patient_load.patients.keys().cloned().collect();
    info!(
        requested = requested_count,
        found = matched.len(),
        missing = patient_load.missing.len(),
        "patient master loaded"
    );

    let reading_load = load_bp_readings(&request.data_dir, &matched, &request.date_filter)
        .context("load measurement history")?;
    let reading_count = reading_load.readings.len();
    let rows_skipped = patient_load.skipped + reading_load.skipped;

    let mut readings_per: BTreeMap<MedicalRecordNumber, usize> = BTreeMap::new();
    for reading in &reading_load.readings {
        *readings_per.entry(reading.mrn.clone()).or_insert(0) += 1;
    }

    let outcome = pair_readings(reading_load.readings, &request.policy);
    let mut measurements_per: BTreeMap<MedicalRecordNumber, usize> = BTreeMap::new();
    for measurement in &outcome.measurements {
        *measurements_per.entry(measurement.mrn.clone()).or_insert(0) += 1;
    }

    let mut patients = Vec::new();
    for (mrn, patient) in &patient_load.patients {
        let measurements = measurements_per.get(mrn).copied().unwrap_or(0);
        if measurements == 0 {
            warn!(
                mrn = %redact_value(mrn.as_str()),
                "no exportable measurements for patient"
            );
        }
        patients.push(PatientSummary {
            mrn: mrn.clone(),
            name: patient.name.clone(),
            readings: readings_per.get(mrn).copied().unwrap_or(0),
            measurements,
            matched: true,
        });
    }
    for mrn in &patient_load.missing {
        patients.push(PatientSummary {
            mrn: mrn.clone(),
            name: None,
            readings: 0,
            measurements: 0,
            matched: false,
        });
    }

    let output = if request.dry_run {
        info!("dry run, skipping output");
        None
    } else {
        write_export(
            &request.output,
            &patient_load.patients,
            &outcome.measurements,
            &request.options,
        )
        .context("write export document")?;
        info!(
            path = %request.output.display(),
            measurements = outcome.measurements.len(),
            "export written"
        );
        Some(request.output.clone())
    };

    Ok(ExportResult {
        requested: requested_count,
        found: matched.len(),
        missing: patient_load.missing,
        readings: reading_count,
        rows_skipped,
        measurements: outcome.measurements.len(),
        dropped_singletons: outcome.dropped_singletons,
        dropped_duplicates: outcome.dropped_duplicates,
        out_of_range: outcome.out_of_range,
        patients,
        output,
    })
}
