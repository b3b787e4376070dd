//! Export-XML output generation.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, Timelike};
use encoding_rs::BIG5;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use bpx_model::{MedicalRecordNumber, PairedMeasurement, Patient, RocTimestamp};

use crate::nhi;

/// Options for export-XML output.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Medical institution code (`h2`, `r9`).
    pub hospital_code: String,
    /// Physician national id (`h17`).
    pub physician_id: String,
    /// Principal diagnosis code (`h15`).
    pub diagnosis_code: String,
    /// Seconds value shared by every `r10` tag. When unset, the current
    /// wall-clock second is captured once per render, which keeps repeated
    /// uploads of the same measurement distinguishable.
    pub unified_seconds: Option<u8>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            hospital_code: nhi::DEFAULT_HOSPITAL_CODE.to_string(),
            physician_id: nhi::DEFAULT_PHYSICIAN_ID.to_string(),
            diagnosis_code: nhi::DIAGNOSIS_CODE.to_string(),
            unified_seconds: None,
        }
    }
}

impl ExportOptions {
    #[must_use]
    pub fn with_hospital_code(mut self, code: impl Into<String>) -> Self {
        self.hospital_code = code.into();
        self
    }

    #[must_use]
    pub fn with_physician_id(mut self, id: impl Into<String>) -> Self {
        self.physician_id = id.into();
        self
    }

    #[must_use]
    pub fn with_unified_seconds(mut self, seconds: u8) -> Self {
        self.unified_seconds = Some(seconds);
        self
    }
}

/// Write the export document to a file, Big5 encoded.
pub fn write_export(
    output_path: &Path,
    patients: &BTreeMap<MedicalRecordNumber, Patient>,
    measurements: &[PairedMeasurement],
    options: &ExportOptions,
) -> Result<()> {
    let bytes = render_export(patients, measurements, options)?;
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    fs::write(output_path, bytes).with_context(|| format!("write {}", output_path.display()))
}

/// Render the export document as Big5 bytes.
///
/// Output is deterministic for identical inputs and options (with
/// `unified_seconds` pinned).
pub fn render_export(
    patients: &BTreeMap<MedicalRecordNumber, Patient>,
    measurements: &[PairedMeasurement],
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    let unified_seconds = options
        .unified_seconds
        .unwrap_or_else(|| Local::now().second() as u8);

    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("Big5"), None)))?;
    xml.write_event(Event::Start(BytesStart::new("patient")))?;

    for measurement in measurements {
        measurement.validate()?;
        let patient = patients
            .get(&measurement.mrn)
            .ok_or_else(|| anyhow!("no patient record for {}", measurement.mrn))?;
        write_hdata(&mut xml, patient, measurement, options, unified_seconds)?;
    }

    xml.write_event(Event::End(BytesEnd::new("patient")))?;

    let document =
        String::from_utf8(xml.into_inner()).context("export document is not valid UTF-8")?;
    encode_big5(&document)
}

fn write_hdata<W: Write>(
    xml: &mut Writer<W>,
    patient: &Patient,
    measurement: &PairedMeasurement,
    options: &ExportOptions,
    unified_seconds: u8,
) -> Result<()> {
    let at = &measurement.at;
    xml.write_event(Event::Start(BytesStart::new("hdata")))?;

    write_text_element(xml, "h1", nhi::REPORT_TYPE)?;
    write_text_element(xml, "h2", &options.hospital_code)?;
    write_text_element(xml, "h3", nhi::MEDICAL_CATEGORY)?;
    write_text_element(xml, "h4", at.year_month())?;
    write_text_element(xml, "h5", &at.datetime_digits())?;
    write_text_element(xml, "h6", nhi::CASE_TYPE)?;
    write_text_element(xml, "h7", nhi::BP_ITEM_CODE)?;
    write_text_element(xml, "h8", nhi::VISIT_SEQUENCE)?;
    if let Some(person_id) = &patient.person_id {
        write_text_element(xml, "h9", person_id)?;
    }
    write_text_element(xml, "h10", patient.mrn.as_str())?;
    write_text_element(xml, "h11", at.date())?;
    write_text_element(xml, "h12", at.date())?;
    write_text_element(xml, "h15", &options.diagnosis_code)?;
    write_text_element(xml, "h16", &at.datetime_digits())?;
    write_text_element(xml, "h17", &options.physician_id)?;
    write_text_element(xml, "h19", &at.minute_digits())?;
    write_text_element(xml, "h20", &at.minute_digits())?;
    if let Some(name) = &patient.name {
        write_text_element(xml, "h22", name)?;
    }
    write_text_element(xml, "h26", nhi::TRANSFER_FLAG)?;

    if let Some(systolic) = measurement.systolic {
        write_rdata(
            xml,
            nhi::SYSTOLIC_SEQUENCE,
            "收縮壓",
            systolic,
            nhi::SYSTOLIC_REFERENCE,
            at,
            options,
            unified_seconds,
        )?;
    }
    if let Some(diastolic) = measurement.diastolic {
        write_rdata(
            xml,
            nhi::DIASTOLIC_SEQUENCE,
            "舒張壓",
            diastolic,
            nhi::DIASTOLIC_REFERENCE,
            at,
            options,
            unified_seconds,
        )?;
    }

    xml.write_event(Event::End(BytesEnd::new("hdata")))?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_rdata<W: Write>(
    xml: &mut Writer<W>,
    sequence: &str,
    name: &str,
    value: u16,
    reference: &str,
    at: &RocTimestamp,
    options: &ExportOptions,
    unified_seconds: u8,
) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new("rdata")))?;
    write_text_element(xml, "r1", sequence)?;
    write_text_element(xml, "r2", name)?;
    write_text_element(xml, "r3", nhi::TEST_METHOD)?;
    write_text_element(xml, "r4", &value.to_string())?;
    write_text_element(xml, "r5", nhi::BP_UNIT)?;
    write_text_element(xml, "r6-1", reference)?;
    write_text_element(xml, "r9", &options.hospital_code)?;
    write_text_element(xml, "r10", &report_time(at, unified_seconds))?;
    xml.write_event(Event::End(BytesEnd::new("rdata")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Report time for `r10`: measurement time plus one minute, seconds
/// replaced by the run-wide unified value. Falls back to the raw digits
/// when the time field is too short to carry hours and minutes.
pub fn report_time(at: &RocTimestamp, unified_seconds: u8) -> String {
    let time = at.time();
    if time.len() < 6 {
        return at.datetime_digits();
    }
    let Ok(mut hour) = time[..2].parse::<u8>() else {
        return at.datetime_digits();
    };
    let Ok(mut minute) = time[2..4].parse::<u8>() else {
        return at.datetime_digits();
    };
    minute += 1;
    if minute >= 60 {
        minute = 0;
        hour += 1;
        if hour >= 24 {
            hour = 0;
        }
    }
    format!(
        "{}{hour:02}{minute:02}{seconds:02}",
        at.date(),
        seconds = unified_seconds
    )
}

/// Encode the document as Big5, listing every unencodable character.
fn encode_big5(document: &str) -> Result<Vec<u8>> {
    let (encoded, _, had_errors) = BIG5.encode(document);
    if had_errors {
        let mut problematic: BTreeSet<char> = BTreeSet::new();
        let mut buffer = [0u8; 4];
        for ch in document.chars() {
            let (_, _, bad) = BIG5.encode(ch.encode_utf8(&mut buffer));
            if bad {
                problematic.insert(ch);
            }
        }
        let listing: String = problematic.into_iter().collect();
        return Err(anyhow!(
            "characters not representable in Big5: {listing}"
        ));
    }
    Ok(encoded.into_owned())
}
