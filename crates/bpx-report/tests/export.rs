use std::collections::BTreeMap;

use encoding_rs::BIG5;

use bpx_model::{MedicalRecordNumber, PairedMeasurement, Patient, RocTimestamp};
use bpx_report::{ExportOptions, render_export, write_export};

fn mrn(value: &str) -> MedicalRecordNumber {
    MedicalRecordNumber::parse(value).expect("mrn")
}

fn patient(id: &str, name: Option<&str>, person_id: Option<&str>) -> Patient {
    Patient {
        mrn: mrn(id),
        name: name.map(str::to_string),
        sex: Some("F".to_string()),
        birth_date: Some("0480319".to_string()),
        person_id: person_id.map(str::to_string),
    }
}

fn one_patient(p: Patient) -> BTreeMap<MedicalRecordNumber, Patient> {
    let mut patients = BTreeMap::new();
    patients.insert(p.mrn.clone(), p);
    patients
}

#[test]
fn renders_expected_document() {
    let patients = one_patient(patient("480319", Some("王小明"), Some("A123456789")));
    let measurements = vec![PairedMeasurement::full(
        mrn("480319"),
        RocTimestamp::new("1130105", "093000").expect("ts"),
        120,
        80,
    )];
    let options = ExportOptions::default().with_unified_seconds(7);

    let bytes = render_export(&patients, &measurements, &options).expect("render");
    let (decoded, _, had_errors) = BIG5.decode(&bytes);
    assert!(!had_errors);

    let expected = "\
<?xml version=\"1.0\" encoding=\"Big5\"?>
<patient>
  <hdata>
    <h1>1</h1>
    <h2>3522013684</h2>
    <h3>11</h3>
    <h4>11301</h4>
    <h5>1130105093000</h5>
    <h6>01</h6>
    <h7>0023</h7>
    <h8>1</h8>
    <h9>A123456789</h9>
    <h10>0480319</h10>
    <h11>1130105</h11>
    <h12>1130105</h12>
    <h15>Y00006</h15>
    <h16>1130105093000</h16>
    <h17>N125074991</h17>
    <h19>11301050930</h19>
    <h20>11301050930</h20>
    <h22>王小明</h22>
    <h26>0</h26>
    <rdata>
      <r1>1</r1>
      <r2>收縮壓</r2>
      <r3>生理量測血壓(OBPM)</r3>
      <r4>120</r4>
      <r5>mmHg</r5>
      <r6-1>90-130</r6-1>
      <r9>3522013684</r9>
      <r10>1130105093107</r10>
    </rdata>
    <rdata>
      <r1>2</r1>
      <r2>舒張壓</r2>
      <r3>生理量測血壓(OBPM)</r3>
      <r4>80</r4>
      <r5>mmHg</r5>
      <r6-1>60-80</r6-1>
      <r9>3522013684</r9>
      <r10>1130105093107</r10>
    </rdata>
  </hdata>
</patient>";
    assert_eq!(decoded, expected);
}

#[test]
fn omits_absent_identity_fields_and_sides() {
    let patients = one_patient(patient("480319", None, None));
    let measurements = vec![PairedMeasurement::partial(
        mrn("480319"),
        RocTimestamp::new("1130105", "093000").expect("ts"),
        bpx_model::BpKind::Diastolic,
        80,
    )];
    let options = ExportOptions::default().with_unified_seconds(0);

    let bytes = render_export(&patients, &measurements, &options).expect("render");
    let (decoded, _, _) = BIG5.decode(&bytes);

    assert!(!decoded.contains("<h9>"));
    assert!(!decoded.contains("<h22>"));
    assert!(!decoded.contains("<r1>1</r1>"));
    assert!(decoded.contains("<r1>2</r1>"));
    assert!(decoded.contains("<r4>80</r4>"));
    assert!(decoded.contains("<r10>1130105093100</r10>"));
}

#[test]
fn overridden_codes_flow_into_every_field() {
    let patients = one_patient(patient("480319", None, None));
    let measurements = vec![PairedMeasurement::full(
        mrn("480319"),
        RocTimestamp::new("1130105", "093000").expect("ts"),
        120,
        80,
    )];
    let options = ExportOptions::default()
        .with_hospital_code("1234567890")
        .with_physician_id("A987654321")
        .with_unified_seconds(0);

    let bytes = render_export(&patients, &measurements, &options).expect("render");
    let (decoded, _, _) = BIG5.decode(&bytes);

    assert!(decoded.contains("<h2>1234567890</h2>"));
    assert!(decoded.contains("<h17>A987654321</h17>"));
    assert!(decoded.contains("<r9>1234567890</r9>"));
    assert!(!decoded.contains("3522013684"));
}

#[test]
fn lists_characters_not_representable_in_big5() {
    let patients = one_patient(patient("480319", Some("王😀明"), None));
    let measurements = vec![PairedMeasurement::full(
        mrn("480319"),
        RocTimestamp::new("1130105", "093000").expect("ts"),
        120,
        80,
    )];
    let options = ExportOptions::default().with_unified_seconds(0);

    let err = render_export(&patients, &measurements, &options).expect_err("must fail");
    let message = err.to_string();
    assert!(message.contains("Big5"));
    assert!(message.contains('😀'));
}

#[test]
fn fails_when_a_measurement_has_no_patient_record() {
    let patients = BTreeMap::new();
    let measurements = vec![PairedMeasurement::full(
        mrn("480319"),
        RocTimestamp::new("1130105", "093000").expect("ts"),
        120,
        80,
    )];
    let err = render_export(&patients, &measurements, &ExportOptions::default())
        .expect_err("must fail");
    assert!(err.to_string().contains("0480319"));
}

#[test]
fn writes_file_creating_parent_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out").join("export.xml");

    let patients = one_patient(patient("480319", None, None));
    let measurements = vec![PairedMeasurement::full(
        mrn("480319"),
        RocTimestamp::new("1130105", "093000").expect("ts"),
        120,
        80,
    )];
    let options = ExportOptions::default().with_unified_seconds(0);

    write_export(&path, &patients, &measurements, &options).expect("write");
    let bytes = std::fs::read(&path).expect("read back");
    assert!(bytes.starts_with(b"<?xml version=\"1.0\" encoding=\"Big5\"?>"));
}
