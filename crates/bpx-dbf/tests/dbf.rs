use std::fs;
use std::path::PathBuf;

use bpx_dbf::{DbfError, DbfValue, read_dbf};
use tempfile::TempDir;

/// Build raw dBase III file bytes for a fixture table.
///
/// `fields` are (name, type code, length); `rows` hold one cell per field,
/// encoded as Big5 and padded to the field width. A leading `*` in the
/// first cell marks the record deleted.
fn build_dbf(fields: &[(&str, u8, u8)], rows: &[Vec<&str>]) -> Vec<u8> {
    let record_len: usize = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();
    let header_len = 32 + 32 * fields.len() + 1;
    let mut data = vec![0u8; 32];
    data[0] = 0x03;
    data[1] = 124;
    data[2] = 3;
    data[3] = 15;
    data[4..8].copy_from_slice(&(rows.len() as u32).to_le_bytes());
    data[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
    data[10..12].copy_from_slice(&(record_len as u16).to_le_bytes());

    for (name, code, length) in fields {
        let mut descriptor = [0u8; 32];
        descriptor[..name.len()].copy_from_slice(name.as_bytes());
        descriptor[11] = *code;
        descriptor[16] = *length;
        data.extend_from_slice(&descriptor);
    }
    data.push(0x0D);

    for row in rows {
        let deleted = row.first().is_some_and(|cell| cell.starts_with('*'));
        data.push(if deleted { 0x2A } else { 0x20 });
        for ((_, _, length), cell) in fields.iter().zip(row) {
            let cell = cell.strip_prefix('*').unwrap_or(cell);
            let (encoded, _, _) = encoding_rs::BIG5.encode(cell);
            let mut bytes = encoded.into_owned();
            bytes.resize(*length as usize, b' ');
            data.extend_from_slice(&bytes);
        }
    }
    data.push(0x1A);
    data
}

fn write_fixture(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).expect("write fixture");
    path
}

#[test]
fn reads_patient_master_fixture() {
    let dir = TempDir::new().expect("temp dir");
    let bytes = build_dbf(
        &[
            ("KCSTMR", b'C', 7),
            ("MNAME", b'C', 12),
            ("MSEX", b'C', 1),
            ("MBIRTHDT", b'C', 7),
            ("MPERSONID", b'C', 10),
        ],
        &[
            vec!["0480319", "王小明", "M", "0650412", "A123456789"],
            vec!["0860718", "林美華", "F", "0721130", ""],
        ],
    );
    let path = write_fixture(&dir, "CO01M.DBF", &bytes);

    let table = read_dbf(&path).expect("read table");
    assert_eq!(table.fields.len(), 5);
    assert_eq!(table.num_records(), 2);
    assert_eq!(table.last_updated, (2024, 3, 15));

    let name_idx = table.field_index("mname").expect("case-insensitive lookup");
    assert_eq!(
        table.records[0].values[name_idx],
        DbfValue::Character("王小明".to_string())
    );
    let pid_idx = table.field_index("MPERSONID").expect("field");
    assert!(table.records[1].values[pid_idx].is_blank());
}

#[test]
fn skips_deleted_records() {
    let dir = TempDir::new().expect("temp dir");
    let bytes = build_dbf(
        &[("KCSTMR", b'C', 7)],
        &[vec!["0000001"], vec!["*0000002"], vec!["0000003"]],
    );
    let path = write_fixture(&dir, "CO18H.DBF", &bytes);

    let table = read_dbf(&path).expect("read table");
    assert_eq!(table.num_records(), 2);
    assert_eq!(table.records[1].values[0].as_str(), Some("0000003"));
}

#[test]
fn parses_numeric_and_blank_fields() {
    let dir = TempDir::new().expect("temp dir");
    let bytes = build_dbf(
        &[("HVAL", b'N', 8), ("HRULE", b'C', 10)],
        &[vec!["120", "90-130"], vec!["", ""]],
    );
    let path = write_fixture(&dir, "NUM.DBF", &bytes);

    let table = read_dbf(&path).expect("read table");
    assert_eq!(table.records[0].values[0], DbfValue::Numeric(Some(120.0)));
    assert_eq!(table.records[1].values[0], DbfValue::Numeric(None));
}

#[test]
fn reports_missing_file() {
    let dir = TempDir::new().expect("temp dir");
    let err = read_dbf(&dir.path().join("ABSENT.DBF")).unwrap_err();
    assert!(matches!(err, DbfError::FileNotFound { .. }));
}

#[test]
fn rejects_truncated_records() {
    let dir = TempDir::new().expect("temp dir");
    let mut bytes = build_dbf(&[("KCSTMR", b'C', 7)], &[vec!["0000001"], vec!["0000002"]]);
    // Cut into the middle of the second record.
    bytes.truncate(bytes.len() - 6);
    let path = write_fixture(&dir, "SHORT.DBF", &bytes);

    let err = read_dbf(&path).unwrap_err();
    assert!(matches!(
        err,
        DbfError::TruncatedRecords {
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn rejects_unknown_field_type() {
    let dir = TempDir::new().expect("temp dir");
    let bytes = build_dbf(&[("HMEMO", b'M', 10)], &[]);
    let path = write_fixture(&dir, "MEMO.DBF", &bytes);

    let err = read_dbf(&path).unwrap_err();
    assert!(matches!(err, DbfError::UnsupportedFieldType { code: b'M', .. }));
}
