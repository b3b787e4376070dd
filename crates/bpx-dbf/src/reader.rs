//! DBF file reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{DbfError, Result};
use crate::header::{
    ACTIVE_FLAG, DELETED_FLAG, EOF_MARKER, parse_field_descriptors, parse_header,
};
use crate::types::{DbfField, DbfFieldType, DbfReaderOptions, DbfRecord, DbfTable, DbfValue};

/// DBF file reader.
pub struct DbfReader<R: Read> {
    reader: BufReader<R>,
    options: DbfReaderOptions,
}

impl<R: Read> DbfReader<R> {
    /// Create a new DBF reader with default options (Big5 text, skip
    /// deleted records).
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            options: DbfReaderOptions::default(),
        }
    }

    /// Create a new DBF reader with options.
    pub fn with_options(reader: R, options: DbfReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the entire file into memory and parse it.
    pub fn read_table(mut self) -> Result<DbfTable> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_dbf_data(&data, &self.options)
    }
}

impl DbfReader<File> {
    /// Open a DBF file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(open_file(path)?))
    }

    /// Open a DBF file with options.
    pub fn open_with_options(path: &Path, options: DbfReaderOptions) -> Result<Self> {
        Ok(Self::with_options(open_file(path)?, options))
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DbfError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DbfError::Io(e)
        }
    })
}

/// Read a DBF file from a path with default options.
pub fn read_dbf(path: &Path) -> Result<DbfTable> {
    DbfReader::open(path)?.read_table()
}

/// Read a DBF file with options.
pub fn read_dbf_with_options(path: &Path, options: DbfReaderOptions) -> Result<DbfTable> {
    DbfReader::open_with_options(path, options)?.read_table()
}

/// Parse DBF data from bytes.
fn parse_dbf_data(data: &[u8], options: &DbfReaderOptions) -> Result<DbfTable> {
    let header = parse_header(data)?;
    let fields = parse_field_descriptors(data, &header)?;

    let field_width: usize = fields.iter().map(|f| f.length as usize).sum();
    // Record length includes the leading deletion flag byte.
    if field_width + 1 != header.record_len as usize {
        return Err(DbfError::invalid_format(format!(
            "field widths sum to {} but record length is {}",
            field_width + 1,
            header.record_len
        )));
    }

    let mut records = Vec::with_capacity(header.record_count as usize);
    let record_len = header.record_len as usize;
    let mut offset = header.header_len as usize;
    let mut seen = 0u32;

    while seen < header.record_count {
        let Some(raw) = data.get(offset..offset + record_len) else {
            return Err(DbfError::TruncatedRecords {
                expected: header.record_count,
                actual: seen,
            });
        };
        offset += record_len;
        seen += 1;

        let flag = raw[0];
        if flag == DELETED_FLAG && options.skip_deleted {
            continue;
        }
        if flag != ACTIVE_FLAG && flag != DELETED_FLAG {
            return Err(DbfError::invalid_format(format!(
                "unexpected record flag 0x{flag:02X}"
            )));
        }
        records.push(parse_record(&raw[1..], &fields, options)?);
    }

    // Anything after the last record should be the EOF marker or padding.
    if let Some(&next) = data.get(offset) {
        if next != EOF_MARKER && next != 0 {
            return Err(DbfError::invalid_format(
                "unexpected trailing bytes after records",
            ));
        }
    }

    Ok(DbfTable {
        last_updated: header.last_updated,
        fields,
        records,
    })
}

fn parse_record(
    raw: &[u8],
    fields: &[DbfField],
    options: &DbfReaderOptions,
) -> Result<DbfRecord> {
    let mut values = Vec::with_capacity(fields.len());
    let mut start = 0usize;
    for field in fields {
        let end = start + field.length as usize;
        let bytes = &raw[start..end];
        values.push(parse_value(field, bytes, options)?);
        start = end;
    }
    Ok(DbfRecord { values })
}

fn parse_value(field: &DbfField, bytes: &[u8], options: &DbfReaderOptions) -> Result<DbfValue> {
    match field.field_type {
        DbfFieldType::Character => {
            let (decoded, _, _) = options.encoding.decode(bytes);
            let text = if options.trim_character_fields {
                decoded.trim().to_string()
            } else {
                decoded.into_owned()
            };
            Ok(DbfValue::Character(text))
        }
        DbfFieldType::Numeric | DbfFieldType::Float => {
            let text = ascii_trim(bytes);
            if text.is_empty() {
                return Ok(DbfValue::Numeric(None));
            }
            let value = text
                .parse::<f64>()
                .map_err(|_| DbfError::NumericParse {
                    field: field.name.clone(),
                    value: text.to_string(),
                })?;
            Ok(DbfValue::Numeric(Some(value)))
        }
        DbfFieldType::Date => {
            let text = ascii_trim(bytes);
            if text.is_empty() {
                Ok(DbfValue::Date(None))
            } else {
                Ok(DbfValue::Date(Some(text.to_string())))
            }
        }
        DbfFieldType::Logical => {
            let value = match bytes.first().copied().unwrap_or(b'?') {
                b'T' | b't' | b'Y' | b'y' => Some(true),
                b'F' | b'f' | b'N' | b'n' => Some(false),
                _ => None,
            };
            Ok(DbfValue::Logical(value))
        }
    }
}

/// Trim a fixed-width ASCII field without allocating.
fn ascii_trim(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes)
        .unwrap_or("")
        .trim_matches(|c: char| c == ' ' || c == '\0')
}
