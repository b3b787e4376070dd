//! DBF header and field descriptor parsing.

use crate::error::{DbfError, Result};
use crate::types::{DbfField, DbfFieldType};

/// Fixed size of the file header.
pub const HEADER_LEN: usize = 32;
/// Fixed size of one field descriptor.
pub const FIELD_DESCRIPTOR_LEN: usize = 32;
/// Byte terminating the field descriptor area.
pub const FIELD_TERMINATOR: u8 = 0x0D;
/// Optional end-of-file marker after the last record.
pub const EOF_MARKER: u8 = 0x1A;
/// Record deletion flag values.
pub const ACTIVE_FLAG: u8 = 0x20;
pub const DELETED_FLAG: u8 = 0x2A;

/// Parsed file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbfHeader {
    pub version: u8,
    pub last_updated: (u16, u8, u8),
    pub record_count: u32,
    pub header_len: u16,
    pub record_len: u16,
}

/// Parse the 32-byte file header.
///
/// Accepts the dBase III layout (version bytes 0x03 and 0x83; the high bit
/// marks an attached memo file, which record parsing does not need).
pub fn parse_header(data: &[u8]) -> Result<DbfHeader> {
    if data.len() < HEADER_LEN {
        return Err(DbfError::invalid_format("file too small for header"));
    }
    let version = data[0];
    if version & 0x7F != 0x03 {
        return Err(DbfError::UnsupportedVersion { version });
    }
    // Update year is stored as an offset from 1900.
    let last_updated = (1900 + u16::from(data[1]), data[2], data[3]);
    let record_count = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let header_len = u16::from_le_bytes([data[8], data[9]]);
    let record_len = u16::from_le_bytes([data[10], data[11]]);
    if (header_len as usize) < HEADER_LEN + 1 {
        return Err(DbfError::invalid_format("declared header length too small"));
    }
    if record_len == 0 {
        return Err(DbfError::invalid_format("record length is zero"));
    }
    Ok(DbfHeader {
        version,
        last_updated,
        record_count,
        header_len,
        record_len,
    })
}

/// Parse the field descriptor area that follows the header.
pub fn parse_field_descriptors(data: &[u8], header: &DbfHeader) -> Result<Vec<DbfField>> {
    let end = header.header_len as usize;
    if data.len() < end {
        return Err(DbfError::invalid_format(
            "file shorter than declared header length",
        ));
    }
    let mut fields = Vec::new();
    let mut offset = HEADER_LEN;
    loop {
        if offset >= end {
            return Err(DbfError::MissingFieldTerminator);
        }
        if data[offset] == FIELD_TERMINATOR {
            break;
        }
        if offset + FIELD_DESCRIPTOR_LEN > end {
            return Err(DbfError::MissingFieldTerminator);
        }
        let descriptor = &data[offset..offset + FIELD_DESCRIPTOR_LEN];
        fields.push(parse_descriptor(descriptor)?);
        offset += FIELD_DESCRIPTOR_LEN;
    }
    if fields.is_empty() {
        return Err(DbfError::invalid_format("table declares no fields"));
    }
    Ok(fields)
}

fn parse_descriptor(descriptor: &[u8]) -> Result<DbfField> {
    let name_bytes = &descriptor[..11];
    let name_end = name_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(name_bytes.len());
    let name = String::from_utf8_lossy(&name_bytes[..name_end])
        .trim()
        .to_string();
    let code = descriptor[11];
    let field_type =
        DbfFieldType::from_code(code).ok_or_else(|| DbfError::UnsupportedFieldType {
            name: name.clone(),
            code,
        })?;
    Ok(DbfField {
        name,
        field_type,
        length: descriptor[16],
        decimal_count: descriptor[17],
    })
}
