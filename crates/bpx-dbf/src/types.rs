//! Core types for DBF table handling.

use std::fmt;

use encoding_rs::{BIG5, Encoding};

/// DBF field data types supported by this reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbfFieldType {
    /// `C` - fixed-width text.
    Character,
    /// `N` - right-justified ASCII number.
    Numeric,
    /// `F` - floating point, same wire form as Numeric.
    Float,
    /// `D` - `YYYYMMDD` digits.
    Date,
    /// `L` - single-byte logical.
    Logical,
}

impl DbfFieldType {
    /// Map a descriptor type byte to a field type.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'C' => Some(Self::Character),
            b'N' => Some(Self::Numeric),
            b'F' => Some(Self::Float),
            b'D' => Some(Self::Date),
            b'L' => Some(Self::Logical),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Character => 'C',
            Self::Numeric => 'N',
            Self::Float => 'F',
            Self::Date => 'D',
            Self::Logical => 'L',
        }
    }
}

/// A field (column) descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    pub name: String,
    pub field_type: DbfFieldType,
    /// Fixed byte width within a record.
    pub length: u8,
    pub decimal_count: u8,
}

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum DbfValue {
    Character(String),
    /// `None` when the field was blank.
    Numeric(Option<f64>),
    /// Raw digit string; `None` when blank.
    Date(Option<String>),
    /// `None` for `?` or blank.
    Logical(Option<bool>),
}

impl DbfValue {
    /// Borrow the text content of a character field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Character(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Character(value) => value.is_empty(),
            Self::Numeric(value) => value.is_none(),
            Self::Date(value) => value.is_none(),
            Self::Logical(value) => value.is_none(),
        }
    }
}

impl fmt::Display for DbfValue {
    /// Render the value the way the legacy tables spell it: numerics with an
    /// integral value print without a fraction.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(value) => f.write_str(value),
            Self::Numeric(Some(value)) if value.fract() == 0.0 => {
                write!(f, "{}", *value as i64)
            }
            Self::Numeric(Some(value)) => write!(f, "{value}"),
            Self::Numeric(None) => Ok(()),
            Self::Date(Some(value)) => f.write_str(value),
            Self::Date(None) => Ok(()),
            Self::Logical(Some(true)) => f.write_str("T"),
            Self::Logical(Some(false)) => f.write_str("F"),
            Self::Logical(None) => Ok(()),
        }
    }
}

/// One non-deleted record.
#[derive(Debug, Clone, PartialEq)]
pub struct DbfRecord {
    pub values: Vec<DbfValue>,
}

impl DbfRecord {
    pub fn get(&self, index: usize) -> Option<&DbfValue> {
        self.values.get(index)
    }
}

/// A fully parsed DBF table.
#[derive(Debug, Clone, PartialEq)]
pub struct DbfTable {
    /// Last-update date from the header: (year, month, day).
    pub last_updated: (u16, u8, u8),
    pub fields: Vec<DbfField>,
    pub records: Vec<DbfRecord>,
}

impl DbfTable {
    /// Case-insensitive field lookup.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name.eq_ignore_ascii_case(name))
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }
}

/// Options controlling how records are decoded.
#[derive(Debug, Clone, Copy)]
pub struct DbfReaderOptions {
    /// Character-field encoding. The hospital tables use Big5.
    pub encoding: &'static Encoding,
    /// Skip records flagged as deleted (0x2A).
    pub skip_deleted: bool,
    /// Trim surrounding whitespace from character fields.
    pub trim_character_fields: bool,
}

impl Default for DbfReaderOptions {
    fn default() -> Self {
        Self {
            encoding: BIG5,
            skip_deleted: true,
            trim_character_fields: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_codes_round_trip() {
        for code in [b'C', b'N', b'F', b'D', b'L'] {
            let field_type = DbfFieldType::from_code(code).expect("known code");
            assert_eq!(field_type.code() as u8, code);
        }
        assert_eq!(DbfFieldType::from_code(b'M'), None);
    }

    #[test]
    fn numeric_display_drops_integral_fraction() {
        assert_eq!(DbfValue::Numeric(Some(480319.0)).to_string(), "480319");
        assert_eq!(DbfValue::Numeric(Some(36.5)).to_string(), "36.5");
        assert_eq!(DbfValue::Numeric(None).to_string(), "");
    }
}
