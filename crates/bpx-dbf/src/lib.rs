//! dBase III (DBF) table reader.
//!
//! The hospital information system stores its master and history tables as
//! dBase III files with Big5-encoded text fields. This crate parses the
//! fixed-layout header, field descriptors, and fixed-width records into
//! typed values.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use bpx_dbf::read_dbf;
//!
//! let table = read_dbf(Path::new("data/CO01M.DBF")).unwrap();
//! let mrn = table.field_index("KCSTMR").unwrap();
//! for record in &table.records {
//!     println!("{}", record.values[mrn]);
//! }
//! ```

mod error;
pub mod header;
mod reader;
mod types;

pub use error::{DbfError, Result};
pub use reader::{DbfReader, read_dbf, read_dbf_with_options};
pub use types::{DbfField, DbfFieldType, DbfReaderOptions, DbfRecord, DbfTable, DbfValue};
