//! Health-insurance XML output.
//!
//! Renders paired blood-pressure measurements as the physiological
//! measurement upload document, Big5 encoded.

pub mod export_xml;
pub mod nhi;

pub use export_xml::{ExportOptions, render_export, report_time, write_export};
