//! CLI argument definitions for the blood-pressure exporter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bpx",
    version,
    about = "Export blood-pressure measurements to health-insurance XML",
    long_about = "Read the clinic patient master (CO01M.DBF) and measurement\n\
                  history (CO18H.DBF), pair systolic/diastolic readings, and\n\
                  write the Big5-encoded physiological measurement upload\n\
                  document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient identifiers in log output (PHI; off by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Export measurements for the requested patients.
    Export(ExportArgs),

    /// Print the structure of a DBF table.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Patient record numbers (normalized to 7 digits).
    #[arg(short = 'p', long = "patients", value_name = "MRN", num_args = 1..)]
    pub patients: Vec<String>,

    /// File with one record number per line (# comments and blank lines
    /// ignored; combined with -p and de-duplicated).
    #[arg(short = 'f', long = "patient-file", value_name = "PATH")]
    pub patient_file: Option<PathBuf>,

    /// Output XML path.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = "blood_pressure_export.xml"
    )]
    pub output: PathBuf,

    /// Directory containing CO01M.DBF and CO18H.DBF.
    #[arg(short = 'd', long = "data-dir", value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Earliest measurement date to include (ROC YYYMMDD, inclusive).
    #[arg(long = "from-date", value_name = "YYYMMDD")]
    pub from_date: Option<String>,

    /// Latest measurement date to include (ROC YYYMMDD, inclusive).
    #[arg(long = "to-date", value_name = "YYYMMDD")]
    pub to_date: Option<String>,

    /// Keep readings whose partner was never recorded.
    ///
    /// By default a systolic reading with no diastolic partner on the same
    /// day (or vice versa) is dropped with a warning.
    #[arg(long = "keep-partial")]
    pub keep_partial: bool,

    /// Export only the newest measurement per patient.
    #[arg(long = "latest-only")]
    pub latest_only: bool,

    /// Override the medical institution code.
    #[arg(long = "hospital-code", value_name = "CODE")]
    pub hospital_code: Option<String>,

    /// Override the physician national id.
    #[arg(long = "physician-id", value_name = "ID")]
    pub physician_id: Option<String>,

    /// Run every stage and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// DBF file to inspect.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
