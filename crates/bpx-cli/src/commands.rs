use anyhow::{Context, Result};
use comfy_table::Table;

use bpx_cli::pipeline::{ExportRequest, ExportResult, run_export};
use bpx_dbf::read_dbf;
use bpx_ingest::DateFilter;
use bpx_model::{PairingPolicy, UnmatchedPolicy};
use bpx_report::ExportOptions;

use crate::cli::{ExportArgs, InspectArgs};
use crate::summary::apply_table_style;

pub fn run_export_command(args: &ExportArgs) -> Result<ExportResult> {
    let mut policy = PairingPolicy::default().with_latest_only(args.latest_only);
    if args.keep_partial {
        policy = policy.with_unmatched(UnmatchedPolicy::KeepPartial);
    }

    let mut options = ExportOptions::default();
    if let Some(code) = &args.hospital_code {
        options = options.with_hospital_code(code);
    }
    if let Some(id) = &args.physician_id {
        options = options.with_physician_id(id);
    }

    let request = ExportRequest {
        data_dir: args.data_dir.clone(),
        output: args.output.clone(),
        patients: args.patients.clone(),
        patient_file: args.patient_file.clone(),
        date_filter: DateFilter {
            from: args.from_date.clone(),
            to: args.to_date.clone(),
        },
        policy,
        options,
        dry_run: args.dry_run,
    };
    run_export(&request)
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let table = read_dbf(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let (year, month, day) = table.last_updated;
    println!("File: {}", args.file.display());
    println!("Last updated: {year}-{month:02}-{day:02}");
    println!("Records: {}", table.num_records());

    let mut listing = Table::new();
    listing.set_header(vec!["Field", "Type", "Length", "Decimals"]);
    apply_table_style(&mut listing);
    for field in &table.fields {
        listing.add_row(vec![
            field.name.clone(),
            field.field_type.code().to_string(),
            field.length.to_string(),
            field.decimal_count.to_string(),
        ]);
    }
    println!("{listing}");
    Ok(())
}
