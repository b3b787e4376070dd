use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use bpx_cli::pipeline::{ExportResult, PatientSummary};

pub fn print_summary(result: &ExportResult) {
    if let Some(path) = &result.output {
        println!("Output: {}", path.display());
    } else {
        println!("Dry run: no file written");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Patient"),
        header_cell("Name"),
        header_cell("Readings"),
        header_cell("Measurements"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);

    let mut total_readings = 0usize;
    let mut total_measurements = 0usize;
    for patient in &result.patients {
        total_readings += patient.readings;
        total_measurements += patient.measurements;
        table.add_row(vec![
            Cell::new(patient.mrn.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(patient.name.as_deref().unwrap_or("-")),
            Cell::new(patient.readings),
            Cell::new(patient.measurements),
            status_cell(patient),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_readings).add_attribute(Attribute::Bold),
        Cell::new(total_measurements).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    if result.rows_skipped > 0 {
        eprintln!("Skipped {} malformed source rows", result.rows_skipped);
    }
    if result.out_of_range > 0 {
        eprintln!(
            "Rejected {} readings outside plausible ranges",
            result.out_of_range
        );
    }
    if result.dropped_singletons > 0 {
        eprintln!(
            "Dropped {} unpaired readings (use --keep-partial to keep them)",
            result.dropped_singletons
        );
    }
    if result.dropped_duplicates > 0 {
        eprintln!("Dropped {} duplicate readings", result.dropped_duplicates);
    }
    if !result.missing.is_empty() {
        eprintln!("No master record for:");
        for mrn in &result.missing {
            eprintln!("- {mrn}");
        }
    }
}

fn status_cell(patient: &PatientSummary) -> Cell {
    if !patient.matched {
        Cell::new("missing")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else if patient.measurements == 0 {
        Cell::new("no data").fg(Color::Yellow)
    } else {
        Cell::new("ok").fg(Color::Green)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
