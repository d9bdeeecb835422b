use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::DataFrame;

use cohort_match::{BalanceMetric, IMBALANCE_THRESHOLD};
use cohort_report::any_to_string;

use cohort_cli::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Workbook: {}", result.workbook_dir.display());
    if result.dry_run {
        println!("Output: {} (dry run, nothing written)", result.output_dir.display());
    } else {
        println!("Output: {}", result.output_dir.display());
    }
    print_sheet_table(result);
    print_model_table(result);
    print_balance_table(result);
    print_report_table(result);
    print_frame_preview("Dose response:", &result.dose_response);
}

fn print_sheet_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Sheet"),
        header_cell("File"),
        header_cell("Rows"),
        header_cell("Harmonized"),
        header_cell("Skipped"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 3..6 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for sheet in &result.sheets {
        let file = sheet
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(sheet.group.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&sheet.sheet),
            dim_cell(file),
            Cell::new(sheet.rows),
            Cell::new(sheet.harmonized),
            count_cell(sheet.skipped, Color::Yellow),
        ]);
    }
    let counts = result.counts;
    table.add_row(vec![
        Cell::new("COHORT")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell(format!("{} dropped", counts.dropped)),
        Cell::new(counts.treatment + counts.control).add_attribute(Attribute::Bold),
        Cell::new(format!("{} pairs", counts.pairs)).add_attribute(Attribute::Bold),
        count_cell(counts.skipped, Color::Yellow),
    ]);
    println!("{table}");
}

fn print_model_table(result: &RunResult) {
    let model = &result.model;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Term"), header_cell("Coefficient")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (term, value) in [
        ("(intercept)", model.intercept()),
        ("age", model.age_coefficient()),
        ("sex_bin", model.sex_coefficient()),
    ] {
        table.add_row(vec![Cell::new(term), Cell::new(format!("{value:.6}"))]);
    }
    println!();
    println!(
        "Propensity model ({} iterations, deviance {:.4}):",
        model.iterations, model.deviance
    );
    println!("{table}");
}

fn print_balance_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Covariate"),
        header_cell("SMD pre"),
        header_cell("SMD post"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for before in &result.balance_prematch.metrics {
        let after = result.balance_postmatch.get(&before.covariate);
        table.add_row(vec![
            Cell::new(&before.covariate),
            smd_cell(Some(before)),
            smd_cell(after),
        ]);
    }
    println!();
    println!("Balance (|SMD| > {IMBALANCE_THRESHOLD} highlighted):");
    println!("{table}");
}

fn print_report_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Report"),
        header_cell("Rows"),
        header_cell("SHA-256"),
        header_cell("Written"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for report in &result.reports {
        let written = result
            .written
            .iter()
            .any(|path| path.file_name().is_some_and(|name| name == report.file_name));
        table.add_row(vec![
            Cell::new(report.file_name),
            Cell::new(report.rows),
            dim_cell(&report.sha256[..12.min(report.sha256.len())]),
            written_cell(written),
        ]);
    }
    println!();
    println!("{table}");
}

fn print_frame_preview(title: &str, frame: &DataFrame) {
    if frame.height() == 0 {
        return;
    }
    let mut table = Table::new();
    table.set_header(
        frame
            .get_column_names()
            .iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row_idx in 0..frame.height() {
        let row: Vec<Cell> = frame
            .get_columns()
            .iter()
            .map(|column| {
                let value = column
                    .get(row_idx)
                    .map(any_to_string)
                    .unwrap_or_default();
                if value.is_empty() {
                    dim_cell("-")
                } else {
                    Cell::new(value)
                }
            })
            .collect();
        table.add_row(row);
    }
    println!();
    println!("{title}");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn smd_cell(metric: Option<&BalanceMetric>) -> Cell {
    match metric.and_then(|m| m.standardized_difference) {
        Some(value) if value.abs() > IMBALANCE_THRESHOLD => Cell::new(format!("{value:.3}"))
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold),
        Some(value) => Cell::new(format!("{value:.3}")),
        None => dim_cell("-"),
    }
}

fn written_cell(written: bool) -> Cell {
    if written {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
