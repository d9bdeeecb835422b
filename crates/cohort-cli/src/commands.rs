use anyhow::{Context, Result};
use comfy_table::Table;

use cohort_cli::{PipelineConfig, RunResult, run_pipeline};
use cohort_map::SheetMapping;

use crate::cli::{MappingsArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_study(args: &RunArgs) -> Result<RunResult> {
    let config = PipelineConfig::load_or_default(args.config.as_deref())
        .context("load configuration")?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.workbook_dir.join("output"));
    run_pipeline(&args.workbook_dir, &output_dir, &config, args.dry_run)
}

pub fn run_mappings(args: &MappingsArgs) -> Result<()> {
    let config = PipelineConfig::load_or_default(args.config.as_deref())
        .context("load configuration")?;
    for mapping in [&config.mappings.treatment, &config.mappings.control] {
        print_mapping(mapping);
    }
    Ok(())
}

fn print_mapping(mapping: &SheetMapping) {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Column", "Required"]);
    apply_table_style(&mut table);
    for (field, column) in &mapping.columns {
        let required = if field.is_required() { "yes" } else { "" };
        table.add_row(vec![field.key(), column.clone(), required.to_string()]);
    }
    println!(
        "{} sheet '{}' (mapping v{}):",
        mapping.group, mapping.sheet, mapping.version
    );
    println!("{table}");
}
