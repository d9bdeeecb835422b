//! End-to-end runs over a small workbook.

use std::fs;
use std::path::{Path, PathBuf};

use cohort_cli::manifest::MANIFEST_FILE;
use cohort_cli::{PipelineConfig, run_pipeline};
use cohort_map::{CanonicalField, SheetMapping};
use cohort_model::{Enzyme, Timepoint};
use cohort_report::{
    BASELINE_POSTMATCH_FILE, BASELINE_PREMATCH_FILE, DOSE_RESPONSE_FILE, MATCHED_COHORT_FILE,
    SUBGROUP_FILE, TEMPORAL_FILE,
};

const OUTPUT_FILES: [&str; 7] = [
    BASELINE_PREMATCH_FILE,
    BASELINE_POSTMATCH_FILE,
    TEMPORAL_FILE,
    SUBGROUP_FILE,
    DOSE_RESPONSE_FILE,
    MATCHED_COHORT_FILE,
    MANIFEST_FILE,
];

type Row<'a> = Vec<(CanonicalField, &'a str)>;

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Writes a sheet with every mapped column, skipping headers in `omit`.
fn write_sheet(path: &Path, mapping: &SheetMapping, rows: &[Row<'_>], omit: &[&str]) {
    let columns: Vec<(&CanonicalField, &String)> = mapping
        .columns
        .iter()
        .filter(|(_, column)| !omit.contains(&column.as_str()))
        .collect();
    let mut text = columns
        .iter()
        .map(|(_, column)| csv_field(column))
        .collect::<Vec<_>>()
        .join(",");
    text.push('\n');
    for row in rows {
        let line = columns
            .iter()
            .map(|(field, _)| {
                row.iter()
                    .find(|(f, _)| f == *field)
                    .map(|(_, v)| csv_field(v))
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(",");
        text.push_str(&line);
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

fn patient<'a>(id: &'a str, age: &'a str, sex: &'a str, ast: (&'a str, &'a str)) -> Row<'a> {
    vec![
        (CanonicalField::PatientId, id),
        (CanonicalField::Age, age),
        (CanonicalField::Sex, sex),
        (CanonicalField::Lab(Enzyme::Ast, Timepoint::Baseline), ast.0),
        (CanonicalField::Lab(Enzyme::Ast, Timepoint::Month6), ast.1),
    ]
}

fn treatment_rows() -> Vec<Row<'static>> {
    let mut rows = vec![
        patient("1", "40", "M", ("40", "55")),
        patient("2", "55", "F", ("38", "70")),
        patient("3", "60", "M", ("52", "50")),
    ];
    rows[0].push((CanonicalField::DoseMgkg, "9.5"));
    rows[1].push((CanonicalField::DoseMgkg, "12"));
    rows[0].push((CanonicalField::IntervalDays, "180"));
    rows[0].push((CanonicalField::AdverseEvent, "none"));
    rows[1].push((CanonicalField::AdverseEvent, "rash"));
    rows
}

fn control_rows() -> Vec<Row<'static>> {
    vec![
        patient("101", "38", "M", ("30", "31")),
        patient("102", "41", "M", ("35", "33")),
        patient("103", "54", "F", ("44", "40")),
        patient("104", "59", "M", ("28", "30")),
        patient("105", "70", "F", ("50", "48")),
    ]
}

fn workbook(dir: &Path) -> PathBuf {
    let workbook = dir.join("workbook");
    fs::create_dir_all(&workbook).unwrap();
    write_sheet(
        &workbook.join("treatment.csv"),
        &SheetMapping::default_treatment(),
        &treatment_rows(),
        &[],
    );
    write_sheet(
        &workbook.join("Control.csv"),
        &SheetMapping::default_control(),
        &control_rows(),
        &[],
    );
    workbook
}

/// `patient_id` column of the matched cohort, grouped by pair.
fn matched_pairs(csv: &str) -> Vec<(String, String, String)> {
    let lines: Vec<Vec<&str>> = csv.lines().skip(1).map(|l| l.split(',').collect()).collect();
    lines
        .chunks(2)
        .map(|pair| {
            (
                pair[0][0].to_string(),
                pair[0][3].to_string(),
                pair[1][3].to_string(),
            )
        })
        .collect()
}

#[test]
fn reference_workbook_yields_three_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = workbook(dir.path());
    let output = dir.path().join("out");

    let result = run_pipeline(&workbook, &output, &PipelineConfig::default(), false).unwrap();

    assert_eq!(result.counts.treatment, 3);
    assert_eq!(result.counts.control, 5);
    assert_eq!(result.counts.pairs, 3);
    assert!((result.model.intercept() - (-0.746_087)).abs() < 1e-4);
    assert!((result.model.age_coefficient() - 0.000_887_14).abs() < 1e-5);
    assert!((result.model.sex_coefficient() - 0.298_386).abs() < 1e-4);

    for file in OUTPUT_FILES {
        assert!(output.join(file).is_file(), "{file} not written");
    }
    assert_eq!(result.written.len(), OUTPUT_FILES.len());

    let matched = fs::read_to_string(output.join(MATCHED_COHORT_FILE)).unwrap();
    assert!(matched.starts_with("pair_id,group,source_row,patient_id,age,sex_bin,propensity\n"));
    assert_eq!(
        matched_pairs(&matched),
        vec![
            ("1".to_string(), "3".to_string(), "104".to_string()),
            ("2".to_string(), "1".to_string(), "102".to_string()),
            ("3".to_string(), "2".to_string(), "103".to_string()),
        ]
    );
}

#[test]
fn manifest_records_counts_and_digests() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = workbook(dir.path());
    let output = dir.path().join("out");
    run_pipeline(&workbook, &output, &PipelineConfig::default(), false).unwrap();

    let manifest: serde_json::Value =
        serde_json::from_slice(&fs::read(output.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest["cohort"]["pairs"], 3);
    assert_eq!(manifest["cohort"]["dropped"], 0);
    assert_eq!(manifest["inputs"][0]["file"], "treatment.csv");
    assert_eq!(manifest["inputs"][1]["file"], "Control.csv");
    assert_eq!(manifest["inputs"][1]["rows"], 5);

    let outputs = manifest["outputs"].as_array().unwrap();
    assert_eq!(outputs.len(), 6);
    let matched = outputs
        .iter()
        .find(|o| o["file"] == MATCHED_COHORT_FILE)
        .unwrap();
    assert_eq!(matched["rows"], 6);
    let digest = cohort_cli::manifest::compute_sha256(
        &fs::read(output.join(MATCHED_COHORT_FILE)).unwrap(),
    );
    assert_eq!(matched["sha256"], digest.as_str());
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = workbook(dir.path());
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    let config = PipelineConfig::default();

    run_pipeline(&workbook, &first, &config, false).unwrap();
    run_pipeline(&workbook, &second, &config, false).unwrap();

    for file in OUTPUT_FILES {
        assert_eq!(
            fs::read(first.join(file)).unwrap(),
            fs::read(second.join(file)).unwrap(),
            "{file} differs between runs"
        );
    }
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = workbook(dir.path());
    let output = dir.path().join("out");

    let result = run_pipeline(&workbook, &output, &PipelineConfig::default(), true).unwrap();

    assert!(result.dry_run);
    assert!(result.written.is_empty());
    assert_eq!(result.reports.len(), 6);
    assert!(!output.exists());
}

#[test]
fn missing_columns_fail_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = workbook(dir.path());
    write_sheet(
        &workbook.join("Control.csv"),
        &SheetMapping::default_control(),
        &control_rows(),
        &["Age", "AST 6"],
    );
    let output = dir.path().join("out");

    let error = run_pipeline(&workbook, &output, &PipelineConfig::default(), false).unwrap_err();

    let message = format!("{error:#}");
    assert!(message.contains("age <- 'Age'"), "{message}");
    assert!(message.contains("ast_6 <- 'AST 6'"), "{message}");
    assert!(!output.exists());
}

#[test]
fn missing_sheet_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = workbook(dir.path());
    fs::remove_file(workbook.join("Control.csv")).unwrap();

    let error = run_pipeline(
        &workbook,
        &dir.path().join("out"),
        &PipelineConfig::default(),
        false,
    )
    .unwrap_err();

    assert!(format!("{error:#}").contains("sheet 'control' not found"));
}

#[test]
fn config_file_overrides_sheet_names() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = workbook(dir.path());
    fs::rename(workbook.join("Control.csv"), workbook.join("comparison.csv")).unwrap();

    let mut config = PipelineConfig::default();
    config.mappings.control.sheet = "comparison".to_string();
    let config_path = dir.path().join("cohort.toml");
    fs::write(&config_path, toml::to_string(&config).unwrap()).unwrap();

    let loaded = PipelineConfig::load(&config_path).unwrap();
    assert_eq!(loaded, config);
    let result = run_pipeline(&workbook, &dir.path().join("out"), &loaded, true).unwrap();
    assert_eq!(result.counts.pairs, 3);
}

#[test]
fn unreadable_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[matching]\norder = \"sideways\"\n").unwrap();

    let error = PipelineConfig::load(&path).unwrap_err();
    assert!(matches!(error, cohort_cli::ConfigError::Parse { .. }));
}
