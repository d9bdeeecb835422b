use std::fs;

use cohort_ingest::{IngestError, list_csv_files, load_sheet, locate_sheet};

#[test]
fn lists_only_csv_files_sorted() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("b.csv"), "A\n1\n").unwrap();
    fs::write(dir.path().join("a.CSV"), "A\n1\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignore").unwrap();

    let files = list_csv_files(dir.path()).expect("list files");
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.CSV", "b.csv"]);
}

#[test]
fn locates_sheet_by_stem_case_insensitively() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("Treatment.csv"), "ID\n1\n").unwrap();
    fs::write(dir.path().join("control.csv"), "ID\n2\n").unwrap();

    let path = locate_sheet(dir.path(), "treatment").expect("locate sheet");
    assert!(path.ends_with("Treatment.csv"));

    let (_, sheet) = load_sheet(dir.path(), "CONTROL").expect("load sheet");
    assert_eq!(sheet.name, "CONTROL");
    assert_eq!(sheet.records[0].values, vec!["2"]);
}

#[test]
fn missing_sheet_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("treatment.csv"), "ID\n1\n").unwrap();

    let result = locate_sheet(dir.path(), "control");
    assert!(matches!(result, Err(IngestError::SheetNotFound { .. })));
}

#[test]
fn missing_directory_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = list_csv_files(&dir.path().join("absent"));
    assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
}
