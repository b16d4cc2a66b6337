//! End-to-end runs of the `check` command over dumps written to disk.

use std::fs;
use std::path::{Path, PathBuf};

use argo_cli::commands::{file_types_table, run_check};
use argo_cli::summary::{issue_table, summary_table};
use argo_cli::types::CheckConfig;
use argo_model::{
    AttrValue, DataFile, DataType, FileReport, FileSpecDocument, FileType, MemoryFile, SpecDimension,
    SpecVariable,
};
use argo_standards::spec_file_name;
use argo_validate::ValidationOptions;

fn unique_temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "argo-checker-cli-{}-{}-{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    dir
}

fn write(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn profile_spec() -> FileSpecDocument {
    FileSpecDocument::new("argo-profile-spec-v3.1", FileType::Profile, "3.1")
        .with_dimension(SpecDimension::new("DATE_TIME", 14))
        .with_dimension(SpecDimension::new("STRING2", 2))
        .with_dimension(SpecDimension::new("STRING4", 4))
        .with_dimension(SpecDimension::new("STRING8", 8))
        .with_dimension(SpecDimension::new("STRING16", 16))
        .with_dimension(SpecDimension::new("N_PROF", 0))
        .with_variable(SpecVariable::new("DATA_TYPE", DataType::Char, ["STRING16"]))
        .with_variable(SpecVariable::new("FORMAT_VERSION", DataType::Char, ["STRING4"]))
        .with_variable(SpecVariable::new("DATE_CREATION", DataType::Char, ["DATE_TIME"]))
        .with_variable(SpecVariable::new("DATE_UPDATE", DataType::Char, ["DATE_TIME"]))
        .with_variable(SpecVariable::new(
            "PLATFORM_NUMBER",
            DataType::Char,
            ["N_PROF", "STRING8"],
        ))
        .with_variable(SpecVariable::new(
            "DATA_CENTRE",
            DataType::Char,
            ["N_PROF", "STRING2"],
        ))
        .with_variable(SpecVariable::new("CYCLE_NUMBER", DataType::Int, ["N_PROF"]))
        .with_variable(SpecVariable::new("DIRECTION", DataType::Char, ["N_PROF"]))
        .with_variable(SpecVariable::new("DATA_MODE", DataType::Char, ["N_PROF"]))
}

fn profile_file(name: &str) -> MemoryFile {
    MemoryFile::new(name)
        .with_dimension("DATE_TIME", 14)
        .with_dimension("STRING2", 2)
        .with_dimension("STRING4", 4)
        .with_dimension("STRING8", 8)
        .with_dimension("STRING16", 16)
        .with_dimension("N_PROF", 1)
        .with_text("DATA_TYPE", &["STRING16"], ["Argo profile"])
        .with_text("FORMAT_VERSION", &["STRING4"], ["3.1"])
        .with_text("DATE_CREATION", &["DATE_TIME"], ["20240101120000"])
        .with_text("DATE_UPDATE", &["DATE_TIME"], ["20240101130000"])
        .with_text("PLATFORM_NUMBER", &["N_PROF", "STRING8"], ["6900001"])
        .with_text("DATA_CENTRE", &["N_PROF", "STRING2"], ["IF"])
        .with_numbers("CYCLE_NUMBER", DataType::Int, &["N_PROF"], [1.0])
        .with_text("DIRECTION", &["N_PROF"], ["A"])
        .with_text("DATA_MODE", &["N_PROF"], ["R"])
}

/// A specification directory with the profile v3.1 specification and a DAC table.
fn spec_dir(name: &str) -> PathBuf {
    let dir = unique_temp_dir(name);
    let json = serde_json::to_vec_pretty(&profile_spec()).unwrap();
    write(&dir.join(spec_file_name(FileType::Profile, "3.1")), &json);
    write(&dir.join("ref").join("dac_centres"), b"coriolis|IF\naoml|AO\n");
    dir
}

fn write_dump(dir: &Path, file: &MemoryFile) -> PathBuf {
    let path = dir.join("dumps").join(format!("{}.json", file.file_name()));
    write(&path, file.to_json_pretty().unwrap().as_bytes());
    path
}

fn config(dir: &Path, files: Vec<PathBuf>) -> CheckConfig {
    CheckConfig {
        files,
        spec_dir: dir.to_path_buf(),
        ref_dir: None,
        options: ValidationOptions {
            dac: Some("coriolis".to_string()),
            ..ValidationOptions::default()
        },
        json_output: None,
    }
}

#[test]
fn conforming_dump_is_accepted() {
    let dir = spec_dir("accepted");
    let dump = write_dump(&dir, &profile_file("R6900001_001.nc"));

    let result = run_check(&config(&dir, vec![dump])).unwrap();
    assert_eq!(result.reports.len(), 1);
    assert_eq!(result.accepted_count(), 1);
    assert!(!result.has_errors());

    let summary = summary_table(&result).to_string();
    assert!(summary.contains("R6900001_001.nc"));
    assert!(summary.contains("FILE-ACCEPTED"));
    assert!(issue_table(&result).is_none());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn rejected_and_unreadable_files_fail_the_run() {
    let dir = spec_dir("rejected");
    let good = write_dump(&dir, &profile_file("R6900001_001.nc"));
    let bad = write_dump(
        &dir,
        &profile_file("R6900001_002.nc").without_variable("FORMAT_VERSION"),
    );
    let missing = dir.join("dumps").join("R6900001_003.nc.json");

    let result = run_check(&config(&dir, vec![good, bad, missing.clone()])).unwrap();
    assert_eq!(result.reports.len(), 2);
    assert_eq!(result.accepted_count(), 1);
    assert_eq!(result.rejected_count(), 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].path, missing);
    assert!(result.failures[0].suggestion.is_some());
    assert!(result.has_errors());

    let issues = issue_table(&result).unwrap().to_string();
    assert!(issues.contains("FORMAT_VERSION not in file"));
    assert!(issues.contains("REJECT"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn data_errors_are_reported_per_file() {
    let dir = spec_dir("data");
    let dump = write_dump(
        &dir,
        &profile_file("R6900001_001.nc").with_text("DATA_CENTRE", &["N_PROF", "STRING2"], ["AO"]),
    );

    let result = run_check(&config(&dir, vec![dump])).unwrap();
    let report = &result.reports[0];
    assert!(!report.is_accepted());
    assert_eq!(report.error_count(), 1);
    insta::assert_debug_snapshot!(report.findings.error_messages(), @r#"
    [
        "DATA_CENTRE[1]: 'AO': Invalid for DAC coriolis",
    ]
    "#);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn reports_are_written_as_json() {
    let dir = spec_dir("json");
    let dump = write_dump(&dir, &profile_file("R6900001_001.nc"));
    let output = dir.join("out").join("reports.json");
    let mut config = config(&dir, vec![dump]);
    config.json_output = Some(output.clone());

    let result = run_check(&config).unwrap();
    let reports: Vec<FileReport> =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(reports, result.reports);
    insta::assert_json_snapshot!(reports, @r#"
    [
      {
        "file_name": "R6900001_001.nc",
        "dac": "coriolis",
        "file_type": "PROFILE",
        "format_version": "3.1",
        "status": "FILE-ACCEPTED",
        "phase": "DATA-VALIDATION",
        "findings": []
      }
    ]
    "#);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_reference_directory_stops_the_run() {
    let dir = unique_temp_dir("no-ref");
    let error = run_check(&config(&dir, Vec::new())).unwrap_err();
    assert!(
        format!("{error:#}").starts_with("open specification directory"),
        "error: {error:#}"
    );
}

#[test]
fn file_types_are_listed() {
    let table = file_types_table().to_string();
    for file_type in FileType::ALL {
        assert!(table.contains(file_type.label()));
        assert!(table.contains(file_type.data_type()));
    }
    assert!(table.contains("argo-b_trajectory-spec-v<version>"));
}

#[test]
fn undeclared_global_attributes_are_ignored() {
    let dir = spec_dir("attrs");
    let file = profile_file("R6900001_001.nc")
        .with_global_attribute("title", AttrValue::text("Argo float vertical profile"));
    let dump = write_dump(&dir, &file);

    let result = run_check(&config(&dir, vec![dump])).unwrap();
    assert!(result.reports[0].is_accepted(), "{:?}", result.reports[0]);

    let _ = fs::remove_dir_all(dir);
}
