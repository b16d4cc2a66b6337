//! Whole validation runs: open, format verification and data validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use argo_model::{
    AttrValue, DataType, FileSpecDocument, FileStatus, FileType, MemoryFile, Phase, SpecAttribute,
    SpecDimension, SpecVariable,
};
use argo_standards::{ReferenceTables, SpecCache, StandardsRegistry, spec_file_name};
use argo_validate::{ValidateError, ValidationOptions, ValidationSession};

fn unique_temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "argo-checker-{}-{}-{}",
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
        .with_variable(
            SpecVariable::new("DATA_TYPE", DataType::Char, ["STRING16"])
                .with_attribute("long_name", SpecAttribute::text("Data type")),
        )
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
        .with_global_attribute("title", SpecAttribute::text("Argo float vertical profile"))
}

fn profile_file() -> MemoryFile {
    MemoryFile::new("R6900001_001.nc")
        .with_dimension("DATE_TIME", 14)
        .with_dimension("STRING2", 2)
        .with_dimension("STRING4", 4)
        .with_dimension("STRING8", 8)
        .with_dimension("STRING16", 16)
        .with_dimension("N_PROF", 1)
        .with_text("DATA_TYPE", &["STRING16"], ["Argo profile"])
        .with_attribute("DATA_TYPE", "long_name", AttrValue::text("Data type"))
        .with_text("FORMAT_VERSION", &["STRING4"], ["3.1"])
        .with_text("DATE_CREATION", &["DATE_TIME"], ["20240101120000"])
        .with_text("DATE_UPDATE", &["DATE_TIME"], ["20240101130000"])
        .with_text("PLATFORM_NUMBER", &["N_PROF", "STRING8"], ["6900001"])
        .with_text("DATA_CENTRE", &["N_PROF", "STRING2"], ["IF"])
        .with_numbers("CYCLE_NUMBER", DataType::Int, &["N_PROF"], [1.0])
        .with_text("DIRECTION", &["N_PROF"], ["A"])
        .with_text("DATA_MODE", &["N_PROF"], ["R"])
        .with_global_attribute("title", AttrValue::text("Argo float vertical profile"))
}

/// A specification directory holding the profile v3.1 specification.
fn registry(name: &str) -> (PathBuf, StandardsRegistry) {
    let dir = unique_temp_dir(name);
    let json = serde_json::to_vec_pretty(&profile_spec()).unwrap();
    write(&dir.join(spec_file_name(FileType::Profile, "3.1")), &json);

    let references = ReferenceTables::new()
        .with_dac("coriolis", ["IF"])
        .with_dac("aoml", ["AO"]);
    let registry = StandardsRegistry::new(&dir, Arc::new(references));
    (dir, registry)
}

fn options(dac: &str) -> ValidationOptions {
    ValidationOptions {
        dac: Some(dac.to_string()),
        ..ValidationOptions::default()
    }
}

#[test]
fn conforming_file_is_accepted() {
    let (dir, registry) = registry("accepted");
    let cache = SpecCache::new();
    let session = ValidationSession::new(&registry, &cache, options("coriolis"));

    let report = session.validate(profile_file()).unwrap();
    assert!(report.is_accepted(), "report: {report:?}");
    assert_eq!(report.phase, Phase::DataValidation);
    assert_eq!(report.file_type, Some(FileType::Profile));
    assert_eq!(report.format_version.as_deref(), Some("3.1"));
    assert_eq!(report.dac.as_deref(), Some("coriolis"));
    assert!(report.findings.is_empty());
    assert_eq!(cache.len(), 1);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn specification_is_loaded_once_per_cache() {
    let (dir, registry) = registry("cache");
    let cache = SpecCache::new();
    let first = ValidationSession::new(&registry, &cache, options("coriolis"));
    let second = ValidationSession::new(&registry, &cache, ValidationOptions::default());

    assert!(first.validate(profile_file()).unwrap().is_accepted());
    assert!(second.validate(profile_file()).unwrap().is_accepted());
    assert_eq!(cache.len(), 1);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn rejected_at_open() {
    let (dir, registry) = registry("open");
    let cache = SpecCache::new();
    let session = ValidationSession::new(&registry, &cache, options("coriolis"));

    let report = session
        .validate(profile_file().with_text("DATA_TYPE", &["STRING16"], ["Argo float"]))
        .unwrap();
    assert_eq!(report.status, FileStatus::Rejected);
    assert_eq!(report.phase, Phase::Open);
    assert_eq!(report.message.as_deref(), Some("Invalid DATA_TYPE: 'Argo float'"));

    let report = session
        .validate(profile_file().without_variable("FORMAT_VERSION"))
        .unwrap();
    assert_eq!(report.message.as_deref(), Some("FORMAT_VERSION not in file"));

    let report = session
        .validate(profile_file().with_text("DATA_TYPE", &["STRING16"], ["ARGO profile"]))
        .unwrap();
    assert_eq!(report.message.as_deref(), Some("Invalid DATA_TYPE: 'ARGO profile'"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn unsupported_version_is_rejected_at_open() {
    let (dir, registry) = registry("version");
    let cache = SpecCache::new();
    let session = ValidationSession::new(&registry, &cache, options("coriolis"));

    let report = session
        .validate(profile_file().with_text("FORMAT_VERSION", &["STRING4"], ["2.9"]))
        .unwrap();
    assert_eq!(report.phase, Phase::Open);
    assert_eq!(
        report.message.as_deref(),
        Some("File type / version not valid in the FileChecker: PROFILE / 2.9")
    );
    assert!(cache.is_empty());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn format_errors_stop_before_data_validation() {
    let (dir, registry) = registry("format");
    let cache = SpecCache::new();
    let session = ValidationSession::new(&registry, &cache, options("coriolis"));

    let data = profile_file()
        .with_dimension("STRING8", 9)
        .with_text("PLATFORM_NUMBER", &["N_PROF", "STRING8"], ["abcde"]);
    let report = session.validate(data).unwrap();
    assert_eq!(report.status, FileStatus::Rejected);
    assert_eq!(report.phase, Phase::FormatVerification);
    insta::assert_debug_snapshot!(report.findings.error_messages(), @r#"
    [
        "dimension: STRING8: Definitions differ\n\tSpecification = '8'\n\tData File     = '9'",
    ]
    "#);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn format_only_skips_data_validation() {
    let (dir, registry) = registry("format-only");
    let cache = SpecCache::new();
    let session = ValidationSession::new(
        &registry,
        &cache,
        ValidationOptions {
            format_only: true,
            ..options("coriolis")
        },
    );

    let data = profile_file().with_text("PLATFORM_NUMBER", &["N_PROF", "STRING8"], ["abcde"]);
    let report = session.validate(data).unwrap();
    assert!(report.is_accepted());
    assert_eq!(report.phase, Phase::FormatVerification);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn data_errors_reject_the_file() {
    let (dir, registry) = registry("data");
    let cache = SpecCache::new();
    let session = ValidationSession::new(&registry, &cache, options("aoml"));

    let report = session.validate(profile_file()).unwrap();
    assert_eq!(report.status, FileStatus::Rejected);
    assert_eq!(report.phase, Phase::DataValidation);
    assert_eq!(
        report.findings.error_messages(),
        vec!["DATA_CENTRE[1]: 'IF': Invalid for DAC aoml"]
    );

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn unknown_dac_is_rejected_at_data_validation() {
    let (dir, registry) = registry("dac");
    let cache = SpecCache::new();
    let session = ValidationSession::new(&registry, &cache, options("nowhere"));

    let report = session.validate(profile_file()).unwrap();
    assert_eq!(report.status, FileStatus::Rejected);
    assert_eq!(report.phase, Phase::DataValidation);
    assert_eq!(report.message.as_deref(), Some("Unknown DAC name = 'nowhere'"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn optional_checks() {
    let (dir, registry) = registry("optional");
    let cache = SpecCache::new();

    let renamed = profile_file().with_file_name("R6900001_002.nc");
    let default = ValidationSession::new(&registry, &cache, options("coriolis"));
    assert!(default.validate(renamed.clone()).unwrap().is_accepted());

    let named = ValidationSession::new(
        &registry,
        &cache,
        ValidationOptions {
            check_file_name: true,
            ..options("coriolis")
        },
    );
    let report = named.validate(renamed).unwrap();
    assert_eq!(report.status, FileStatus::Rejected);
    assert_eq!(report.error_count(), 1);

    let with_nul = profile_file().with_text("DATA_MODE", &["N_PROF"], ["\0"]);
    let report = default.validate(with_nul.clone()).unwrap();
    assert_eq!(
        report.findings.warning_messages(),
        vec!["DATA_MODE: NULL character at [1]"]
    );

    let quiet = ValidationSession::new(
        &registry,
        &cache,
        ValidationOptions {
            check_nulls: false,
            ..options("coriolis")
        },
    );
    assert!(quiet.validate(with_nul).unwrap().findings.is_empty());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn options_deserialize_with_defaults() {
    let options: ValidationOptions = serde_json::from_str(r#"{ "dac": " coriolis " }"#).unwrap();
    assert_eq!(options.dac(), Some("coriolis"));
    assert!(options.check_nulls);
    assert!(!options.check_battery);
    assert!(!options.check_file_name);
    assert!(!options.format_only);
}

#[test]
fn validate_dump_from_disk() {
    let (dir, registry) = registry("dump");
    let cache = SpecCache::new();
    let session = ValidationSession::new(&registry, &cache, options("coriolis"));

    let path = dir.join("R6900001_001.json");
    write(&path, profile_file().to_json_pretty().unwrap().as_bytes());
    let report = session.validate_path(&path).unwrap();
    assert!(report.is_accepted(), "report: {report:?}");
    assert_eq!(report.file_name, "R6900001_001.nc");

    let empty = dir.join("empty.json");
    write(&empty, b"");
    let err = session.validate_path(&empty).unwrap_err();
    assert!(matches!(err, ValidateError::EmptySource { .. }));
    assert_eq!(err.to_string(), format!("File '{}' is zero length", empty.display()));

    let missing = dir.join("missing.json");
    assert!(matches!(
        session.validate_path(&missing).unwrap_err(),
        ValidateError::Open { .. }
    ));

    let _ = fs::remove_dir_all(dir);
}
