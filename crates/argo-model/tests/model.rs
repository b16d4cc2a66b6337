//! Tests for argo-model types.

use argo_model::{
    AttrHandling, AttrValue, DataFile, DataType, DataTypeClass, FileReport, FileSpec,
    FileSpecDocument, FileStatus, FileType, MemoryFile, ModelError, NullHandling, Phase,
    SpecAttribute, SpecDimension, SpecVariable, classify_data_type,
};

fn profile_spec() -> FileSpecDocument {
    FileSpecDocument::new("argo-profile-spec-v3.1", FileType::Profile, "3.1")
        .with_dimension(SpecDimension::new("N_PROF", 0))
        .with_dimension(SpecDimension::new("STRING8", 8))
        .with_dimension(SpecDimension::new("N_CALIB", 0).optional())
        .with_variable(
            SpecVariable::new("PLATFORM_NUMBER", DataType::Char, ["N_PROF", "STRING8"])
                .with_attribute("long_name", SpecAttribute::text("Float unique identifier")),
        )
        .with_variable(SpecVariable::new("DOXY", DataType::Float, ["N_PROF"]))
        .with_variable(SpecVariable::new("DOXY_QC", DataType::Char, ["N_PROF"]))
        .with_group("DOXY", ["DOXY", "DOXY_QC"])
}

#[test]
fn spec_indexes_groups_and_optional_names() {
    let spec = profile_spec().build().expect("build spec");
    assert_eq!(spec.group_of("DOXY_QC"), Some("DOXY"));
    assert!(spec.is_optional("DOXY"));
    assert!(spec.is_optional("N_CALIB"));
    assert!(!spec.is_optional("PLATFORM_NUMBER"));
    assert_eq!(
        spec.variable("PLATFORM_NUMBER").map(SpecVariable::dimensions_string),
        Some("N_PROF STRING8".to_string())
    );
}

#[test]
fn spec_rejects_unknown_group_member() {
    let err = profile_spec()
        .with_group("CNDC", ["CNDC"])
        .build()
        .expect_err("unknown member");
    assert!(matches!(err, ModelError::InvalidSpec { .. }));
}

#[test]
fn spec_rejects_undefined_variable_dimension() {
    let err = profile_spec()
        .with_variable(SpecVariable::new("PRES", DataType::Float, ["N_LEVELS"]))
        .build()
        .expect_err("undefined dimension");
    assert!(err.to_string().contains("N_LEVELS"));
}

#[test]
fn spec_rejects_bad_regex() {
    let err = profile_spec()
        .with_attr_regex("PLATFORM_NUMBER", "long_name", "(unclosed", false)
        .build()
        .expect_err("bad regex");
    assert!(matches!(err, ModelError::InvalidRegex { .. }));
}

#[test]
fn attr_regex_matches_whole_value() {
    let spec = profile_spec()
        .with_attr_regex("", "title", "Argo float .*", true)
        .build()
        .expect("build spec");
    let regex = spec.attr_regex("", "title").expect("regex");
    assert!(regex.is_match("Argo float vertical profile"));
    assert!(!regex.is_match("An Argo float vertical profile"));
    assert!(regex.warn());
    assert_eq!(regex.as_str(), "Argo float .*");
}

#[test]
fn spec_deserializes_from_json() {
    let json = r#"{
        "name": "argo-technical-spec-v3.2",
        "file_type": "TECHNICAL",
        "version": "3.2",
        "dimensions": [{ "name": "N_TECH_MEASUREMENT", "length": 0 }],
        "variables": [{
            "name": "TECH_PARAM",
            "type": "opaque",
            "dimensions": ["N_TECH_MEASUREMENT"],
            "attributes": {
                "units": { "value": "volt" },
                "_FillValue": { "value": 99999.0, "handling": "IGNORE_VALUE" }
            }
        }],
        "attr_regex": [{ "variable": "TECH_PARAM", "attribute": "units", "pattern": "v.*" }]
    }"#;
    let spec: FileSpec = serde_json::from_str(json).expect("parse spec");
    let var = spec.variable("TECH_PARAM").expect("variable");
    assert!(var.data_type.accepts(DataType::Double));
    assert_eq!(
        var.attribute("_FillValue").map(|a| a.handling),
        Some(AttrHandling::IgnoreValue)
    );
    assert_eq!(
        var.attribute("_FillValue").map(|a| a.value.render()),
        Some("99999.0".to_string())
    );
    assert!(spec.attr_regex("TECH_PARAM", "units").is_some());
}

#[test]
fn extra_dimension_pattern_restricts_names() {
    let spec = FileSpecDocument::new("argo-trajectory-spec-v3.2", FileType::Trajectory, "3.2")
        .with_dimension(SpecDimension::new("N_MEASUREMENT", 0))
        .with_variable(
            SpecVariable::new("RAW_DATA", DataType::Float, ["N_MEASUREMENT"]).with_extra_dimensions(),
        )
        .with_extra_dimension_pattern("N_VALUES[0-9]+")
        .build()
        .expect("build spec");
    assert!(spec.allows_extra_dimension("N_VALUES12"));
    assert!(!spec.allows_extra_dimension("N_OTHER"));
}

#[test]
fn memory_file_parses_dump() {
    let json = r#"{
        "file_name": "R6900001_001.nc",
        "modified_unix": 1700000000,
        "dimensions": [
            { "name": "N_PROF", "length": 2 },
            { "name": "STRING8", "length": 8 }
        ],
        "global_attributes": { "title": "Argo float vertical profile" },
        "variables": [
            { "name": "PLATFORM_NUMBER", "type": "char", "dimensions": ["N_PROF", "STRING8"],
              "attributes": { "long_name": "Float unique identifier" },
              "data": ["6900001 ", "6900001\u0000"] },
            { "name": "CYCLE_NUMBER", "type": "int", "dimensions": ["N_PROF"], "data": [1, 1] }
        ]
    }"#;
    let file = MemoryFile::from_json(json).expect("parse dump");
    assert_eq!(file.file_name(), "R6900001_001.nc");
    assert!(file.modified().is_some());
    assert_eq!(file.dimension_length("N_PROF"), Some(2));
    assert_eq!(
        file.read_string_at("PLATFORM_NUMBER", 1, NullHandling::Truncate),
        Some("6900001".to_string())
    );
    assert_eq!(
        file.read_string_at("PLATFORM_NUMBER", 1, NullHandling::Keep),
        Some("6900001\0".to_string())
    );
    assert_eq!(file.read_int_at("CYCLE_NUMBER", 0), Some(1));
    assert_eq!(file.read_ints("PLATFORM_NUMBER"), None);
    assert_eq!(
        file.global_attribute("title"),
        Some(&AttrValue::text("Argo float vertical profile"))
    );
}

#[test]
fn memory_file_rejects_wrong_record_count() {
    let json = r#"{
        "dimensions": [{ "name": "N_PROF", "length": 2 }, { "name": "STRING8", "length": 8 }],
        "variables": [
            { "name": "PLATFORM_NUMBER", "type": "char", "dimensions": ["N_PROF", "STRING8"],
              "data": ["6900001"] }
        ]
    }"#;
    let err = MemoryFile::from_json(json).expect_err("shape mismatch");
    assert!(matches!(
        err,
        ModelError::ShapeMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn memory_file_rejects_unknown_dimension() {
    let json = r#"{
        "variables": [{ "name": "PRES", "type": "float", "dimensions": ["N_LEVELS"], "data": 1.0 }]
    }"#;
    let err = MemoryFile::from_json(json).expect_err("unknown dimension");
    assert!(matches!(err, ModelError::UnknownDimension { .. }));
}

#[test]
fn memory_file_dump_round_trips_data() {
    let file = MemoryFile::new("6900001_meta.nc")
        .with_dimension("STRING16", 16)
        .with_text("DATA_TYPE", &["STRING16"], ["Argo meta-data"]);
    let json = file.to_json_pretty().expect("dump");
    let back = MemoryFile::from_json(&json).expect("parse");
    assert_eq!(
        back.read_string("DATA_TYPE", NullHandling::Truncate),
        Some("Argo meta-data".to_string())
    );
}

#[test]
fn data_type_classification() {
    assert_eq!(
        classify_data_type("B-Argo trajectory"),
        DataTypeClass::Standard(FileType::BioTrajectory)
    );
    assert!(matches!(
        classify_data_type("Argo technical"),
        DataTypeClass::Tolerated {
            file_type: FileType::Technical,
            ..
        }
    ));
    assert_eq!(classify_data_type("argo profile"), DataTypeClass::Unknown);
}

#[test]
fn file_type_parses_spec_names_and_labels() {
    assert_eq!("b_profile".parse::<FileType>(), Ok(FileType::BioProfile));
    assert_eq!("BIO_TRAJECTORY".parse::<FileType>(), Ok(FileType::BioTrajectory));
    assert!("netcdf".parse::<FileType>().is_err());
}

#[test]
fn report_serializes_status_and_phase_labels() {
    let report = FileReport::rejected_at_open("x.nc", "DATA_TYPE not in file");
    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["status"], FileStatus::Rejected.label());
    assert_eq!(json["phase"], Phase::Open.label());
    assert_eq!(json["message"], "DATA_TYPE not in file");
}
