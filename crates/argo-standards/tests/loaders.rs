use std::fs;
use std::path::{Path, PathBuf};

use argo_model::FileType;
use argo_standards::{
    ParamTables, ParamUnitRegistry, RefTable, ReferenceLookup, ReferenceTables, SpecCache,
    StandardsError, StandardsRegistry, XrefTable, load_file_spec, spec_file_name,
};

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

fn write_reference_tables(dir: &Path) {
    write(
        &dir.join("PLATFORM_TYPE"),
        b"// platform types\nAPEX|Teledyne Webb Research APEX\nARVOR|nke ARVOR\nFLOAT|generic float\n",
    );
    write(&dir.join("PLATFORM_TYPE.deprecated"), b"PALACE|use APEX\n");
    write(&dir.join("PLATFORM_MAKER"), b"TWR\nNKE\n");
    write(
        &dir.join("PLATFORM_TYPExPLATFORM_MAKER"),
        b"APEX|TWR\nARVOR|NKE\n",
    );
    write(
        &dir.join("GENERIC_TEMPLATE_short_sensor_name"),
        b"Ctd\nOptode\n",
    );
    write(&dir.join("dac_centres"), b"coriolis|IF|VL\naoml|AO\n");
}

fn write_param_tables(spec_dir: &Path) {
    write(
        &spec_dir.join("argo-core_config_names-spec-v3.1"),
        b"// core config names\nCONFIG_CycleTime_hours|Cycle time\nCONFIG_<short_sensor_name>Gain_dimensionless|Gain\nCONFIG_ParkPressure<N>_dbar|Park\n",
    );
    write(
        &spec_dir.join("argo-core_config_names-spec-v3.1.deprecated"),
        b"CONFIG_OldTime_hours|Old\n",
    );
    write(
        &spec_dir.join("argo-bio_config_names-spec-v3.1"),
        b"CONFIG_<short_sensor_name><param>Offset_counts|Offset|Optode, Ecopuck|Doxy/Chla|\n",
    );
    write(
        &spec_dir.join("argo-tech_names-spec-v3.1"),
        b"VOLTAGE_Battery_volts|Battery voltage\nVOLTAGE_Battery_mvolts|Battery voltage\nPRES_<short_sensor_name>Offset_dbar|<short_sensor_name> pressure offset\nNUMBER_Samples<N>_count|Samples in zone\n",
    );
    write(
        &spec_dir.join("argo-tech_units-spec-v3.1"),
        b"hours|integer\ndbar|float\ndimensionless|float\ncounts|integer\nvolts|float\nmvolts|float\ncount|integer\nhex|hex\nlogical|logical\nYYYYMMDD|date/time\nmystery\n",
    );
    write(
        &spec_dir.join("argo-tech_units-spec-v3.1.deprecated"),
        b"minutes|integer\n",
    );
}

#[test]
fn reference_tables_load_active_deprecated_and_xrefs() {
    let dir = unique_temp_dir("ref");
    write_reference_tables(&dir);

    let tables = ReferenceTables::load(&dir).expect("load reference tables");

    let apex = tables.lookup(RefTable::PlatformType, "APEX");
    assert!(apex.is_active());
    assert_eq!(apex.column(2), Some("Teledyne Webb Research APEX"));

    let palace = tables.lookup(RefTable::PlatformType, " PALACE ");
    assert!(palace.valid && palace.deprecated);
    assert_eq!(palace.message, "use APEX");

    let unknown = tables.lookup(RefTable::PlatformType, "SOLO");
    assert!(!unknown.valid);
    assert_eq!(unknown.message, "Invalid");

    assert!(tables.xref_contains(XrefTable::PlatformTypeMaker, "APEX", "TWR"));
    assert!(!tables.xref_contains(XrefTable::PlatformTypeMaker, "APEX", "NKE"));

    assert!(tables.is_dac("coriolis"));
    assert_eq!(
        tables.dac_centres("coriolis"),
        Some(["IF".to_string(), "VL".to_string()].as_slice())
    );
    assert!(tables.is_any_centre("AO"));
    assert!(!tables.is_any_centre("XX"));

    // Tables without a file are empty rather than an error.
    assert!(tables.values(RefTable::SensorModel).is_empty());
}

#[test]
fn reference_tables_require_directory() {
    let dir = unique_temp_dir("missing-ref");
    let err = ReferenceTables::load(&dir).expect_err("missing directory");
    assert!(matches!(err, StandardsError::Io { .. }));
}

#[test]
fn config_params_resolve_literals_templates_and_match_lists() {
    let spec_dir = unique_temp_dir("config");
    write_param_tables(&spec_dir);
    let lookup = ReferenceTables::new()
        .with_values(RefTable::GenericShortSensorName, ["Ctd", "Optode"])
        .with_values(RefTable::GenericParam, ["Doxy"]);

    let registry = ParamUnitRegistry::load(&spec_dir, "3.1", ParamTables::CONFIG, &lookup)
        .expect("load registry");
    assert!(registry.has_config());
    assert!(!registry.has_tech());

    let literal = registry
        .find_config_param("CONFIG_CycleTime")
        .expect("literal");
    assert!(!literal.deprecated);
    assert!(literal.unmatched.is_empty());

    let expanded = registry
        .find_config_param("CONFIG_OptodeGain")
        .expect("expanded literal");
    assert_eq!(expanded.matched, "CONFIG_OptodeGain");

    let deprecated = registry
        .find_config_param("CONFIG_OldTime")
        .expect("deprecated literal");
    assert!(deprecated.deprecated);

    let regex = registry
        .find_config_param("CONFIG_ParkPressure12")
        .expect("regex");
    assert_eq!(regex.matched, "CONFIG_ParkPressure<N>");
    assert_eq!(regex.unmatched("N"), Some("12"));

    let bio = registry
        .find_config_param("CONFIG_EcopuckChlaOffset")
        .expect("bio regex");
    assert!(bio.failed.is_empty());

    let failed = registry
        .find_config_param("CONFIG_SunaNitrateOffset")
        .expect("bio regex with failed lists");
    assert_eq!(
        failed.failed.get("shortsensorname").map(String::as_str),
        Some("Suna")
    );
    assert_eq!(failed.failed.get("param").map(String::as_str), Some("Nitrate"));

    assert!(registry.find_config_param("CONFIG_Unknown").is_none());
    assert!(registry.find_tech_param("VOLTAGE_Battery").is_none());
}

#[test]
fn tech_params_authorize_units_and_long_names() {
    let spec_dir = unique_temp_dir("tech");
    write_param_tables(&spec_dir);
    let lookup = ReferenceTables::new().with_values(RefTable::GenericShortSensorName, ["Ctd"]);

    let registry = ParamUnitRegistry::load(&spec_dir, "3.1", ParamTables::TECH, &lookup)
        .expect("load registry");

    let units = registry
        .tech_param_units("VOLTAGE_Battery")
        .expect("units");
    assert!(units.contains("volts") && units.contains("mvolts"));

    assert!(registry.find_tech_param("PRES_CtdOffset").is_some());
    assert_eq!(
        registry
            .tech_param_long_names("PRES_CtdOffset")
            .map(|names| names.iter().cloned().collect::<Vec<_>>()),
        Some(vec!["Ctd pressure offset".to_string()])
    );

    let zone = registry
        .find_tech_param("NUMBER_Samples3")
        .expect("regex tech param");
    assert_eq!(zone.matched, "NUMBER_Samples<N>");
    assert!(
        registry
            .tech_param_units(&zone.matched)
            .is_some_and(|units| units.contains("count"))
    );
}

#[test]
fn unit_table_drives_value_checks() {
    let spec_dir = unique_temp_dir("units");
    write_param_tables(&spec_dir);
    let registry = ParamUnitRegistry::load(
        &spec_dir,
        "3.1",
        ParamTables::NONE,
        &ReferenceTables::new(),
    )
    .expect("load registry");

    assert!(registry.is_config_tech_unit("dbar"));
    assert!(!registry.is_config_tech_unit("minutes"));
    assert!(registry.is_deprecated_config_tech_unit("minutes"));

    assert!(registry.is_config_tech_valid_value("hours", "12"));
    assert!(!registry.is_config_tech_valid_value("hours", "12.5"));
    assert!(registry.is_config_tech_valid_value("dbar", "1000.5"));
    assert!(!registry.is_config_tech_valid_value("dbar", "deep"));
    assert!(registry.is_config_tech_valid_value("hex", "0x1F"));
    assert!(!registry.is_config_tech_valid_value("hex", "0xZZ"));
    assert!(registry.is_config_tech_valid_value("logical", "Yes"));
    assert!(!registry.is_config_tech_valid_value("logical", "maybe"));
    assert!(registry.is_config_tech_valid_value("YYYYMMDD", "20240131"));
    assert!(!registry.is_config_tech_valid_value("YYYYMMDD", "20241331"));
    assert!(registry.is_config_tech_valid_value("mystery", "anything"));
    assert!(registry.is_config_tech_valid_value("not-a-unit", "anything"));
}

#[test]
fn missing_primary_param_table_is_io_error() {
    let spec_dir = unique_temp_dir("no-tech");
    write(&spec_dir.join("argo-tech_units-spec-v3.1"), b"dbar|float\n");
    let err = ParamUnitRegistry::load(&spec_dir, "3.1", ParamTables::TECH, &ReferenceTables::new())
        .expect_err("missing tech names");
    assert!(matches!(err, StandardsError::Io { .. }));
}

#[test]
fn badly_formed_param_name_is_rejected() {
    let spec_dir = unique_temp_dir("bad-name");
    write_param_tables(&spec_dir);
    write(
        &spec_dir.join("argo-core_config_names-spec-v3.1"),
        b"_hours|no name\n",
    );
    let err = ParamUnitRegistry::load(&spec_dir, "3.1", ParamTables::CONFIG, &ReferenceTables::new())
        .expect_err("badly formed");
    insta::assert_snapshot!(
        err.to_string().replace(&spec_dir.display().to_string(), "<dir>"),
        @"badly formed parameter name '_hours' in <dir>/argo-core_config_names-spec-v3.1"
    );
}

const META_SPEC: &str = r#"{
    "name": "argo-metadata-spec-v3.1",
    "file_type": "METADATA",
    "version": "3.1",
    "dimensions": [{ "name": "STRING16", "length": 16 }],
    "variables": [{ "name": "DATA_TYPE", "type": "char", "dimensions": ["STRING16"] }]
}"#;

#[test]
fn spec_loader_reads_json_and_reports_missing_versions() {
    let spec_dir = unique_temp_dir("spec");
    assert_eq!(
        spec_file_name(FileType::Metadata, " 3.1 "),
        "argo-metadata-spec-v3.1.json"
    );
    write(
        &spec_dir.join(spec_file_name(FileType::Metadata, "3.1")),
        META_SPEC.as_bytes(),
    );

    let spec = load_file_spec(&spec_dir, FileType::Metadata, "3.1").expect("load spec");
    assert_eq!(spec.name(), "argo-metadata-spec-v3.1");
    assert!(spec.variable("DATA_TYPE").is_some());

    let err = load_file_spec(&spec_dir, FileType::Metadata, "2.2").expect_err("missing");
    assert!(err.is_not_found());

    let err = load_file_spec(&spec_dir, FileType::Profile, "3.1").expect_err("missing");
    assert!(err.is_not_found());
}

#[test]
fn spec_loader_rejects_mismatched_file_type() {
    let spec_dir = unique_temp_dir("spec-type");
    write(
        &spec_dir.join(spec_file_name(FileType::Profile, "3.1")),
        META_SPEC.as_bytes(),
    );
    let err = load_file_spec(&spec_dir, FileType::Profile, "3.1").expect_err("wrong type");
    assert!(matches!(err, StandardsError::Spec { .. }));
}

#[test]
fn cache_builds_each_key_once() {
    let spec_dir = unique_temp_dir("cache");
    write_param_tables(&spec_dir);
    write(
        &spec_dir.join(spec_file_name(FileType::Metadata, "3.1")),
        META_SPEC.as_bytes(),
    );
    write_reference_tables(&spec_dir.join("ref"));

    let registry = StandardsRegistry::open(&spec_dir, None).expect("open registry");
    let cache = SpecCache::new();
    assert!(cache.is_empty());

    let first = cache
        .get_or_load(&registry, FileType::Metadata, "3.1")
        .expect("first load");
    let second = cache
        .get_or_load(&registry, FileType::Metadata, " 3.1")
        .expect("second load");
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert!(first.params.as_ref().is_some_and(ParamUnitRegistry::has_config));
    assert_eq!(cache.len(), 1);

    assert!(
        cache
            .get_or_load(&registry, FileType::Profile, "3.1")
            .is_err()
    );
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
