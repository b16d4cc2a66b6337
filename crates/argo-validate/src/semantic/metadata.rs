//! Meta-data file checks.

use std::cmp::Ordering;

use argo_model::{NullHandling, ValidationOutcome, format_real};
use argo_standards::{RefTable, XrefTable};
use tracing::debug;

use super::{DataContext, battery, common, config, dates};
use crate::open::compare_versions;

/// Platform type for which the platform cross-references do not apply.
const GENERIC_PLATFORM_TYPE: &str = "FLOAT";
/// Sensor model for which the sensor cross-references do not apply.
const UNKNOWN_SENSOR_MODEL: &str = "UNKNOWN";

/// Values above this (or not positive) mean a per-cycle setting was left unset.
const PER_CYCLE_CEILING: f32 = 9999.0;

pub(super) fn check(ctx: &DataContext<'_>, check_battery: bool, outcome: &mut ValidationOutcome) {
    // 1. Dates
    dates::metadata_dates(ctx, outcome);

    if compare_versions(ctx.file.format_version(), "2.2") != Ordering::Greater {
        // 2. Pre-3.0 files: highly desirable settings only
        highly_desirable_v2(ctx, outcome);
        return;
    }

    // 2. Mandatory settings
    mandatory_v3(ctx, outcome);

    // 3. Optional settings with controlled vocabularies
    if ctx.data().has_variable("PROGRAM_NAME") {
        let value = ctx.trimmed("PROGRAM_NAME");
        ctx.check_reference(outcome, "PROGRAM_NAME", RefTable::ProgramName, &value);
    }

    // 4. Configuration missions and parameter names
    config::mission(ctx, outcome);
    config::params(ctx, outcome);

    // 5. Batteries
    if check_battery {
        battery::check(ctx, outcome);
    }
}

fn is_physical_param(ctx: &DataContext<'_>, name: &str) -> bool {
    ctx.file
        .file_spec()
        .is_some_and(|spec| spec.is_physical_param(name))
}

/// Values of a per-index variable, padded to the dimension length.
fn indexed(ctx: &DataContext<'_>, variable: &str, dimension: &str) -> Vec<String> {
    let mut records = ctx.trimmed_records(variable);
    records.resize(ctx.dimension_length(dimension), String::new());
    records
}

fn position_out_of_range(ctx: &DataContext<'_>, name: &str, limit: f64) -> Option<f64> {
    ctx.data()
        .read_double(name)
        .filter(|value| *value < -limit || *value > limit)
}

fn highly_desirable_v2(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    debug!("highly desirable settings (v2)");
    common::data_centre(ctx, outcome);
    common::platform_number(ctx, outcome);

    let direction = ctx.char_value("DIRECTION");
    if direction != "A" && direction != "D" {
        outcome.add_warning(format!("DIRECTION: '{direction}': Not A or D"));
    }

    for (name, limit) in [("LAUNCH_LATITUDE", 90.0), ("LAUNCH_LONGITUDE", 180.0)] {
        if let Some(value) = position_out_of_range(ctx, name, limit) {
            outcome.add_warning(format!("{name}: {}: Invalid", format_real(value)));
        }
    }

    for name in ["LAUNCH_DATE", "PLATFORM_MODEL", "PTT", "START_DATE", "TRANS_SYSTEM_ID"] {
        if ctx.trimmed(name).is_empty() {
            outcome.add_warning(format!("{name}: Empty"));
        }
    }

    let active_checks = [
        ("LAUNCH_QC", RefTable::QcFlag, ctx.char_value("LAUNCH_QC")),
        ("START_DATE_QC", RefTable::QcFlag, ctx.char_value("START_DATE_QC")),
        (
            "POSITIONING_SYSTEM",
            RefTable::PositioningSystem,
            ctx.trimmed("POSITIONING_SYSTEM"),
        ),
        ("TRANS_SYSTEM", RefTable::TransSystem, ctx.trimmed("TRANS_SYSTEM")),
    ];
    for (name, table, value) in active_checks {
        let entry = ctx.references.lookup(table, &value);
        if !entry.is_active() {
            outcome.add_warning(format!("{name}: '{value}' Status: {}", entry.message));
        }
    }

    for param in indexed(ctx, "PARAMETER", "N_PARAM") {
        if !is_physical_param(ctx, &param) {
            outcome.add_warning(format!("Physical parameter name: '{param}': Invalid"));
        }
    }

    let n_cycles = ctx.dimension_length("N_CYCLES");
    for name in ["CYCLE_TIME", "PARKING_PRESSURE", "DEEPEST_PRESSURE"] {
        let values = ctx.data().read_floats(name).unwrap_or_default();
        for (n, value) in values.iter().take(n_cycles).enumerate() {
            if *value > PER_CYCLE_CEILING || *value <= 0.0 {
                outcome.add_warning(format!("{name}[{}]: Not set", n + 1));
            }
        }
    }
}

fn mandatory_v3(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    debug!("mandatory settings (v3)");
    for name in [
        "CONTROLLER_BOARD_SERIAL_NO_PRIMARY",
        "CONTROLLER_BOARD_TYPE_PRIMARY",
        "DAC_FORMAT_ID",
        "FIRMWARE_VERSION",
        "FLOAT_SERIAL_NO",
        "MANUAL_VERSION",
        "PI_NAME",
        "PTT",
        "STANDARD_FORMAT_ID",
    ] {
        if ctx.trimmed(name).is_empty() {
            outcome.add_error(format!("{name}: Empty"));
        }
    }

    common::data_centre(ctx, outcome);
    common::platform_number(ctx, outcome);

    for (name, limit) in [("LAUNCH_LATITUDE", 90.0), ("LAUNCH_LONGITUDE", 180.0)] {
        if let Some(value) = position_out_of_range(ctx, name, limit) {
            outcome.add_error(format!("{name}: {}: Invalid", format_real(value)));
        }
    }

    for name in ["LAUNCH_QC", "START_DATE_QC"] {
        let flag = ctx.char_value(name);
        ctx.check_reference(outcome, name, RefTable::QcFlag, &flag);
    }

    platform(ctx, outcome);
    parameters(ctx, outcome);
    sensors(ctx, outcome);

    for (n, system) in indexed(ctx, "POSITIONING_SYSTEM", "N_POSITIONING_SYSTEM")
        .iter()
        .enumerate()
    {
        let label = format!("POSITIONING_SYSTEM[{}]", n + 1);
        ctx.check_reference(outcome, &label, RefTable::PositioningSystem, system);
    }

    for (n, system) in indexed(ctx, "TRANS_SYSTEM", "N_TRANS_SYSTEM")
        .iter()
        .enumerate()
    {
        let label = format!("TRANS_SYSTEM[{}]", n + 1);
        ctx.check_reference(outcome, &label, RefTable::TransSystem, system);
    }
    for (n, id) in indexed(ctx, "TRANS_SYSTEM_ID", "N_TRANS_SYSTEM")
        .iter()
        .enumerate()
    {
        if id.is_empty() {
            outcome.add_error(format!("TRANS_SYSTEM_ID[{}]: Empty", n + 1));
        }
    }
}

/// Platform family, maker, type and WMO instrument type, with their
/// cross-references.
fn platform(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    let family = ctx.trimmed("PLATFORM_FAMILY");
    ctx.check_reference(outcome, "PLATFORM_FAMILY", RefTable::PlatformFamily, &family);

    let maker = ctx.trimmed("PLATFORM_MAKER");
    let maker_valid = ctx
        .check_reference(outcome, "PLATFORM_MAKER", RefTable::PlatformMaker, &maker)
        .is_some();

    let platform_type = ctx.trimmed("PLATFORM_TYPE");
    let type_valid = ctx
        .check_reference(outcome, "PLATFORM_TYPE", RefTable::PlatformType, &platform_type)
        .is_some();
    let cross_check = type_valid && platform_type != GENERIC_PLATFORM_TYPE;

    if cross_check
        && maker_valid
        && !ctx
            .references
            .xref_contains(XrefTable::PlatformTypeMaker, &platform_type, &maker)
    {
        outcome.add_error(format!(
            "PLATFORM_TYPE/PLATFORM_MAKER: Inconsistent: '{platform_type}'/'{maker}'"
        ));
    }

    let wmo = ctx.trimmed("WMO_INST_TYPE");
    let wmo_valid = match wmo.parse::<i32>() {
        Ok(code) => {
            let entry = ctx.references.lookup(RefTable::WmoInstType, &code.to_string());
            if !entry.valid {
                outcome.add_error(format!("WMO_INST_TYPE: '{wmo}' Status: {}", entry.message));
            } else if entry.deprecated {
                outcome.add_warning(format!("WMO_INST_TYPE: '{wmo}' Status: {}", entry.message));
            }
            entry.valid
        }
        Err(_) => {
            outcome.add_error(format!("WMO_INST_TYPE: '{wmo}' Invalid. Must be integer."));
            false
        }
    };

    if cross_check
        && wmo_valid
        && !ctx
            .references
            .xref_contains(XrefTable::PlatformTypeWmoInst, &platform_type, &wmo)
    {
        outcome.add_error(format!(
            "PLATFORM_TYPE/WMO_INST_TYPE: Inconsistent: '{platform_type}'/'{wmo}'"
        ));
    }
}

/// Per N_PARAM: physical name and the calibration fields.
fn parameters(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    for (n, param) in indexed(ctx, "PARAMETER", "N_PARAM").iter().enumerate() {
        if !is_physical_param(ctx, param) {
            outcome.add_error(format!("PARAMETER[{}]: '{param}': Invalid", n + 1));
        }
    }

    for name in [
        "PARAMETER_UNITS",
        "PREDEPLOYMENT_CALIB_COEFFICIENT",
        "PREDEPLOYMENT_CALIB_EQUATION",
    ] {
        for (n, value) in indexed(ctx, name, "N_PARAM").iter().enumerate() {
            if value.is_empty() {
                outcome.add_error(format!("{name}[{}]: Empty", n + 1));
            }
        }
    }

    // PARAMETER_SENSOR is only empty when it holds no characters at all.
    let n_param = ctx.dimension_length("N_PARAM");
    let mut sensors = ctx
        .data()
        .read_strings("PARAMETER_SENSOR", NullHandling::Truncate)
        .unwrap_or_default();
    sensors.resize(n_param, String::new());
    for (n, sensor) in sensors.iter().enumerate() {
        if sensor.is_empty() {
            outcome.add_error(format!("PARAMETER_SENSOR[{}]: Empty", n + 1));
        }
    }
}

/// Per N_SENSOR: sensor, maker and model, cross-referenced through the
/// canonical first column of each entry.
fn sensors(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    let sensor_names = indexed(ctx, "SENSOR", "N_SENSOR");
    let makers = indexed(ctx, "SENSOR_MAKER", "N_SENSOR");
    let models = indexed(ctx, "SENSOR_MODEL", "N_SENSOR");

    for (n, ((sensor, maker), model)) in sensor_names.iter().zip(&makers).zip(&models).enumerate() {
        let index = n + 1;
        let sensor_entry =
            ctx.check_reference(outcome, &format!("SENSOR[{index}]"), RefTable::Sensor, sensor);
        let maker_entry = ctx.check_reference(
            outcome,
            &format!("SENSOR_MAKER[{index}]"),
            RefTable::SensorMaker,
            maker,
        );
        let model_entry = ctx.check_reference(
            outcome,
            &format!("SENSOR_MODEL[{index}]"),
            RefTable::SensorModel,
            model,
        );

        let Some(model_entry) = model_entry.filter(|_| model != UNKNOWN_SENSOR_MODEL) else {
            continue;
        };
        let canonical_model = model_entry.column(1).unwrap_or(model);

        if let Some(maker_entry) = maker_entry {
            let canonical_maker = maker_entry.column(1).unwrap_or(maker);
            if !ctx.references.xref_contains(
                XrefTable::SensorModelMaker,
                canonical_model,
                canonical_maker,
            ) {
                outcome.add_error(format!(
                    "SENSOR_MODEL/SENSOR_MAKER[{index}]: Inconsistent: '{model}'/'{maker}'"
                ));
            }
        }

        if let Some(sensor_entry) = sensor_entry {
            let canonical_sensor = sensor_entry.column(1).unwrap_or(sensor);
            if !ctx.references.xref_contains(
                XrefTable::SensorModelSensor,
                canonical_model,
                canonical_sensor,
            ) {
                outcome.add_error(format!(
                    "SENSOR_MODEL/SENSOR[{index}]: Inconsistent: '{model}'/'{sensor}'"
                ));
            }
        }
    }
}
