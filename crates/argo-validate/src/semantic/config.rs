//! Configuration missions and configuration parameter names.

use std::collections::HashSet;

use argo_model::ValidationOutcome;
use argo_standards::{ParamUnitRegistry, RefTable};
use tracing::debug;

use super::DataContext;

/// Fill value of CONFIG_MISSION_NUMBER.
const MISSING_MISSION: i32 = 99999;

/// Generic template captures checked against their reference tables, with
/// the name used in diagnostics.
const GENERIC_CAPTURES: [(&str, RefTable, &str); 3] = [
    (
        "shortsensorname",
        RefTable::GenericShortSensorName,
        "short_sensor_name",
    ),
    (
        "cyclephasename",
        RefTable::GenericCyclePhaseName,
        "cycle_phase_name",
    ),
    ("param", RefTable::GenericParam, "param"),
];

/// The first unset mission number within N_MISSIONS is reported.
pub(super) fn mission(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    let n_missions = ctx.dimension_length("N_MISSIONS");
    let missions = ctx
        .data()
        .read_ints("CONFIG_MISSION_NUMBER")
        .unwrap_or_default();
    debug!(n_missions, "config missions");

    if let Some(n) = missions
        .iter()
        .take(n_missions)
        .position(|mission| *mission == MISSING_MISSION)
    {
        outcome.add_warning(format!("CONFIG_MISSION_NUMBER: Missing at index: {}", n + 1));
    }
}

/// LAUNCH_CONFIG_PARAMETER_NAME then CONFIG_PARAMETER_NAME. Names and units
/// are reported once across both variables.
pub(super) fn params(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    let Some(registry) = ctx.file.params().filter(|params| params.has_config()) else {
        debug!("no config parameter tables for this file");
        return;
    };

    let mut checked = ConfigNameCheck {
        ctx,
        registry,
        names: HashSet::new(),
        units: HashSet::new(),
    };
    for prefix in ["LAUNCH_CONFIG_", "CONFIG_"] {
        let variable = format!("{prefix}PARAMETER_NAME");
        let n_param = ctx.dimension_length(&format!("N_{prefix}PARAM"));
        let names = ctx.trimmed_records(&variable);
        debug!(variable = variable.as_str(), n_param, "config parameter names");
        for (n, full) in names.iter().take(n_param).enumerate() {
            checked.check(&format!("{variable}[{}]", n + 1), full, outcome);
        }
    }
}

struct ConfigNameCheck<'c, 'a> {
    ctx: &'c DataContext<'a>,
    registry: &'c ParamUnitRegistry,
    names: HashSet<String>,
    units: HashSet<String>,
}

impl ConfigNameCheck<'_, '_> {
    fn check(&mut self, label: &str, full: &str, outcome: &mut ValidationOutcome) {
        let Some((param, unit)) = full.rsplit_once('_').filter(|(param, _)| !param.is_empty())
        else {
            if self.names.insert(full.to_string()) {
                outcome.add_error(format!("{label}: Incorrectly formed name '{full}'"));
            }
            debug!(label, full, "badly formed config name");
            return;
        };
        debug!(label, full, param, unit, "config name");

        if self.names.insert(param.to_string()) {
            self.name(label, param, outcome);
        }
        if self.units.insert(unit.to_string()) {
            self.unit(label, full, unit, outcome);
        }
    }

    fn name(&self, label: &str, param: &str, outcome: &mut ValidationOutcome) {
        let Some(found) = self.registry.find_config_param(param) else {
            self.ctx
                .temporary_warning(outcome, format!("{label}: Invalid name '{param}'"));
            return;
        };
        if found.deprecated {
            outcome.add_warning(format!("{label}: Deprecated name '{param}'"));
        }
        for (template, value) in &found.failed {
            self.ctx.temporary_warning(
                outcome,
                format!("{label}: Invalid template/value '{template}'/'{value}' in '{param}'"),
            );
        }
        for (capture, table, display) in GENERIC_CAPTURES {
            let Some(value) = found.unmatched(capture) else {
                continue;
            };
            let valid = self.ctx.references.contains(table, value);
            debug!(capture, value, valid, "generic template lookup");
            if !valid {
                self.ctx.temporary_warning(
                    outcome,
                    format!("{label}: Invalid {display} '{value}' in '{param}'"),
                );
            }
        }
    }

    fn unit(&self, label: &str, full: &str, unit: &str, outcome: &mut ValidationOutcome) {
        if self.registry.is_config_tech_unit(unit) {
            return;
        }
        if self.registry.is_deprecated_config_tech_unit(unit) {
            outcome.add_warning(format!("{label}: Deprecated unit '{unit}' in '{full}'"));
        } else {
            outcome.add_error(format!("{label}: Invalid unit '{unit}' in '{full}'"));
        }
    }
}
