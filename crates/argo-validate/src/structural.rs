//! Format verification: the data file against its specification.
//!
//! Steps, in order, each accumulating into one outcome:
//!
//! 1. data dimensions against the specification (undeclared ones may be
//!    taken as extra dimensions)
//! 2. data variables: type, dimensions, attributes
//! 3. specification dimensions present in the data
//! 4. specification variables and their required attributes present
//! 5. parameter-group completeness
//! 6. global attributes
//!
//! Extra dimensions live in the check itself, so they vanish when it returns
//! and never leak into the shared specification.

use std::collections::{BTreeSet, HashMap, HashSet};

use argo_model::{
    AttrHandling, AttrValue, DataDimension, DataFile, DataVariable, FileSpec, FileType,
    SpecAttribute, SpecDimension, SpecVariable, ValidationOutcome,
};
use argo_standards::ParamUnitRegistry;
use tracing::{debug, info, warn};

use crate::open::ArgoFile;

/// Message recorded when a file is checked without a specification.
pub const NO_SPEC_MESSAGE: &str = "ERROR: File specification not opened for this file";

/// Runs format verification. Never fails: every finding lands in the outcome.
pub fn verify_format(file: &ArgoFile) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::new();
    let Some(spec) = file.file_spec() else {
        info!(file = file.file_name(), "file specification not opened");
        outcome.add_error(NO_SPEC_MESSAGE);
        return outcome;
    };

    let mut check = FormatCheck {
        data: file.data(),
        spec,
        tech_params: match file.file_type() {
            FileType::Technical => file.params().filter(|params| params.has_tech()),
            _ => None,
        },
        file: file.file_name(),
        extra: HashMap::new(),
        observed: HashSet::new(),
        observed_groups: BTreeSet::new(),
        outcome,
    };

    debug!("compare data dimensions to spec");
    check.file_dimensions();
    debug!("compare data variables to spec");
    check.file_variables();
    debug!("compare spec dimensions to data");
    check.spec_dimensions_present();
    debug!("compare spec variables to data");
    check.spec_variables_present();
    debug!("check reported groups");
    check.group_completeness();
    debug!("compare spec global attributes to data");
    check.global_attributes();

    debug!(
        extra_dimensions = check.extra.len(),
        errors = check.outcome.error_count(),
        warnings = check.outcome.warning_count(),
        "format verification completed"
    );
    check.outcome
}

struct FormatCheck<'a> {
    data: &'a dyn DataFile,
    spec: &'a FileSpec,
    tech_params: Option<&'a ParamUnitRegistry>,
    file: &'a str,
    /// Extra dimensions registered during this pass only.
    extra: HashMap<String, SpecDimension>,
    observed: HashSet<String>,
    observed_groups: BTreeSet<String>,
    outcome: ValidationOutcome,
}

impl FormatCheck<'_> {
    fn temporary_warning(&mut self, message: String) {
        warn!(file = self.file, "TEMP WARNING: {message}");
        self.outcome.add_temporary_warning(message);
    }

    fn observe(&mut self, name: &str) {
        self.observed.insert(name.to_string());
        if let Some(group) = self.spec.group_of(name) {
            self.observed_groups.insert(group.to_string());
        }
    }

    // ------------------------------------------------------------------
    // Step 1
    // ------------------------------------------------------------------

    fn file_dimensions(&mut self) {
        let data = self.data;
        for dim in data.dimensions() {
            match self.spec.dimension(&dim.name) {
                None => {
                    self.observed.insert(dim.name.clone());
                    self.register_extra_dimension(dim);
                }
                Some(spec_dim) => {
                    if spec_dim.is_constrained()
                        && usize::try_from(spec_dim.length).ok() != Some(dim.length)
                    {
                        self.outcome.add_error(format!(
                            "dimension: {}: Definitions differ\n\tSpecification = '{}'\n\tData File     = '{}'",
                            dim.name, spec_dim.length, dim.length
                        ));
                        info!(
                            dimension = dim.name.as_str(),
                            "format error: dimension value mismatch"
                        );
                    }
                    self.observe(&dim.name);
                }
            }
        }
    }

    fn register_extra_dimension(&mut self, dim: &DataDimension) {
        if self.spec.allows_extra_dimension(&dim.name) {
            let length = i64::try_from(dim.length).unwrap_or(i64::MAX);
            self.extra
                .insert(dim.name.clone(), SpecDimension::extra(&dim.name, length));
            debug!(dimension = dim.name.as_str(), length = dim.length, "extra dimension");
        } else {
            self.outcome.add_error(format!(
                "dimension: {}: not defined in specification '{}'",
                dim.name,
                self.spec.name()
            ));
            info!(dimension = dim.name.as_str(), "format error: dimension not in spec");
        }
    }

    // ------------------------------------------------------------------
    // Step 2
    // ------------------------------------------------------------------

    fn file_variables(&mut self) {
        let (data, spec) = (self.data, self.spec);
        for var in data.variables() {
            self.observe(&var.name);
            debug!(variable = var.name.as_str(), "data var");

            let Some(spec_var) = spec.variable(&var.name) else {
                self.outcome.add_error(format!(
                    "variable: {}: not defined in specification '{}'",
                    var.name,
                    self.spec.name()
                ));
                info!(variable = var.name.as_str(), "format error: variable not in spec");
                continue;
            };

            if self.variable_type(var, spec_var) && self.variable_dimensions(var, spec_var) {
                self.variable_attributes(var, spec_var);
            }
        }
    }

    fn variable_type(&mut self, var: &DataVariable, spec_var: &SpecVariable) -> bool {
        if spec_var.data_type.accepts(var.data_type) {
            return true;
        }
        self.outcome.add_error(format!(
            "variable: {}: Definitions differ\n\tSpecification type = '{}'\n\tData File type     = '{}'",
            var.name, spec_var.data_type, var.data_type
        ));
        info!(variable = var.name.as_str(), "format error: data type mismatch");
        false
    }

    fn variable_dimensions(&mut self, var: &DataVariable, spec_var: &SpecVariable) -> bool {
        let spec_rank = spec_var.rank();
        let pass = if var.rank() < spec_rank {
            false
        } else if var.dimensions == spec_var.dimensions {
            true
        } else if !(spec_var.alternate_dimensions || spec_var.extra_dimensions) {
            false
        } else {
            var.dimensions.iter().enumerate().all(|(n, name)| {
                if n < spec_rank {
                    let expected = &spec_var.dimensions[n];
                    name == expected
                        || self
                            .spec
                            .dimension(expected)
                            .is_some_and(|dim| dim.allows_alternate_name(name))
                } else {
                    self.extra.get(name).is_some_and(|dim| dim.extra)
                }
            })
        };

        debug!(
            variable = var.name.as_str(),
            pass,
            spec_rank,
            data_rank = var.rank(),
            "dimension check"
        );
        if !pass {
            let suffix = if spec_var.extra_dimensions {
                " (+ extra-dimensions)"
            } else {
                ""
            };
            self.outcome.add_error(format!(
                "variable: {}: Definitions differ\n\tSpecification dimensions = '{}{}'\n\tData File dimensions     = '{}'",
                var.name,
                spec_var.dimensions_string(),
                suffix,
                var.dimensions_string()
            ));
            info!(variable = var.name.as_str(), "format error: dimensions mismatch");
        }
        pass
    }

    fn variable_attributes(&mut self, var: &DataVariable, spec_var: &SpecVariable) {
        let tech_match = self.tech_params.and_then(|params| {
            params
                .find_tech_param(&var.name)
                .map(|found| (params, found.matched))
        });

        for (name, value) in &var.attributes {
            let Some(spec_attr) = spec_var.attribute(name) else {
                // extra attributes are allowed
                debug!(
                    variable = var.name.as_str(),
                    attribute = name.as_str(),
                    "extra attribute (allowed)"
                );
                continue;
            };

            if spec_attr.handling == AttrHandling::NotAllowed {
                self.temporary_warning(format!(
                    "attribute: {}:{}: Attribute is not allowed.",
                    var.name, name
                ));
                continue;
            }

            if !self.attribute_type(&var.name, name, value, spec_attr) {
                continue;
            }

            match (&tech_match, name.as_str(), value) {
                (Some((params, matched)), "units" | "long_name", AttrValue::Text(text)) => {
                    self.tech_param_attribute(&var.name, name, text, params, matched);
                }
                _ => {
                    if !spec_attr.handling.skips_value() {
                        self.attribute_value(&var.name, name, value, spec_attr);
                    }
                }
            }
        }
    }

    fn attribute_type(
        &mut self,
        var: &str,
        name: &str,
        value: &AttrValue,
        spec_attr: &SpecAttribute,
    ) -> bool {
        let expected = if spec_attr.value.is_text() {
            "string"
        } else {
            "numeric"
        };
        if value.is_text() == spec_attr.value.is_text() {
            return true;
        }
        self.temporary_warning(format!(
            "attribute: {var}:{name}: Incorrect attribute value type. Must be {expected}"
        ));
        false
    }

    fn attribute_value(
        &mut self,
        var: &str,
        name: &str,
        value: &AttrValue,
        spec_attr: &SpecAttribute,
    ) {
        let spec_value = spec_attr.value.render();
        let data_value = value.render();
        if spec_value == data_value {
            return;
        }

        match self.spec.attr_regex(var, name) {
            None => {
                self.outcome.add_error(format!(
                    "attribute: {var}:{name}: Definitions differ \n\tSpecification = '{spec_value}'\n\tData File     = '{data_value}'"
                ));
                info!(
                    variable = var,
                    attribute = name,
                    "format error: attribute mismatch (no regex)"
                );
            }
            Some(regex) if !regex.is_match(&data_value) => {
                self.outcome.add_error(format!(
                    "attribute: {var}:{name}: Definitions differ \n\tSpecification = '{}' (regex)\n\tData File     = '{data_value}'",
                    regex.as_str()
                ));
                info!(
                    variable = var,
                    attribute = name,
                    regex = regex.as_str(),
                    "format error: attribute regex mismatch"
                );
            }
            Some(regex) if regex.warn() => {
                self.outcome.add_warning(format!(
                    "attribute: {var}:{name}: Accepted; not standard value\n\tSpecification     = '{spec_value}'\n\tException allowed = '{}' (regex)\n\tData File         = '{data_value}'",
                    regex.as_str()
                ));
                debug!(variable = var, attribute = name, "regex match (WARN)");
            }
            Some(_) => {
                debug!(variable = var, attribute = name, "regex match (NO WARN)");
            }
        }
    }

    /// Technical parameters accept any of their authorized units and long
    /// names instead of the single value in the specification.
    fn tech_param_attribute(
        &mut self,
        var: &str,
        name: &str,
        value: &str,
        params: &ParamUnitRegistry,
        matched: &str,
    ) {
        if name == "units" {
            let authorized = params
                .tech_param_units(matched)
                .is_some_and(|units| units.contains(value));
            if !authorized
                && !params.is_config_tech_unit(value)
                && !params.is_deprecated_config_tech_unit(value)
            {
                self.outcome.add_error(format!(
                    "attribute: {var}:{name}: Definitions differ \n\tSpecification = See argo-tech_units-spec units list\n\tData File     = '{value}'"
                ));
            }
        } else {
            let long_names = params
                .tech_param_long_names(var)
                .or_else(|| params.tech_param_long_names(matched));
            if long_names.is_some_and(|names| !names.contains(value)) {
                self.outcome.add_error(format!(
                    "attribute: {var}:{name}: Definitions differ \n\tSpecification = See argo-tech_names-spec list, definition column\n\tData File     = '{value}'"
                ));
            }
        }
    }

    // ------------------------------------------------------------------
    // Steps 3 and 4
    // ------------------------------------------------------------------

    fn spec_dimensions_present(&mut self) {
        for dim in self.spec.dimensions() {
            if self.data.dimension(&dim.name).is_some() {
                continue;
            }
            if self.spec.is_optional(&dim.name) {
                debug!(
                    dimension = dim.name.as_str(),
                    "optional dimension not in data file"
                );
            } else if dim.is_alternate() {
                debug!(
                    dimension = dim.name.as_str(),
                    "alternate dimension not in data file"
                );
            } else {
                self.outcome
                    .add_error(format!("dimension: {}: not defined in data file", dim.name));
                info!(
                    dimension = dim.name.as_str(),
                    "format error: dimension not in data file"
                );
            }
        }
    }

    fn spec_variables_present(&mut self) {
        for spec_var in self.spec.variables() {
            let Some(var) = self.data.variable(&spec_var.name) else {
                if self.spec.is_optional(&spec_var.name) {
                    debug!(
                        variable = spec_var.name.as_str(),
                        "optional variable not in data file"
                    );
                } else {
                    self.outcome.add_error(format!(
                        "variable: {}: not defined in data file",
                        spec_var.name
                    ));
                    info!(
                        variable = spec_var.name.as_str(),
                        "format error: variable not in data file"
                    );
                }
                continue;
            };

            for (name, spec_attr) in &spec_var.attributes {
                if spec_attr.handling.requires_presence() && var.attribute(name).is_none() {
                    self.outcome.add_error(format!(
                        "attribute: '{}:{}' not defined in data file",
                        spec_var.name, name
                    ));
                    info!(
                        variable = spec_var.name.as_str(),
                        attribute = name.as_str(),
                        "format error: attribute not in data file"
                    );
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Step 5
    // ------------------------------------------------------------------

    fn group_completeness(&mut self) {
        for group in &self.observed_groups {
            let Some(members) = self.spec.group_members(group) else {
                continue;
            };
            let missing: Vec<&String> = members
                .iter()
                .filter(|member| !self.observed.contains(member.as_str()))
                .collect();
            if missing.is_empty() {
                continue;
            }

            let required: String = members.iter().map(|member| format!("'{member}' ")).collect();
            let missing: String = missing.iter().map(|member| format!("'{member}' ")).collect();
            self.outcome.add_error(format!(
                "Parameter group {group}: Variables are missing for this group\n\tRequired variables: {required}\n\tMissing variables:  {missing}"
            ));
            info!(
                group = group.as_str(),
                "format error: group members missing from data file"
            );
        }
    }

    // ------------------------------------------------------------------
    // Step 6
    // ------------------------------------------------------------------

    fn global_attributes(&mut self) {
        let (data, spec) = (self.data, self.spec);
        for spec_attr in spec.global_attributes() {
            let name = spec_attr.name.as_str();
            let Some(value) = data.global_attribute(name) else {
                if spec_attr.handling.requires_presence() {
                    self.temporary_warning(format!(
                        "global attribute: {name}: not defined in data file"
                    ));
                }
                continue;
            };

            if spec_attr.handling == AttrHandling::NotAllowed {
                self.temporary_warning(format!(
                    "global attribute: {name}: Attribute is not allowed."
                ));
                continue;
            }

            let AttrValue::Text(data_value) = value else {
                self.temporary_warning(format!(
                    "global attribute: {name}: not a \"string valued\" attribute"
                ));
                continue;
            };
            if spec_attr.handling.skips_value() {
                continue;
            }

            let spec_value = spec_attr.value.render();
            if *data_value == spec_value {
                continue;
            }
            match spec.attr_regex("", name) {
                None => self.temporary_warning(format!(
                    "global attribute: {name}: Definitions differ\n\tSpecification = '{spec_value}'\n\tData File     = '{data_value}'"
                )),
                Some(regex) if !regex.is_match(data_value) => self.temporary_warning(format!(
                    "global attribute: {name}: Definitions differ\n\tSpecification = '{}' (regex)\n\tData File     = '{data_value}'",
                    regex.as_str()
                )),
                Some(regex) if regex.warn() => {
                    self.outcome.add_warning(format!(
                        "global attribute: {name}: Accepted; not standard value\n\tSpecification     = '{spec_value}'\n\tException allowed = '{}' (regex)\n\tData File         = '{data_value}'",
                        regex.as_str()
                    ));
                    debug!(attribute = name, "global regex match (WARN)");
                }
                Some(_) => debug!(attribute = name, "global regex match (NO WARN)"),
            }
        }
    }
}
