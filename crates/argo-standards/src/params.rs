//! Configuration and technical parameter names and units.
//!
//! Parameter names in the name tables may contain placeholders such as
//! `CONFIG_<short_sensor_name>Offset` or `NUMBER_AscentSamplesDepthZone<Z>`.
//! Each templated name is compiled into an anchored regex whose named
//! capture groups correspond to the placeholders. When every placeholder has
//! a finite value list (generic reference tables, `Z` = 1..5) the template is
//! also expanded into literal names, which are looked up first.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use argo_model::{FileType, matches_date_pattern};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Result, StandardsError};
use crate::paths::deprecated_companion;
use crate::reference::{RefTable, ReferenceLookup};
use crate::table_file::{read_optional_table, read_table};

static HEX_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(0x)?[0-9a-f]+$").expect("Invalid hex regex"));

static LOGICAL_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(true|false|yes|no|1|0)$").expect("Invalid logical regex")
});

/// Capture names whose match-lists come from the bio config table columns
/// 3, 4 and 5.
const BIO_MATCH_LIST_COLUMNS: [(usize, &str); 3] =
    [(2, "shortsensorname"), (3, "param"), (4, "cyclephasename")];

/// Data type a config/tech unit implies for its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    DateTime,
    Float,
    Hex,
    Integer,
    Logical,
    String,
    Unknown,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::DateTime => "date/time",
            ValueType::Float => "float",
            ValueType::Hex => "hex",
            ValueType::Integer => "integer",
            ValueType::Logical => "logical",
            ValueType::String => "string",
            ValueType::Unknown => "unknown",
        }
    }

    /// Maps a unit-table type column; anything unrecognised is `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "date/time" => ValueType::DateTime,
            "float" => ValueType::Float,
            "hex" => ValueType::Hex,
            "integer" => ValueType::Integer,
            "logical" => ValueType::Logical,
            "string" => ValueType::String,
            _ => ValueType::Unknown,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which name tables to load besides the unit table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamTables {
    pub config: bool,
    pub tech: bool,
}

impl ParamTables {
    pub const NONE: Self = Self {
        config: false,
        tech: false,
    };
    pub const CONFIG: Self = Self {
        config: true,
        tech: false,
    };
    pub const TECH: Self = Self {
        config: false,
        tech: true,
    };

    pub fn for_file_type(file_type: FileType) -> Self {
        match file_type {
            FileType::Metadata => Self::CONFIG,
            FileType::Technical => Self::TECH,
            _ => Self::NONE,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.config && !self.tech
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

fn split_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;
    while let Some(open) = rest.find('<') {
        let Some(len) = rest[open + 1..].find('>') else {
            break;
        };
        let close = open + 1 + len;
        literal.push_str(&rest[..open]);
        if len == 0 {
            literal.push_str("<>");
        } else {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(rest[open + 1..close].to_string()));
        }
        rest = &rest[close + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

fn has_placeholder(segments: &[Segment]) -> bool {
    segments
        .iter()
        .any(|segment| matches!(segment, Segment::Placeholder(_)))
}

/// Capture-group name and regex body of a placeholder.
fn placeholder_fragment(placeholder: &str) -> (&'static str, &'static str) {
    match placeholder {
        "D" => ("D", r"\d+?"),
        "I" => ("I", r"\d+?"),
        "N" => ("N", r"\d+?"),
        "N+1" => ("N1", r"\d+?"),
        "S" => ("S", r"\d+?"),
        "SubS" => ("Subs", r"\d+?"),
        "digit" => ("digit", r"\d"),
        "int" => ("int", r"\d+?"),
        "Z" => ("Z", r"\d+?"),
        "cycle_phase_name" => ("cyclephasename", r"[A-Z][a-z]+(?:[A-Z][a-z]+)*?Phase"),
        "param" => ("param", r"[A-Z][a-z]+(?:[A-Z][a-z]+)??"),
        "PARAM" => ("PARAM", r"[A-Z]+?"),
        "short_sensor_name" => ("shortsensorname", r"[A-Z][a-z]+?|CTD"),
        _ => ("default", r"\w+"),
    }
}

/// Finite value lists used to expand templates into literal names.
#[derive(Debug, Clone, Default)]
struct PossibleValues {
    by_placeholder: HashMap<&'static str, Vec<String>>,
}

impl PossibleValues {
    fn from_lookup(lookup: &dyn ReferenceLookup) -> Self {
        let mut by_placeholder = HashMap::new();
        by_placeholder.insert(
            "short_sensor_name",
            lookup.values(RefTable::GenericShortSensorName),
        );
        by_placeholder.insert(
            "cycle_phase_name",
            lookup.values(RefTable::GenericCyclePhaseName),
        );
        by_placeholder.insert("param", lookup.values(RefTable::GenericParam));
        by_placeholder.insert("Z", (1..=5).map(|z| z.to_string()).collect());
        Self { by_placeholder }
    }

    fn get(&self, placeholder: &str) -> Option<&[String]> {
        self.by_placeholder
            .get(placeholder)
            .map(Vec::as_slice)
            .filter(|values| !values.is_empty())
    }

    /// Every concrete name of a template, with the placeholder values used.
    /// `None` when some placeholder has no finite value list.
    fn expand(&self, segments: &[Segment]) -> Option<Vec<(String, BTreeMap<String, String>)>> {
        let mut expanded = vec![(String::new(), BTreeMap::new())];
        for segment in segments {
            match segment {
                Segment::Literal(text) => {
                    for (name, _) in &mut expanded {
                        name.push_str(text);
                    }
                }
                Segment::Placeholder(placeholder) => {
                    let values = self.get(placeholder)?;
                    let mut next = Vec::with_capacity(expanded.len() * values.len());
                    for (name, binding) in expanded {
                        if let Some(bound) = binding.get(placeholder) {
                            next.push((format!("{name}{bound}"), binding));
                            continue;
                        }
                        for value in values {
                            let mut binding = binding.clone();
                            binding.insert(placeholder.clone(), value.clone());
                            next.push((format!("{name}{value}"), binding));
                        }
                    }
                    expanded = next;
                }
            }
        }
        Some(expanded)
    }
}

/// A templated parameter name compiled into an anchored regex.
#[derive(Debug, Clone)]
pub struct TemplatePattern {
    template: String,
    regex: Regex,
    match_lists: BTreeMap<String, BTreeSet<String>>,
}

impl TemplatePattern {
    pub fn compile(template: &str) -> std::result::Result<Self, regex::Error> {
        Self::from_segments(template, &split_template(template), BTreeMap::new())
    }

    fn from_segments(
        template: &str,
        segments: &[Segment],
        match_lists: BTreeMap<String, BTreeSet<String>>,
    ) -> std::result::Result<Self, regex::Error> {
        let mut pattern = String::from("^");
        let mut groups = BTreeSet::new();
        for segment in segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Placeholder(placeholder) => {
                    let (group, body) = placeholder_fragment(placeholder);
                    if groups.insert(group) {
                        pattern.push_str(&format!("(?P<{group}>{body})"));
                    } else {
                        pattern.push_str(&format!("(?:{body})"));
                    }
                }
            }
        }
        pattern.push('$');
        Ok(Self {
            template: template.to_string(),
            regex: Regex::new(&pattern)?,
            match_lists,
        })
    }

    /// The name as written in the table, placeholders included.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn as_regex(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Capture-group name → captured text, or `None` if `name` does not match.
    pub fn captures(&self, name: &str) -> Option<BTreeMap<String, String>> {
        let caps = self.regex.captures(name)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|group| {
                    caps.name(group)
                        .map(|value| (group.to_string(), value.as_str().to_string()))
                })
                .collect(),
        )
    }
}

/// How a parameter name was recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMatch {
    /// The literal name, or the template of the matching pattern.
    pub matched: String,
    pub deprecated: bool,
    /// Captured values with no match-list to compare against.
    pub unmatched: BTreeMap<String, String>,
    /// Captured values absent from their match-list.
    pub failed: BTreeMap<String, String>,
}

impl ParamMatch {
    fn literal(name: &str, deprecated: bool) -> Self {
        Self {
            matched: name.to_string(),
            deprecated,
            unmatched: BTreeMap::new(),
            failed: BTreeMap::new(),
        }
    }

    pub fn unmatched(&self, capture: &str) -> Option<&str> {
        self.unmatched.get(capture).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
struct ParamSet {
    literals: BTreeSet<String>,
    patterns: Vec<TemplatePattern>,
}

impl ParamSet {
    /// Registers a name and returns the concrete names it stands for.
    fn add(
        &mut self,
        name: &str,
        match_lists: BTreeMap<String, BTreeSet<String>>,
        values: &PossibleValues,
    ) -> std::result::Result<Vec<(String, BTreeMap<String, String>)>, regex::Error> {
        let segments = split_template(name);
        if !has_placeholder(&segments) {
            self.literals.insert(name.to_string());
            return Ok(vec![(name.to_string(), BTreeMap::new())]);
        }

        let bio_lists = !match_lists.is_empty();
        let pattern = TemplatePattern::from_segments(name, &segments, match_lists)?;
        debug!(template = name, regex = pattern.as_regex(), "add parameter regex");
        self.patterns.push(pattern);

        if bio_lists {
            return Ok(Vec::new());
        }
        let expanded = values.expand(&segments).unwrap_or_default();
        self.literals
            .extend(expanded.iter().map(|(name, _)| name.clone()));
        Ok(expanded)
    }

    fn check_regex(&self, name: &str, deprecated: bool) -> Option<ParamMatch> {
        let mut found = None;
        let mut count = 0usize;
        for pattern in &self.patterns {
            let Some(captures) = pattern.captures(name) else {
                continue;
            };
            count += 1;
            let mut unmatched = BTreeMap::new();
            let mut failed = BTreeMap::new();
            for (group, value) in captures {
                match pattern.match_lists.get(&group) {
                    None => {
                        unmatched.insert(group, value);
                    }
                    Some(list) if !list.contains(&value) => {
                        failed.insert(group, value);
                    }
                    Some(_) => {}
                }
            }
            found = Some(ParamMatch {
                matched: pattern.template.clone(),
                deprecated,
                unmatched,
                failed,
            });
        }
        if count > 1 {
            warn!(param = name, count, "parameter name matched by several templates");
        }
        found
    }
}

#[derive(Debug, Clone, Default)]
struct ParamFamily {
    active: ParamSet,
    deprecated: ParamSet,
}

impl ParamFamily {
    fn set_mut(&mut self, deprecated: bool) -> &mut ParamSet {
        if deprecated {
            &mut self.deprecated
        } else {
            &mut self.active
        }
    }

    fn find(&self, name: &str) -> Option<ParamMatch> {
        if self.active.literals.contains(name) {
            debug!(param = name, "active literal match");
            return Some(ParamMatch::literal(name, false));
        }
        if self.deprecated.literals.contains(name) {
            debug!(param = name, "deprecated literal match");
            return Some(ParamMatch::literal(name, true));
        }
        if let Some(found) = self.active.check_regex(name, false) {
            debug!(param = name, template = %found.matched, "active regex match");
            return Some(found);
        }
        if let Some(found) = self.deprecated.check_regex(name, true) {
            debug!(param = name, template = %found.matched, "deprecated regex match");
            return Some(found);
        }
        debug!(param = name, "no parameter match");
        None
    }
}

/// Config/tech parameter names and units of one format version.
#[derive(Debug, Clone, Default)]
pub struct ParamUnitRegistry {
    version: String,
    config: Option<ParamFamily>,
    tech: Option<ParamFamily>,
    units: BTreeMap<String, ValueType>,
    deprecated_units: BTreeMap<String, ValueType>,
    tech_units: BTreeMap<String, BTreeSet<String>>,
    tech_long_names: BTreeMap<String, BTreeSet<String>>,
}

/// `argo-<kind>-spec-v<version>` inside the specification directory.
pub fn param_table_path(spec_dir: &Path, kind: &str, version: &str) -> PathBuf {
    spec_dir.join(format!("argo-{kind}-spec-v{}", version.trim()))
}

fn split_name_and_unit<'a>(path: &Path, code: &'a str) -> Result<(&'a str, &'a str)> {
    match code.rfind('_') {
        Some(index) if index > 0 => Ok((&code[..index], &code[index + 1..])),
        _ => Err(StandardsError::BadlyFormedName {
            path: path.to_path_buf(),
            name: code.to_string(),
        }),
    }
}

impl ParamUnitRegistry {
    /// An empty registry; tables are added with the `add_*` methods.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Reads the requested name tables and the unit table.
    ///
    /// Primary files must exist; `.deprecated` companions are optional.
    pub fn load(
        spec_dir: &Path,
        version: &str,
        tables: ParamTables,
        lookup: &dyn ReferenceLookup,
    ) -> Result<Self> {
        let values = PossibleValues::from_lookup(lookup);
        let mut registry = Self::new(version.trim());

        if tables.config {
            let core = param_table_path(spec_dir, "core_config_names", version);
            let bio = param_table_path(spec_dir, "bio_config_names", version);
            let files = [
                (core.clone(), false, false),
                (bio.clone(), true, false),
                (deprecated_companion(&core), false, true),
                (deprecated_companion(&bio), true, true),
            ];
            registry.config = Some(ParamFamily::default());
            for (path, is_bio, deprecated) in files {
                let rows = if deprecated {
                    match read_optional_table(&path)? {
                        Some(rows) => rows,
                        None => {
                            debug!(path = %path.display(), "no deprecated config table");
                            continue;
                        }
                    }
                } else {
                    read_table(&path)?
                };
                debug!(path = %path.display(), rows = rows.len(), "parsing config parameter table");
                for row in rows {
                    registry.add_config_row(&path, &row, is_bio, deprecated, &values)?;
                }
            }
        }

        if tables.tech {
            let path = param_table_path(spec_dir, "tech_names", version);
            registry.tech = Some(ParamFamily::default());
            for row in read_table(&path)? {
                registry.add_tech_row(&path, &row, false, &values)?;
            }
            let deprecated = deprecated_companion(&path);
            if let Some(rows) = read_optional_table(&deprecated)? {
                for row in rows {
                    registry.add_tech_row(&deprecated, &row, true, &values)?;
                }
            }
        }

        let path = param_table_path(spec_dir, "tech_units", version);
        for row in read_table(&path)? {
            registry.add_unit_row(&row, false);
        }
        if let Some(rows) = read_optional_table(&deprecated_companion(&path))? {
            for row in rows {
                registry.add_unit_row(&row, true);
            }
        }

        debug!(
            version = registry.version.as_str(),
            units = registry.units.len(),
            deprecated_units = registry.deprecated_units.len(),
            "loaded parameter registry"
        );
        Ok(registry)
    }

    fn add_config_row(
        &mut self,
        path: &Path,
        row: &[String],
        is_bio: bool,
        deprecated: bool,
        values: &PossibleValues,
    ) -> Result<()> {
        let Some(code) = row.first() else {
            return Ok(());
        };
        let (name, _unit) = split_name_and_unit(path, code)?;

        let mut match_lists = BTreeMap::new();
        if is_bio {
            for (column, capture) in BIO_MATCH_LIST_COLUMNS {
                let Some(cell) = row.get(column) else {
                    continue;
                };
                let mut list: BTreeSet<String> = cell
                    .split([',', ' ', '/'])
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .collect();
                if list.is_empty() {
                    continue;
                }
                if capture == "shortsensorname" {
                    list.insert("CTD".to_string());
                }
                match_lists.insert(capture.to_string(), list);
            }
        }

        self.config
            .get_or_insert_with(ParamFamily::default)
            .set_mut(deprecated)
            .add(name, match_lists, values)
            .map_err(|source| StandardsError::Template {
                path: path.to_path_buf(),
                template: name.to_string(),
                source,
            })?;
        Ok(())
    }

    fn add_tech_row(
        &mut self,
        path: &Path,
        row: &[String],
        deprecated: bool,
        values: &PossibleValues,
    ) -> Result<()> {
        let Some(code) = row.first() else {
            return Ok(());
        };
        let (name, unit) = split_name_and_unit(path, code)?;
        let long_name = row.get(1).map(String::as_str).unwrap_or_default();
        self.insert_tech(name, unit, long_name, deprecated, values)
            .map_err(|source| StandardsError::Template {
                path: path.to_path_buf(),
                template: name.to_string(),
                source,
            })
    }

    fn insert_tech(
        &mut self,
        name: &str,
        unit: &str,
        long_name: &str,
        deprecated: bool,
        values: &PossibleValues,
    ) -> std::result::Result<(), regex::Error> {
        let expanded = self
            .tech
            .get_or_insert_with(ParamFamily::default)
            .set_mut(deprecated)
            .add(name, BTreeMap::new(), values)?;

        self.tech_units
            .entry(name.to_string())
            .or_default()
            .insert(unit.to_string());
        for (concrete, _) in &expanded {
            self.tech_units
                .entry(concrete.clone())
                .or_default()
                .insert(unit.to_string());
        }

        if long_name.is_empty() {
            return Ok(());
        }
        if !has_placeholder(&split_template(name)) {
            self.insert_long_name(name, long_name, values);
            return Ok(());
        }
        for (concrete, binding) in &expanded {
            let mut completed = long_name.to_string();
            if let Some(sensor) = binding.get("short_sensor_name") {
                completed = completed.replace("<short_sensor_name>", sensor);
            }
            if let Some(z) = binding.get("Z") {
                completed = completed.replace("<Z>", z);
            }
            self.insert_long_name(concrete, &completed, values);
        }
        Ok(())
    }

    fn insert_long_name(&mut self, name: &str, long_name: &str, values: &PossibleValues) {
        let segments = split_template(long_name);
        let names = if !has_placeholder(&segments) {
            vec![long_name.to_string()]
        } else if let Some(expanded) = values.expand(&segments) {
            expanded.into_iter().map(|(text, _)| text).collect()
        } else {
            debug!(param = name, long_name, "long name template cannot be expanded");
            return;
        };
        self.tech_long_names
            .entry(name.to_string())
            .or_default()
            .extend(names);
    }

    fn add_unit_row(&mut self, row: &[String], deprecated: bool) {
        let Some(unit) = row.first().filter(|unit| !unit.is_empty()) else {
            return;
        };
        let value_type = row
            .get(1)
            .map_or(ValueType::Unknown, |name| ValueType::from_name(name));
        self.add_unit(unit, value_type, deprecated);
    }

    /// Adds a config parameter name (without its unit suffix).
    pub fn add_config_param(
        &mut self,
        name: &str,
        match_lists: BTreeMap<String, BTreeSet<String>>,
        deprecated: bool,
        lookup: &dyn ReferenceLookup,
    ) -> std::result::Result<(), regex::Error> {
        let values = PossibleValues::from_lookup(lookup);
        self.config
            .get_or_insert_with(ParamFamily::default)
            .set_mut(deprecated)
            .add(name, match_lists, &values)?;
        Ok(())
    }

    /// Adds a technical parameter name with one authorized unit and long name.
    pub fn add_tech_param(
        &mut self,
        name: &str,
        unit: &str,
        long_name: &str,
        deprecated: bool,
        lookup: &dyn ReferenceLookup,
    ) -> std::result::Result<(), regex::Error> {
        let values = PossibleValues::from_lookup(lookup);
        self.insert_tech(name, unit, long_name, deprecated, &values)
    }

    pub fn add_unit(&mut self, unit: &str, value_type: ValueType, deprecated: bool) {
        let target = if deprecated {
            &mut self.deprecated_units
        } else {
            &mut self.units
        };
        target.insert(unit.to_string(), value_type);
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn has_config(&self) -> bool {
        self.config.is_some()
    }

    pub fn has_tech(&self) -> bool {
        self.tech.is_some()
    }

    /// Looks a config parameter name up: active literal, deprecated literal,
    /// active template, deprecated template.
    pub fn find_config_param(&self, name: &str) -> Option<ParamMatch> {
        self.config.as_ref()?.find(name)
    }

    pub fn find_tech_param(&self, name: &str) -> Option<ParamMatch> {
        self.tech.as_ref()?.find(name)
    }

    /// Units authorized for a technical parameter (literal name or template).
    pub fn tech_param_units(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.tech_units.get(name)
    }

    pub fn tech_param_long_names(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.tech_long_names.get(name)
    }

    pub fn is_config_tech_unit(&self, unit: &str) -> bool {
        self.units.contains_key(unit)
    }

    pub fn is_deprecated_config_tech_unit(&self, unit: &str) -> bool {
        self.deprecated_units.contains_key(unit)
    }

    pub fn unit_value_type(&self, unit: &str) -> Option<ValueType> {
        self.units.get(unit).copied()
    }

    /// Whether `value` is a valid setting for a parameter in `unit`. Values of
    /// unknown units are accepted.
    pub fn is_config_tech_valid_value(&self, unit: &str, value: &str) -> bool {
        let valid = match self.unit_value_type(unit) {
            None | Some(ValueType::Unknown | ValueType::String) => true,
            Some(ValueType::DateTime) => matches_date_pattern(unit, value),
            Some(ValueType::Float) => value.trim().parse::<f64>().is_ok(),
            Some(ValueType::Hex) => HEX_VALUE.is_match(value),
            Some(ValueType::Integer) => value.parse::<i32>().is_ok(),
            Some(ValueType::Logical) => LOGICAL_VALUE.is_match(value),
        };
        debug!(unit, value, valid, "config/tech value check");
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_placeholders_and_literals() {
        assert_eq!(
            split_template("CONFIG_<short_sensor_name>Zone<N>Rate"),
            vec![
                Segment::Literal("CONFIG_".to_string()),
                Segment::Placeholder("short_sensor_name".to_string()),
                Segment::Literal("Zone".to_string()),
                Segment::Placeholder("N".to_string()),
                Segment::Literal("Rate".to_string()),
            ]
        );
        assert_eq!(
            split_template("A<>B"),
            vec![Segment::Literal("A<>B".to_string())]
        );
    }

    #[test]
    fn repeated_placeholders_compile() {
        let pattern = TemplatePattern::compile("CONFIG_<N>To<N>_<unknown>").expect("compile");
        let captures = pattern.captures("CONFIG_1To2_x").expect("match");
        assert_eq!(captures.get("N").map(String::as_str), Some("1"));
        assert_eq!(captures.get("default").map(String::as_str), Some("x"));
    }

    #[test]
    fn literal_text_is_escaped() {
        let pattern = TemplatePattern::compile("CONFIG_Gain.<N>").expect("compile");
        assert!(pattern.is_match("CONFIG_Gain.3"));
        assert!(!pattern.is_match("CONFIG_Gainx3"));
    }

    #[test]
    fn expansion_binds_repeated_placeholders_once() {
        let values = PossibleValues {
            by_placeholder: HashMap::from([("Z", vec!["1".to_string(), "2".to_string()])]),
        };
        let expanded = values
            .expand(&split_template("Z<Z>x<Z>"))
            .expect("expand");
        let names: Vec<_> = expanded.into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Z1x1".to_string(), "Z2x2".to_string()]);
        assert!(values.expand(&split_template("<N>")).is_none());
    }
}
