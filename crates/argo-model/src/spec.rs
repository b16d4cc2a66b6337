//! Structural schema of one Argo file type and format version.
//!
//! A [`FileSpecDocument`] is the serialised form read from disk. It is
//! compiled into a [`FileSpec`] which owns the lookup indices and the compiled
//! attribute-regex exceptions. A `FileSpec` is immutable once built and is
//! shared across validation sessions.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::error::{ModelError, Result};
use crate::file_type::FileType;

/// NetCDF variable types. `Opaque` only appears in specifications and means
/// "float or double".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Opaque,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Char => "char",
            DataType::Byte => "byte",
            DataType::Short => "short",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Opaque => "opaque",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Char | DataType::Opaque)
    }

    /// Whether a data variable of type `data` satisfies this declared type.
    pub fn accepts(&self, data: DataType) -> bool {
        *self == data
            || (*self == DataType::Opaque && matches!(data, DataType::Float | DataType::Double))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute value, either in a specification or in a data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Real(f64),
}

impl AttrValue {
    pub fn text(value: impl Into<String>) -> Self {
        AttrValue::Text(value.into())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, AttrValue::Text(_))
    }

    pub fn is_numeric(&self) -> bool {
        !self.is_text()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// String form used when comparing a data value to a declared value.
    pub fn render(&self) -> String {
        match self {
            AttrValue::Text(text) => text.clone(),
            AttrValue::Int(value) => value.to_string(),
            AttrValue::Real(value) => format_real(*value),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Renders a floating-point value the way Argo diagnostics print numbers:
/// integral values keep a trailing `.0`, very large or very small magnitudes
/// use an `E` exponent.
pub fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if value == 0.0 || (1.0e-3..1.0e7).contains(&magnitude) {
        let plain = format!("{value}");
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let scientific = format!("{value:e}");
        match scientific.split_once('e') {
            Some((mantissa, exponent)) if mantissa.contains('.') => {
                format!("{mantissa}E{exponent}")
            }
            Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
            None => scientific,
        }
    }
}

/// How the value of a declared attribute is compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttrHandling {
    #[default]
    Normal,
    /// Must exist; any value accepted.
    IgnoreValue,
    /// May be absent; any value accepted.
    IgnoreCompletely,
    /// Must not be present.
    NotAllowed,
}

impl AttrHandling {
    pub fn skips_value(&self) -> bool {
        matches!(self, AttrHandling::IgnoreValue | AttrHandling::IgnoreCompletely)
    }

    pub fn requires_presence(&self) -> bool {
        matches!(self, AttrHandling::Normal | AttrHandling::IgnoreValue)
    }

    fn is_normal(&self) -> bool {
        *self == AttrHandling::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecAttribute {
    pub value: AttrValue,
    #[serde(default, skip_serializing_if = "AttrHandling::is_normal")]
    pub handling: AttrHandling,
}

impl SpecAttribute {
    pub fn new(value: AttrValue) -> Self {
        Self {
            value,
            handling: AttrHandling::Normal,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(AttrValue::text(value))
    }

    #[must_use]
    pub fn with_handling(mut self, handling: AttrHandling) -> Self {
        self.handling = handling;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecDimension {
    pub name: String,
    /// Declared length; `<= 0` means unconstrained or UNLIMITED.
    #[serde(default)]
    pub length: i64,
    #[serde(default)]
    pub optional: bool,
    /// Non-empty for an alternate dimension: the names a data file may use
    /// in its place. The alternate itself never appears in data files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<String>,
    #[serde(default)]
    pub extra: bool,
}

impl SpecDimension {
    pub fn new(name: impl Into<String>, length: i64) -> Self {
        Self {
            name: name.into(),
            length,
            optional: false,
            alternates: Vec::new(),
            extra: false,
        }
    }

    /// An extra dimension registered for a single validation pass.
    pub fn extra(name: impl Into<String>, length: i64) -> Self {
        Self {
            extra: true,
            ..Self::new(name, length)
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_alternates<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternates = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_alternate(&self) -> bool {
        !self.alternates.is_empty()
    }

    pub fn allows_alternate_name(&self, name: &str) -> bool {
        self.alternates.iter().any(|alt| alt == name)
    }

    pub fn is_constrained(&self) -> bool {
        self.length > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, SpecAttribute>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub alternate_dimensions: bool,
    #[serde(default)]
    pub extra_dimensions: bool,
}

impl SpecVariable {
    pub fn new<I, S>(name: impl Into<String>, data_type: DataType, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            data_type,
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            attributes: BTreeMap::new(),
            optional: false,
            alternate_dimensions: false,
            extra_dimensions: false,
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: SpecAttribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_alternate_dimensions(mut self) -> Self {
        self.alternate_dimensions = true;
        self
    }

    #[must_use]
    pub fn with_extra_dimensions(mut self) -> Self {
        self.extra_dimensions = true;
        self
    }

    /// Rank without any extra dimensions.
    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimensions_string(&self) -> String {
        self.dimensions.join(" ")
    }

    pub fn attribute(&self, name: &str) -> Option<&SpecAttribute> {
        self.attributes.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecGlobalAttribute {
    pub name: String,
    pub value: AttrValue,
    #[serde(default)]
    pub handling: AttrHandling,
}

/// An accepted alternative for a declared attribute value.
#[derive(Debug, Clone)]
pub struct AttrRegex {
    source: String,
    pattern: Regex,
    warn: bool,
}

impl AttrRegex {
    /// Compiles `pattern` as a whole-value match.
    pub fn new(pattern: &str, warn: bool) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            source: pattern.to_string(),
            pattern: Regex::new(&format!("^(?:{pattern})$"))?,
            warn,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }

    /// Whether a matching value is still reported as non-standard.
    pub fn warn(&self) -> bool {
        self.warn
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrRegexDef {
    /// Empty for a global attribute.
    #[serde(default)]
    pub variable: String,
    pub attribute: String,
    pub pattern: String,
    #[serde(default)]
    pub warn: bool,
}

/// Serialised form of a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSpecDocument {
    pub name: String,
    pub file_type: FileType,
    pub version: String,
    #[serde(default)]
    pub dimensions: Vec<SpecDimension>,
    #[serde(default)]
    pub variables: Vec<SpecVariable>,
    #[serde(default)]
    pub global_attributes: Vec<SpecGlobalAttribute>,
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub attr_regex: Vec<AttrRegexDef>,
    #[serde(default)]
    pub physical_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_dimension_pattern: Option<String>,
}

impl FileSpecDocument {
    pub fn new(name: impl Into<String>, file_type: FileType, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_type,
            version: version.into(),
            dimensions: Vec::new(),
            variables: Vec::new(),
            global_attributes: Vec::new(),
            groups: BTreeMap::new(),
            attr_regex: Vec::new(),
            physical_params: Vec::new(),
            extra_dimension_pattern: None,
        }
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: SpecDimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    #[must_use]
    pub fn with_variable(mut self, variable: SpecVariable) -> Self {
        self.variables.push(variable);
        self
    }

    #[must_use]
    pub fn with_global_attribute(
        mut self,
        name: impl Into<String>,
        attribute: SpecAttribute,
    ) -> Self {
        self.global_attributes.push(SpecGlobalAttribute {
            name: name.into(),
            value: attribute.value,
            handling: attribute.handling,
        });
        self
    }

    #[must_use]
    pub fn with_group<I, S>(mut self, group: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(group.into(), members.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_attr_regex(
        mut self,
        variable: impl Into<String>,
        attribute: impl Into<String>,
        pattern: impl Into<String>,
        warn: bool,
    ) -> Self {
        self.attr_regex.push(AttrRegexDef {
            variable: variable.into(),
            attribute: attribute.into(),
            pattern: pattern.into(),
            warn,
        });
        self
    }

    #[must_use]
    pub fn with_physical_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.physical_params.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_extra_dimension_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.extra_dimension_pattern = Some(pattern.into());
        self
    }

    pub fn build(self) -> Result<FileSpec> {
        FileSpec::try_from(self)
    }
}

/// Compiled specification with lookup indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FileSpecDocument", into = "FileSpecDocument")]
pub struct FileSpec {
    document: FileSpecDocument,
    dimension_index: HashMap<String, usize>,
    variable_index: HashMap<String, usize>,
    member_group: HashMap<String, String>,
    groups: BTreeMap<String, BTreeSet<String>>,
    regexes: HashMap<(String, String), AttrRegex>,
    physical_params: BTreeSet<String>,
    extra_dimension_pattern: Option<Regex>,
}

impl TryFrom<FileSpecDocument> for FileSpec {
    type Error = ModelError;

    fn try_from(document: FileSpecDocument) -> Result<Self> {
        let invalid = |message: String| ModelError::InvalidSpec {
            spec: document.name.clone(),
            message,
        };

        let mut dimension_index = HashMap::with_capacity(document.dimensions.len());
        for (idx, dim) in document.dimensions.iter().enumerate() {
            if dimension_index.insert(dim.name.clone(), idx).is_some() {
                return Err(invalid(format!("dimension '{}' declared twice", dim.name)));
            }
        }

        let mut variable_index = HashMap::with_capacity(document.variables.len());
        for (idx, var) in document.variables.iter().enumerate() {
            if variable_index.insert(var.name.clone(), idx).is_some() {
                return Err(invalid(format!("variable '{}' declared twice", var.name)));
            }
            if let Some(missing) = var
                .dimensions
                .iter()
                .find(|dim| !dimension_index.contains_key(dim.as_str()))
            {
                return Err(invalid(format!(
                    "variable '{}' uses undefined dimension '{}'",
                    var.name, missing
                )));
            }
        }

        let mut member_group = HashMap::new();
        let mut groups = BTreeMap::new();
        for (group, members) in &document.groups {
            let mut set = BTreeSet::new();
            for member in members {
                if !dimension_index.contains_key(member) && !variable_index.contains_key(member) {
                    return Err(invalid(format!(
                        "group '{}' member '{}' is neither a dimension nor a variable",
                        group, member
                    )));
                }
                if let Some(previous) = member_group.insert(member.clone(), group.clone()) {
                    return Err(invalid(format!(
                        "'{}' belongs to groups '{}' and '{}'",
                        member, previous, group
                    )));
                }
                set.insert(member.clone());
            }
            groups.insert(group.clone(), set);
        }

        let mut regexes = HashMap::with_capacity(document.attr_regex.len());
        for def in &document.attr_regex {
            let regex =
                AttrRegex::new(&def.pattern, def.warn).map_err(|source| ModelError::InvalidRegex {
                    variable: def.variable.clone(),
                    attribute: def.attribute.clone(),
                    source,
                })?;
            regexes.insert((def.variable.clone(), def.attribute.clone()), regex);
        }

        let extra_dimension_pattern = document
            .extra_dimension_pattern
            .as_deref()
            .map(|pattern| Regex::new(&format!("^(?:{pattern})$")))
            .transpose()
            .map_err(|source| ModelError::InvalidRegex {
                variable: String::new(),
                attribute: "extra_dimension_pattern".to_string(),
                source,
            })?;

        let physical_params = document.physical_params.iter().cloned().collect();

        Ok(Self {
            document,
            dimension_index,
            variable_index,
            member_group,
            groups,
            regexes,
            physical_params,
            extra_dimension_pattern,
        })
    }
}

impl From<FileSpec> for FileSpecDocument {
    fn from(spec: FileSpec) -> Self {
        spec.document
    }
}

impl FileSpec {
    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn file_type(&self) -> FileType {
        self.document.file_type
    }

    pub fn version(&self) -> &str {
        &self.document.version
    }

    pub fn document(&self) -> &FileSpecDocument {
        &self.document
    }

    pub fn dimensions(&self) -> &[SpecDimension] {
        &self.document.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&SpecDimension> {
        self.dimension_index
            .get(name)
            .map(|&idx| &self.document.dimensions[idx])
    }

    pub fn variables(&self) -> &[SpecVariable] {
        &self.document.variables
    }

    pub fn variable(&self, name: &str) -> Option<&SpecVariable> {
        self.variable_index
            .get(name)
            .map(|&idx| &self.document.variables[idx])
    }

    pub fn global_attributes(&self) -> &[SpecGlobalAttribute] {
        &self.document.global_attributes
    }

    /// The parameter group `name` belongs to, if any.
    pub fn group_of(&self, name: &str) -> Option<&str> {
        self.member_group.get(name).map(String::as_str)
    }

    pub fn group_members(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.groups
            .iter()
            .map(|(name, members)| (name.as_str(), members))
    }

    /// Regex exception for `variable:attribute`; pass `""` as the variable
    /// for a global attribute.
    pub fn attr_regex(&self, variable: &str, attribute: &str) -> Option<&AttrRegex> {
        self.regexes
            .get(&(variable.to_string(), attribute.to_string()))
    }

    /// Optional dimensions and variables, including every group member.
    pub fn is_optional(&self, name: &str) -> bool {
        self.dimension(name).is_some_and(|dim| dim.optional)
            || self.variable(name).is_some_and(|var| var.optional)
            || self.member_group.contains_key(name)
    }

    pub fn supports_extra_dimensions(&self) -> bool {
        self.document
            .variables
            .iter()
            .any(|var| var.extra_dimensions)
    }

    /// Whether an undeclared data-file dimension may be taken as an extra
    /// dimension.
    pub fn allows_extra_dimension(&self, name: &str) -> bool {
        self.supports_extra_dimensions()
            && self
                .extra_dimension_pattern
                .as_ref()
                .is_none_or(|pattern| pattern.is_match(name))
    }

    pub fn is_physical_param(&self, name: &str) -> bool {
        self.physical_params.contains(name)
    }
}
