//! Read access to an opened Argo data file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::spec::{AttrValue, DataType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDimension {
    pub name: String,
    pub length: usize,
}

/// Header information of one variable in a data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl DataVariable {
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
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimensions_string(&self) -> String {
        self.dimensions.join(" ")
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}

/// What string readers do with embedded NUL characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullHandling {
    /// Cut each string at its first NUL.
    #[default]
    Truncate,
    /// Return the raw characters, NULs included.
    Keep,
}

impl NullHandling {
    pub fn apply(&self, raw: &str) -> String {
        match self {
            NullHandling::Truncate => raw.split('\0').next().unwrap_or_default().to_string(),
            NullHandling::Keep => raw.to_string(),
        }
    }
}

/// An opened data file.
///
/// Implementors provide the header and two raw readers; the typed readers are
/// derived from them. Every reader returns `None` when the variable is absent
/// or has the wrong kind of content.
pub trait DataFile {
    /// File name as received (no directory part).
    fn file_name(&self) -> &str;

    /// Last modification time of the underlying file, when known.
    fn modified(&self) -> Option<SystemTime>;

    fn dimensions(&self) -> &[DataDimension];

    fn variables(&self) -> &[DataVariable];

    fn global_attribute(&self, name: &str) -> Option<&AttrValue>;

    /// Raw records of a char variable: one string per index of the leading
    /// dimensions (a single record for rank 0 and 1).
    fn raw_text(&self, variable: &str) -> Option<&[String]>;

    /// Values of a numeric variable, flattened in row-major order.
    fn raw_numbers(&self, variable: &str) -> Option<&[f64]>;

    fn dimension(&self, name: &str) -> Option<&DataDimension> {
        self.dimensions().iter().find(|dim| dim.name == name)
    }

    fn dimension_length(&self, name: &str) -> Option<usize> {
        self.dimension(name).map(|dim| dim.length)
    }

    fn variable(&self, name: &str) -> Option<&DataVariable> {
        self.variables().iter().find(|var| var.name == name)
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }

    fn read_strings(&self, variable: &str, nulls: NullHandling) -> Option<Vec<String>> {
        self.raw_text(variable)
            .map(|records| records.iter().map(|raw| nulls.apply(raw)).collect())
    }

    /// First record of a char variable.
    fn read_string(&self, variable: &str, nulls: NullHandling) -> Option<String> {
        self.read_string_at(variable, 0, nulls)
    }

    fn read_string_at(&self, variable: &str, index: usize, nulls: NullHandling) -> Option<String> {
        self.raw_text(variable)
            .and_then(|records| records.get(index))
            .map(|raw| nulls.apply(raw))
    }

    /// First character of a scalar char variable.
    fn read_char(&self, variable: &str) -> Option<char> {
        self.raw_text(variable)
            .and_then(|records| records.first())
            .and_then(|raw| raw.chars().next())
    }

    fn read_doubles(&self, variable: &str) -> Option<Vec<f64>> {
        self.raw_numbers(variable).map(<[f64]>::to_vec)
    }

    fn read_double(&self, variable: &str) -> Option<f64> {
        self.raw_numbers(variable)
            .and_then(|values| values.first().copied())
    }

    fn read_floats(&self, variable: &str) -> Option<Vec<f32>> {
        self.raw_numbers(variable)
            .map(|values| values.iter().map(|&v| v as f32).collect())
    }

    fn read_ints(&self, variable: &str) -> Option<Vec<i32>> {
        self.raw_numbers(variable)
            .map(|values| values.iter().map(|&v| v as i32).collect())
    }

    fn read_int_at(&self, variable: &str, index: usize) -> Option<i32> {
        self.read_ints(variable)
            .and_then(|values| values.get(index).copied())
    }
}
