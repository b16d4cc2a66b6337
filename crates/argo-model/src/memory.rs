//! In-memory data file.
//!
//! Used for header/data dumps produced by an external NetCDF dumper and for
//! building fixtures in tests. The dump layout is:
//!
//! ```json
//! {
//!   "file_name": "6900001_meta.nc",
//!   "modified_unix": 1700000000,
//!   "dimensions": [{ "name": "STRING16", "length": 16 }],
//!   "global_attributes": { "title": "Argo float metadata file" },
//!   "variables": [
//!     { "name": "DATA_TYPE", "type": "char", "dimensions": ["STRING16"],
//!       "attributes": { "long_name": "Data type" }, "data": "Argo meta-data" }
//!   ]
//! }
//! ```
//!
//! Char data is one string per record (a bare string for rank 0 and 1);
//! numeric data is a number or a flat row-major array.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::data::{DataDimension, DataFile, DataVariable};
use crate::error::{ModelError, Result};
use crate::spec::{AttrValue, DataType};

#[derive(Debug, Clone, PartialEq)]
pub enum VariableData {
    Text(Vec<String>),
    Numbers(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum RawData {
    Text(String),
    Number(f64),
    Texts(Vec<String>),
    Numbers(Vec<f64>),
}

impl From<RawData> for VariableData {
    fn from(raw: RawData) -> Self {
        match raw {
            RawData::Text(text) => VariableData::Text(vec![text]),
            RawData::Texts(texts) => VariableData::Text(texts),
            RawData::Number(value) => VariableData::Numbers(vec![value]),
            RawData::Numbers(values) => VariableData::Numbers(values),
        }
    }
}

impl From<VariableData> for RawData {
    fn from(data: VariableData) -> Self {
        match data {
            VariableData::Text(texts) => RawData::Texts(texts),
            VariableData::Numbers(values) => RawData::Numbers(values),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DumpVariable {
    #[serde(flatten)]
    header: DataVariable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<RawData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Dump {
    #[serde(default)]
    file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified_unix: Option<u64>,
    #[serde(default)]
    dimensions: Vec<DataDimension>,
    #[serde(default)]
    global_attributes: BTreeMap<String, AttrValue>,
    #[serde(default)]
    variables: Vec<DumpVariable>,
}

/// A data file held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFile {
    file_name: String,
    modified: Option<SystemTime>,
    dimensions: Vec<DataDimension>,
    global_attributes: BTreeMap<String, AttrValue>,
    variables: Vec<DataVariable>,
    data: HashMap<String, VariableData>,
}

impl MemoryFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    /// Parses a dump and checks that every data block fits its dimensions.
    pub fn from_json(text: &str) -> Result<Self> {
        let dump: Dump = serde_json::from_str(text)?;
        let file = Self::from(dump);
        file.check_shapes()?;
        Ok(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let dump: Dump = serde_json::from_reader(reader)?;
        let file = Self::from(dump);
        file.check_shapes()?;
        Ok(file)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_dump())?)
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn set_modified(&mut self, modified: SystemTime) {
        self.modified = Some(modified);
    }

    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
    }

    /// Adds a dimension, replacing any existing one of the same name.
    #[must_use]
    pub fn with_dimension(mut self, name: impl Into<String>, length: usize) -> Self {
        let name = name.into();
        self.dimensions.retain(|dim| dim.name != name);
        self.dimensions.push(DataDimension { name, length });
        self
    }

    #[must_use]
    pub fn with_global_attribute(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.global_attributes.insert(name.into(), value);
        self
    }

    /// Adds a variable header without data.
    #[must_use]
    pub fn with_variable(mut self, variable: DataVariable) -> Self {
        self.variables.retain(|var| var.name != variable.name);
        self.data.remove(&variable.name);
        self.variables.push(variable);
        self
    }

    /// Adds a char variable with one string per record.
    #[must_use]
    pub fn with_text<I, S>(mut self, name: &str, dimensions: &[&str], records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self = self.with_variable(DataVariable::new(
            name,
            DataType::Char,
            dimensions.iter().copied(),
        ));
        self.data.insert(
            name.to_string(),
            VariableData::Text(records.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Adds a numeric variable with flat row-major values.
    #[must_use]
    pub fn with_numbers<I>(
        mut self,
        name: &str,
        data_type: DataType,
        dimensions: &[&str],
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        self = self.with_variable(DataVariable::new(
            name,
            data_type,
            dimensions.iter().copied(),
        ));
        self.data.insert(
            name.to_string(),
            VariableData::Numbers(values.into_iter().collect()),
        );
        self
    }

    /// Sets an attribute on an existing variable; unknown variables are left alone.
    #[must_use]
    pub fn with_attribute(
        mut self,
        variable: &str,
        name: impl Into<String>,
        value: AttrValue,
    ) -> Self {
        if let Some(var) = self.variables.iter_mut().find(|var| var.name == variable) {
            var.attributes.insert(name.into(), value);
        }
        self
    }

    /// Replaces the data of an existing variable.
    #[must_use]
    pub fn with_data(mut self, variable: &str, data: VariableData) -> Self {
        if self.variables.iter().any(|var| var.name == variable) {
            self.data.insert(variable.to_string(), data);
        }
        self
    }

    #[must_use]
    pub fn without_variable(mut self, variable: &str) -> Self {
        self.variables.retain(|var| var.name != variable);
        self.data.remove(variable);
        self
    }

    #[must_use]
    pub fn without_dimension(mut self, name: &str) -> Self {
        self.dimensions.retain(|dim| dim.name != name);
        self
    }

    pub fn data(&self, variable: &str) -> Option<&VariableData> {
        self.data.get(variable)
    }

    /// Checks that every variable's dimensions exist and that its data has
    /// the number of records (char) or values (numeric) the dimensions imply.
    pub fn check_shapes(&self) -> Result<()> {
        for var in &self.variables {
            let mut lengths = Vec::with_capacity(var.dimensions.len());
            for dim in &var.dimensions {
                let length =
                    self.dimension_length(dim)
                        .ok_or_else(|| ModelError::UnknownDimension {
                            variable: var.name.clone(),
                            dimension: dim.clone(),
                        })?;
                lengths.push(length);
            }
            let Some(data) = self.data.get(&var.name) else {
                continue;
            };
            match (var.data_type, data) {
                (DataType::Char, VariableData::Text(records)) => {
                    let (leading, width) = match lengths.split_last() {
                        Some((width, leading)) => (leading.iter().product(), Some(*width)),
                        None => (1, None),
                    };
                    if records.len() != leading {
                        return Err(ModelError::ShapeMismatch {
                            variable: var.name.clone(),
                            expected: leading,
                            found: records.len(),
                        });
                    }
                    if let Some(width) = width
                        && let Some(record) = records.iter().find(|r| r.chars().count() > width)
                    {
                        return Err(ModelError::Message(format!(
                            "variable {}: string '{}' longer than {} characters",
                            var.name, record, width
                        )));
                    }
                }
                (DataType::Char, VariableData::Numbers(_)) => {
                    return Err(ModelError::Message(format!(
                        "variable {}: char variable holds numeric data",
                        var.name
                    )));
                }
                (_, VariableData::Text(_)) => {
                    return Err(ModelError::Message(format!(
                        "variable {}: {} variable holds text data",
                        var.name, var.data_type
                    )));
                }
                (_, VariableData::Numbers(values)) => {
                    let expected: usize = lengths.iter().product();
                    if values.len() != expected {
                        return Err(ModelError::ShapeMismatch {
                            variable: var.name.clone(),
                            expected,
                            found: values.len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn to_dump(&self) -> Dump {
        Dump {
            file_name: self.file_name.clone(),
            modified_unix: self
                .modified
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map(|elapsed| elapsed.as_secs()),
            dimensions: self.dimensions.clone(),
            global_attributes: self.global_attributes.clone(),
            variables: self
                .variables
                .iter()
                .map(|header| DumpVariable {
                    header: header.clone(),
                    data: self.data.get(&header.name).cloned().map(RawData::from),
                })
                .collect(),
        }
    }
}

impl From<Dump> for MemoryFile {
    fn from(dump: Dump) -> Self {
        let mut variables = Vec::with_capacity(dump.variables.len());
        let mut data = HashMap::new();
        for entry in dump.variables {
            if let Some(raw) = entry.data {
                data.insert(entry.header.name.clone(), VariableData::from(raw));
            }
            variables.push(entry.header);
        }
        Self {
            file_name: dump.file_name,
            modified: dump
                .modified_unix
                .map(|secs| UNIX_EPOCH + Duration::from_secs(secs)),
            dimensions: dump.dimensions,
            global_attributes: dump.global_attributes,
            variables,
            data,
        }
    }
}

impl DataFile for MemoryFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    fn dimensions(&self) -> &[DataDimension] {
        &self.dimensions
    }

    fn variables(&self) -> &[DataVariable] {
        &self.variables
    }

    fn global_attribute(&self, name: &str) -> Option<&AttrValue> {
        self.global_attributes.get(name)
    }

    fn raw_text(&self, variable: &str) -> Option<&[String]> {
        match self.data.get(variable)? {
            VariableData::Text(records) => Some(records),
            VariableData::Numbers(_) => None,
        }
    }

    fn raw_numbers(&self, variable: &str) -> Option<&[f64]> {
        match self.data.get(variable)? {
            VariableData::Numbers(values) => Some(values),
            VariableData::Text(_) => None,
        }
    }
}
