//! Controlled-vocabulary reference tables.
//!
//! Each [`RefTable`] is a pipe-separated file named after the table (for
//! example `PLATFORM_TYPE`) whose first column is the accepted value; further
//! columns are descriptive. An optional `<name>.deprecated` companion lists
//! values that are still accepted with a warning (second column: a note).
//! Each [`XrefTable`] is a file of `left|right` pairs. `dac_centres` maps a
//! DAC name to its DATA_CENTRE codes (`aoml|AO|...`).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, StandardsError};
use crate::paths::deprecated_companion;
use crate::table_file::read_optional_table;

/// File holding the DAC name → DATA_CENTRE codes map.
pub const DAC_CENTRES_FILE: &str = "dac_centres";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefTable {
    BatteryPacksStyle,
    BatteryPacksType,
    BatteryTypeManufacturer,
    BatteryTypeType,
    GenericCyclePhaseName,
    GenericParam,
    GenericShortSensorName,
    PlatformFamily,
    PlatformMaker,
    PlatformType,
    PositioningSystem,
    ProgramName,
    QcFlag,
    Sensor,
    SensorMaker,
    SensorModel,
    TransSystem,
    WmoInstType,
}

impl RefTable {
    pub const ALL: [RefTable; 18] = [
        RefTable::BatteryPacksStyle,
        RefTable::BatteryPacksType,
        RefTable::BatteryTypeManufacturer,
        RefTable::BatteryTypeType,
        RefTable::GenericCyclePhaseName,
        RefTable::GenericParam,
        RefTable::GenericShortSensorName,
        RefTable::PlatformFamily,
        RefTable::PlatformMaker,
        RefTable::PlatformType,
        RefTable::PositioningSystem,
        RefTable::ProgramName,
        RefTable::QcFlag,
        RefTable::Sensor,
        RefTable::SensorMaker,
        RefTable::SensorModel,
        RefTable::TransSystem,
        RefTable::WmoInstType,
    ];

    /// Table identifier, also the file name under the reference directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefTable::BatteryPacksStyle => "BATTERY_PACKS_style",
            RefTable::BatteryPacksType => "BATTERY_PACKS_type",
            RefTable::BatteryTypeManufacturer => "BATTERY_TYPE_manufacturer",
            RefTable::BatteryTypeType => "BATTERY_TYPE_type",
            RefTable::GenericCyclePhaseName => "GENERIC_TEMPLATE_cycle_phase_name",
            RefTable::GenericParam => "GENERIC_TEMPLATE_param",
            RefTable::GenericShortSensorName => "GENERIC_TEMPLATE_short_sensor_name",
            RefTable::PlatformFamily => "PLATFORM_FAMILY",
            RefTable::PlatformMaker => "PLATFORM_MAKER",
            RefTable::PlatformType => "PLATFORM_TYPE",
            RefTable::PositioningSystem => "POSITIONING_SYSTEM",
            RefTable::ProgramName => "PROGRAM_NAME",
            RefTable::QcFlag => "QC_FLAG",
            RefTable::Sensor => "SENSOR",
            RefTable::SensorMaker => "SENSOR_MAKER",
            RefTable::SensorModel => "SENSOR_MODEL",
            RefTable::TransSystem => "TRANS_SYSTEM",
            RefTable::WmoInstType => "WMO_INST_TYPE",
        }
    }
}

impl fmt::Display for RefTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-reference tables of accepted pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum XrefTable {
    PlatformTypeMaker,
    PlatformTypeWmoInst,
    SensorModelSensor,
    SensorModelMaker,
}

impl XrefTable {
    pub const ALL: [XrefTable; 4] = [
        XrefTable::PlatformTypeMaker,
        XrefTable::PlatformTypeWmoInst,
        XrefTable::SensorModelSensor,
        XrefTable::SensorModelMaker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            XrefTable::PlatformTypeMaker => "PLATFORM_TYPExPLATFORM_MAKER",
            XrefTable::PlatformTypeWmoInst => "PLATFORM_TYPExWMO_INST",
            XrefTable::SensorModelSensor => "SENSOR_MODELxSENSOR",
            XrefTable::SensorModelMaker => "SENSOR_MODELxSENSOR_MAKER",
        }
    }
}

impl fmt::Display for XrefTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of looking a value up in a reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// Known value, active or deprecated.
    pub valid: bool,
    pub deprecated: bool,
    /// `Valid`, `Invalid`, or the deprecation note.
    pub message: String,
    /// The table row the value matched; empty when invalid.
    pub columns: Vec<String>,
}

impl RefEntry {
    fn active(columns: Vec<String>) -> Self {
        Self {
            valid: true,
            deprecated: false,
            message: "Valid".to_string(),
            columns,
        }
    }

    fn deprecated(columns: Vec<String>) -> Self {
        let message = columns
            .get(1)
            .filter(|note| !note.is_empty())
            .cloned()
            .unwrap_or_else(|| "Deprecated".to_string());
        Self {
            valid: true,
            deprecated: true,
            message,
            columns,
        }
    }

    fn invalid() -> Self {
        Self {
            valid: false,
            deprecated: false,
            message: "Invalid".to_string(),
            columns: Vec::new(),
        }
    }

    /// 1-based column of the matched row.
    pub fn column(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|idx| self.columns.get(idx))
            .map(String::as_str)
    }

    pub fn is_active(&self) -> bool {
        self.valid && !self.deprecated
    }
}

/// Read access to the reference vocabularies.
pub trait ReferenceLookup: Send + Sync {
    fn lookup(&self, table: RefTable, value: &str) -> RefEntry;

    fn xref_contains(&self, table: XrefTable, left: &str, right: &str) -> bool;

    /// Active values of a table.
    fn values(&self, table: RefTable) -> Vec<String>;

    /// DATA_CENTRE codes of a DAC; `None` for an unknown DAC.
    fn dac_centres(&self, dac: &str) -> Option<&[String]>;

    /// Whether `code` is a DATA_CENTRE code of any DAC.
    fn is_any_centre(&self, code: &str) -> bool;

    /// Whether `value` is known (active or deprecated).
    fn contains(&self, table: RefTable, value: &str) -> bool {
        self.lookup(table, value).valid
    }

    fn is_dac(&self, dac: &str) -> bool {
        self.dac_centres(dac).is_some()
    }
}

#[derive(Debug, Clone, Default)]
struct TableData {
    active: BTreeMap<String, Vec<String>>,
    deprecated: BTreeMap<String, Vec<String>>,
}

/// In-memory reference tables, loaded from a directory or built in code.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    tables: HashMap<RefTable, TableData>,
    xrefs: HashMap<XrefTable, BTreeSet<(String, String)>>,
    dac_centres: BTreeMap<String, Vec<String>>,
}

impl ReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every table from `dir`. A missing table file leaves that table
    /// empty; a missing directory is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        std::fs::metadata(dir).map_err(|e| StandardsError::io(dir, e))?;

        let mut tables = Self::new();
        for table in RefTable::ALL {
            let path = dir.join(table.as_str());
            match read_optional_table(&path)? {
                Some(rows) => {
                    for row in rows {
                        tables.insert_row(table, row, false);
                    }
                }
                None => warn!(table = %table, path = %path.display(), "reference table missing"),
            }
            if let Some(rows) = read_optional_table(&deprecated_companion(&path))? {
                for row in rows {
                    tables.insert_row(table, row, true);
                }
            }
        }

        for table in XrefTable::ALL {
            let path = dir.join(table.as_str());
            match read_optional_table(&path)? {
                Some(rows) => {
                    let pairs = tables.xrefs.entry(table).or_default();
                    for row in rows {
                        if let [left, right, ..] = row.as_slice() {
                            pairs.insert((left.clone(), right.clone()));
                        }
                    }
                }
                None => warn!(table = %table, path = %path.display(), "cross-reference table missing"),
            }
        }

        let path = dir.join(DAC_CENTRES_FILE);
        match read_optional_table(&path)? {
            Some(rows) => {
                for mut row in rows {
                    if row.is_empty() {
                        continue;
                    }
                    let dac = row.remove(0);
                    row.retain(|code| !code.is_empty());
                    tables.dac_centres.entry(dac).or_default().extend(row);
                }
            }
            None => warn!(path = %path.display(), "DAC centre table missing"),
        }

        debug!(
            dir = %dir.display(),
            tables = tables.tables.len(),
            xrefs = tables.xrefs.len(),
            dacs = tables.dac_centres.len(),
            "loaded reference tables"
        );
        Ok(tables)
    }

    fn insert_row(&mut self, table: RefTable, row: Vec<String>, deprecated: bool) {
        let Some(key) = row.first().filter(|key| !key.is_empty()).cloned() else {
            return;
        };
        let data = self.tables.entry(table).or_default();
        if deprecated {
            data.deprecated.insert(key, row);
        } else {
            data.active.insert(key, row);
        }
    }

    /// Adds active values (single-column rows).
    #[must_use]
    pub fn with_values<I, S>(mut self, table: RefTable, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.insert_row(table, vec![value.into()], false);
        }
        self
    }

    /// Adds one active row; the first column is the value.
    #[must_use]
    pub fn with_row<I, S>(mut self, table: RefTable, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_row(table, columns.into_iter().map(Into::into).collect(), false);
        self
    }

    #[must_use]
    pub fn with_deprecated(
        mut self,
        table: RefTable,
        value: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        self.insert_row(table, vec![value.into(), note.into()], true);
        self
    }

    #[must_use]
    pub fn with_xref(
        mut self,
        table: XrefTable,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.xrefs
            .entry(table)
            .or_default()
            .insert((left.into(), right.into()));
        self
    }

    #[must_use]
    pub fn with_dac<I, S>(mut self, dac: impl Into<String>, centres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dac_centres
            .entry(dac.into())
            .or_default()
            .extend(centres.into_iter().map(Into::into));
        self
    }

    pub fn dacs(&self) -> impl Iterator<Item = &str> {
        self.dac_centres.keys().map(String::as_str)
    }
}

impl ReferenceLookup for ReferenceTables {
    fn lookup(&self, table: RefTable, value: &str) -> RefEntry {
        let Some(data) = self.tables.get(&table) else {
            return RefEntry::invalid();
        };
        let value = value.trim();
        if let Some(row) = data.active.get(value) {
            return RefEntry::active(row.clone());
        }
        if let Some(row) = data.deprecated.get(value) {
            return RefEntry::deprecated(row.clone());
        }
        RefEntry::invalid()
    }

    fn xref_contains(&self, table: XrefTable, left: &str, right: &str) -> bool {
        self.xrefs.get(&table).is_some_and(|pairs| {
            pairs.contains(&(left.trim().to_string(), right.trim().to_string()))
        })
    }

    fn values(&self, table: RefTable) -> Vec<String> {
        self.tables
            .get(&table)
            .map(|data| data.active.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn dac_centres(&self, dac: &str) -> Option<&[String]> {
        self.dac_centres.get(dac).map(Vec::as_slice)
    }

    fn is_any_centre(&self, code: &str) -> bool {
        self.dac_centres
            .values()
            .any(|codes| codes.iter().any(|c| c == code))
    }
}
