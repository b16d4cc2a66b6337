//! Data validation: field-level business rules run after a successful format
//! verification.
//!
//! Checks are independent; each appends to the same outcome and none stops
//! the sequence.

mod battery;
mod common;
mod config;
mod dates;
mod metadata;
pub mod nulls;

use argo_model::{DataFile, FileType, NullHandling, ValidationOutcome};
use argo_standards::{RefEntry, RefTable, ReferenceLookup};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::open::ArgoFile;

pub use common::is_valid_platform_number;

/// Everything the data checks read besides the outcome they write.
pub struct DataContext<'a> {
    pub file: &'a ArgoFile,
    pub references: &'a dyn ReferenceLookup,
    /// The DAC owning the file, already checked against the reference tables.
    pub dac: Option<&'a str>,
    /// GDAC receipt time: the modification time of the file, when known.
    pub file_time: Option<NaiveDateTime>,
}

impl<'a> DataContext<'a> {
    pub fn new(
        file: &'a ArgoFile,
        references: &'a dyn ReferenceLookup,
        dac: Option<&'a str>,
    ) -> Self {
        let file_time = file
            .data()
            .modified()
            .map(|time| DateTime::<Utc>::from(time).naive_utc());
        Self {
            file,
            references,
            dac,
            file_time,
        }
    }

    #[must_use]
    pub fn with_file_time(mut self, file_time: Option<NaiveDateTime>) -> Self {
        self.file_time = file_time;
        self
    }

    fn data(&self) -> &'a dyn DataFile {
        self.file.data()
    }

    /// First record of a char variable; empty when absent.
    fn string(&self, name: &str) -> String {
        self.data()
            .read_string(name, NullHandling::Truncate)
            .unwrap_or_default()
    }

    fn trimmed(&self, name: &str) -> String {
        self.string(name).trim().to_string()
    }

    /// Every record of a char variable, trimmed; empty when absent.
    fn trimmed_records(&self, name: &str) -> Vec<String> {
        self.data()
            .read_strings(name, NullHandling::Truncate)
            .unwrap_or_default()
            .into_iter()
            .map(|record| record.trim().to_string())
            .collect()
    }

    /// Records labelled the way diagnostics name them: `NAME` for a single
    /// string, `NAME[n]` (1-based) when the variable has leading dimensions.
    fn labelled_records(&self, name: &str) -> Vec<(String, String)> {
        let Some(var) = self.data().variable(name) else {
            return Vec::new();
        };
        let records = self.trimmed_records(name);
        if var.rank() < 2 {
            return records
                .into_iter()
                .take(1)
                .map(|value| (name.to_string(), value))
                .collect();
        }
        records
            .into_iter()
            .enumerate()
            .map(|(n, value)| (format!("{}[{}]", name, n + 1), value))
            .collect()
    }

    /// Single char value as a string; empty when absent.
    fn char_value(&self, name: &str) -> String {
        self.data()
            .read_char(name)
            .map(String::from)
            .unwrap_or_default()
    }

    fn dimension_length(&self, name: &str) -> usize {
        self.data().dimension_length(name).unwrap_or(0)
    }

    fn temporary_warning(&self, outcome: &mut ValidationOutcome, message: String) {
        warn!(
            dac = self.dac.unwrap_or("unk"),
            file = self.file.file_name(),
            "TEMP WARNING: {message}"
        );
        outcome.add_temporary_warning(message);
    }

    /// Looks `value` up in `table`: unknown is an error, deprecated a
    /// warning. Returns the entry when the value is known.
    fn check_reference(
        &self,
        outcome: &mut ValidationOutcome,
        label: &str,
        table: RefTable,
        value: &str,
    ) -> Option<RefEntry> {
        let entry = self.references.lookup(table, value);
        debug!(
            label,
            value,
            valid = entry.valid,
            deprecated = entry.deprecated,
            "reference lookup"
        );
        if !entry.valid {
            outcome.add_error(format!("{label}: '{value}' Status: {}", entry.message));
            return None;
        }
        if entry.deprecated {
            outcome.add_warning(format!("{label}: '{value}' Status: {}", entry.message));
        }
        Some(entry)
    }
}

/// Checks the DAC given for a run. An empty DAC means none.
///
/// Returns the refusal message for an unknown DAC.
pub fn check_dac<'d>(
    references: &dyn ReferenceLookup,
    dac: Option<&'d str>,
) -> Result<Option<&'d str>, String> {
    match dac.map(str::trim).filter(|dac| !dac.is_empty()) {
        None => Ok(None),
        Some(dac) if references.is_dac(dac) => Ok(Some(dac)),
        Some(dac) => Err(format!("Unknown DAC name = '{dac}'")),
    }
}

/// Runs the data checks for the file's type.
pub fn validate_data(ctx: &DataContext<'_>, check_battery: bool) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::new();
    match ctx.file.file_type() {
        FileType::Metadata => metadata::check(ctx, check_battery, &mut outcome),
        FileType::Profile
        | FileType::BioProfile
        | FileType::Trajectory
        | FileType::BioTrajectory
        | FileType::Technical => common::check(ctx, &mut outcome),
    }
    debug!(
        errors = outcome.error_count(),
        warnings = outcome.warning_count(),
        "data validation completed"
    );
    outcome
}
