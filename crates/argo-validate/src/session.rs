//! One validation run over one data file.

use std::path::Path;

use argo_model::{DataFile, FileReport, FileStatus, Phase};
use argo_standards::{SpecCache, StandardsRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::error::Result;
use crate::file_name::check_file_name;
use crate::open::{ArgoFile, OpenOutcome, read_dump};
use crate::semantic::{DataContext, check_dac, nulls, validate_data};
use crate::structural::verify_format;

/// Options controlling what a session checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// DAC the files belong to. DATA_CENTRE is checked against its centres.
    pub dac: Option<String>,

    /// Warn about NUL characters inside char variables.
    pub check_nulls: bool,

    /// Check BATTERY_TYPE / BATTERY_PACKS of meta-data files.
    pub check_battery: bool,

    /// Compare the file name with the expected GDAC name.
    pub check_file_name: bool,

    /// Stop after format verification.
    pub format_only: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            dac: None,
            check_nulls: true,
            check_battery: false,
            check_file_name: false,
            format_only: false,
        }
    }
}

impl ValidationOptions {
    /// The DAC with surrounding blanks removed; `None` when empty.
    pub fn dac(&self) -> Option<&str> {
        self.dac
            .as_deref()
            .map(str::trim)
            .filter(|dac| !dac.is_empty())
    }
}

/// Checks data files against the specifications of a registry.
///
/// Specifications are shared through the cache; nothing else outlives a
/// single call to [`validate`](Self::validate).
#[derive(Debug)]
pub struct ValidationSession<'r> {
    registry: &'r StandardsRegistry,
    cache: &'r SpecCache,
    options: ValidationOptions,
}

impl<'r> ValidationSession<'r> {
    pub fn new(
        registry: &'r StandardsRegistry,
        cache: &'r SpecCache,
        options: ValidationOptions,
    ) -> Self {
        Self {
            registry,
            cache,
            options,
        }
    }

    /// Session using the process-wide specification cache.
    pub fn with_global_cache(registry: &'r StandardsRegistry, options: ValidationOptions) -> Self {
        Self::new(registry, SpecCache::global(), options)
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Reads a header/data dump and checks it.
    pub fn validate_path(&self, path: &Path) -> Result<FileReport> {
        let data = read_dump(path)?;
        self.validate(data)
    }

    /// Opens, verifies the format of, and validates the data of one file.
    ///
    /// Business-rule failures are findings in the report; `Err` is reserved
    /// for specification or reference tables that cannot be loaded.
    pub fn validate<D: DataFile + 'static>(&self, data: D) -> Result<FileReport> {
        let file_name = data.file_name().to_string();
        let dac = self.options.dac();
        let span = info_span!("validate_file", file = %file_name, dac = dac.unwrap_or("unk"));
        let _guard = span.enter();

        // =====================================================================
        // Open
        // =====================================================================
        let file = match ArgoFile::open(data, self.registry, self.cache)? {
            OpenOutcome::Opened(file) => file,
            OpenOutcome::Rejected(message) => {
                info!(message = message.as_str(), "file rejected at open");
                let mut report = FileReport::rejected_at_open(file_name, message);
                report.dac = dac.map(str::to_string);
                return Ok(report);
            }
        };

        let mut report = FileReport {
            file_name,
            dac: dac.map(str::to_string),
            file_type: Some(file.file_type()),
            format_version: Some(file.format_version().to_string()),
            status: FileStatus::Accepted,
            phase: Phase::FormatVerification,
            findings: file.notices().clone(),
            message: None,
        };

        // =====================================================================
        // Format verification
        // =====================================================================
        report.findings.extend(verify_format(&file));
        if !report.findings.is_valid() || self.options.format_only {
            return Ok(finish(report));
        }

        // =====================================================================
        // Data validation
        // =====================================================================
        report.phase = Phase::DataValidation;
        let references = self.registry.references();
        let validated_dac = match check_dac(references, dac) {
            Ok(validated) => validated,
            Err(message) => {
                info!(message = message.as_str(), "data validation refused");
                report.status = FileStatus::Rejected;
                report.message = Some(message);
                return Ok(report);
            }
        };

        if self.options.check_nulls {
            nulls::check(file.data(), &mut report.findings);
        }

        let ctx = DataContext::new(&file, references, validated_dac);
        report
            .findings
            .extend(validate_data(&ctx, self.options.check_battery));

        if self.options.check_file_name {
            debug!("checking GDAC file name");
            check_file_name(&file, &mut report.findings);
        }

        Ok(finish(report))
    }
}

fn finish(mut report: FileReport) -> FileReport {
    report.status = if report.findings.is_valid() {
        FileStatus::Accepted
    } else {
        FileStatus::Rejected
    };
    info!(
        status = %report.status,
        phase = %report.phase,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "file checked"
    );
    report
}
