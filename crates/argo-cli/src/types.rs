use std::path::PathBuf;

use argo_model::FileReport;
use argo_validate::ValidationOptions;

/// Everything `argo-checker check` needs for one run.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub files: Vec<PathBuf>,
    pub spec_dir: PathBuf,
    /// Reference tables directory; `<spec_dir>/ref` when `None`.
    pub ref_dir: Option<PathBuf>,
    pub options: ValidationOptions,
    /// Where to write the reports as JSON.
    pub json_output: Option<PathBuf>,
}

/// A file that could not be checked at all.
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
    pub suggestion: Option<&'static str>,
}

#[derive(Debug, Default)]
pub struct CheckResult {
    pub reports: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl CheckResult {
    pub fn accepted_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_accepted()).count()
    }

    pub fn rejected_count(&self) -> usize {
        self.reports.len() - self.accepted_count()
    }

    /// True when a file was rejected or could not be read.
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || self.rejected_count() > 0
    }
}
