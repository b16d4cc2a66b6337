use serde::{Deserialize, Serialize};
use std::fmt;

use crate::file_type::FileType;

/// Appended to warnings that are scheduled to become errors.
pub const TEMPORARY_SUFFIX: &str = "   *** WILL BECOME AN ERROR ***";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One error or warning produced by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    /// A warning that will become an error in a future format revision.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub temporary: bool,
}

impl Finding {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            temporary: false,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            temporary: false,
        }
    }

    pub fn temporary_warning(message: impl Into<String>) -> Self {
        Self {
            temporary: true,
            ..Self::warning(message)
        }
    }

    /// Message as reported, including the temporary-warning suffix.
    pub fn text(&self) -> String {
        if self.temporary {
            format!("{}{}", self.message, TEMPORARY_SUFFIX)
        } else {
            self.message.clone()
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Ordered accumulator of findings. Valid while it holds no errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationOutcome {
    findings: Vec<Finding>,
}

impl ValidationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.push(Finding::error(message));
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.push(Finding::warning(message));
    }

    pub fn add_temporary_warning(&mut self, message: impl Into<String>) {
        self.push(Finding::temporary_warning(message));
    }

    pub fn extend(&mut self, other: ValidationOutcome) {
        self.findings.extend(other.findings);
    }

    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors().map(Finding::text).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings().map(Finding::text).collect()
    }
}

/// Furthest stage a file reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Phase {
    Open,
    FormatVerification,
    DataValidation,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Open => "OPEN",
            Phase::FormatVerification => "FORMAT-VERIFICATION",
            Phase::DataValidation => "DATA-VALIDATION",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    #[serde(rename = "FILE-ACCEPTED")]
    Accepted,
    #[serde(rename = "FILE-REJECTED")]
    Rejected,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Accepted => "FILE-ACCEPTED",
            FileStatus::Rejected => "FILE-REJECTED",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of checking one data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    pub status: FileStatus,
    pub phase: Phase,
    #[serde(default)]
    pub findings: ValidationOutcome,
    /// Why checking stopped early, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileReport {
    /// A file rejected before any specification check ran.
    pub fn rejected_at_open(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            dac: None,
            file_type: None,
            format_version: None,
            status: FileStatus::Rejected,
            phase: Phase::Open,
            findings: ValidationOutcome::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == FileStatus::Accepted
    }

    pub fn error_count(&self) -> usize {
        self.findings.error_count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings.warning_count()
    }
}
