//! Error types for the argo-validate crate.
//!
//! Business-rule findings never surface here; they are recorded in a
//! [`ValidationOutcome`](argo_model::ValidationOutcome). These errors stop the
//! checking of a file altogether.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal error while checking a data file.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ValidateError {
    // =========================================================================
    // INPUT ERRORS
    // =========================================================================
    /// The data source exists but holds no bytes.
    #[error("File '{path}' is zero length")]
    EmptySource {
        /// Path of the empty source.
        path: PathBuf,
    },

    /// The data source could not be read.
    #[error("Error opening '{path}': {source}")]
    Open {
        /// Path of the unreadable source.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // WRAPPED ERRORS
    // =========================================================================
    /// The header/data dump is malformed.
    #[error("Invalid data file: {0}")]
    Model(#[from] argo_model::ModelError),

    /// Specification or reference tables could not be loaded.
    #[error("Standards error: {0}")]
    Standards(#[from] argo_standards::StandardsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, ValidateError>;

impl ValidateError {
    pub(crate) fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Check if the remaining files of a run can still be checked.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmptySource { .. } | Self::Open { .. } | Self::Model(_)
        )
    }

    /// Get a user-friendly suggestion for fixing this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::EmptySource { .. } => {
                Some("Re-run the NetCDF dumper; the input file was truncated or never written.")
            }
            Self::Open { .. } => Some("Check that the input path exists and is readable."),
            Self::Model(_) => {
                Some("The dump does not match its own dimensions; regenerate it from the NetCDF file.")
            }
            Self::Standards(_) => Some(
                "Check --spec-dir / ARGO_SPEC_DIR and that the reference tables are present.",
            ),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_recoverable() {
        let err = ValidateError::EmptySource {
            path: PathBuf::from("R6900001_001.json"),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "File 'R6900001_001.json' is zero length");
        assert!(err.suggestion().is_some());

        let err = ValidateError::Io(std::io::Error::other("disk gone"));
        assert!(!err.is_recoverable());
        assert!(err.suggestion().is_none());
    }
}
