#![deny(unsafe_code)]

use std::path::PathBuf;

use argo_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse table {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("failed to parse specification {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid specification {path}: {source}")]
    Spec {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("no specification for {file_type} version {version} under {dir}")]
    SpecNotFound {
        dir: PathBuf,
        file_type: String,
        version: String,
    },

    #[error("badly formed parameter name '{name}' in {path}")]
    BadlyFormedName { path: PathBuf, name: String },

    #[error("invalid template '{template}' in {path}: {source}")]
    Template {
        path: PathBuf,
        template: String,
        #[source]
        source: regex::Error,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, error: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Whether the error only means "no specification for this file".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SpecNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
