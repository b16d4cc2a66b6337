//! Specification file loading.

use std::path::{Path, PathBuf};

use argo_model::{FileSpec, FileSpecDocument, FileType, ModelError};
use tracing::debug;

use crate::error::{Result, StandardsError};

/// `argo-<spec_type>-spec-v<version>.json`
pub fn spec_file_name(file_type: FileType, version: &str) -> String {
    format!(
        "argo-{}-spec-v{}.json",
        file_type.spec_type(),
        version.trim()
    )
}

pub fn spec_file_path(spec_dir: &Path, file_type: FileType, version: &str) -> PathBuf {
    spec_dir.join(spec_file_name(file_type, version))
}

/// Reads and compiles the specification of one file type and version.
///
/// A missing file is reported as [`StandardsError::SpecNotFound`] so callers
/// can tell "unsupported version" apart from a broken installation.
pub fn load_file_spec(spec_dir: &Path, file_type: FileType, version: &str) -> Result<FileSpec> {
    let path = spec_file_path(spec_dir, file_type, version);
    if !path.is_file() {
        return Err(StandardsError::SpecNotFound {
            dir: spec_dir.to_path_buf(),
            file_type: file_type.label().to_string(),
            version: version.trim().to_string(),
        });
    }

    let bytes = std::fs::read(&path).map_err(|e| StandardsError::io(&path, e))?;
    let document: FileSpecDocument =
        serde_json::from_slice(&bytes).map_err(|source| StandardsError::Json {
            path: path.clone(),
            source,
        })?;

    if document.file_type != file_type {
        return Err(StandardsError::Spec {
            path,
            source: ModelError::InvalidSpec {
                spec: document.name,
                message: format!(
                    "declares file type {} but was requested as {}",
                    document.file_type, file_type
                ),
            },
        });
    }

    let spec = document
        .build()
        .map_err(|source| StandardsError::Spec {
            path: path.clone(),
            source,
        })?;
    debug!(
        spec = spec.name(),
        dimensions = spec.dimensions().len(),
        variables = spec.variables().len(),
        "loaded file specification"
    );
    Ok(spec)
}
