#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use argo_model::{FileSpec, FileType};
use tracing::info;

use crate::error::Result;
use crate::params::{ParamTables, ParamUnitRegistry};
use crate::paths::reference_dir;
use crate::reference::{ReferenceLookup, ReferenceTables};
use crate::spec_loader::{load_file_spec, spec_file_path};

/// A specification together with the parameter registry its file type needs.
#[derive(Debug)]
pub struct LoadedSpec {
    pub spec: FileSpec,
    /// Present for metadata (config names) and technical (tech names) files.
    pub params: Option<ParamUnitRegistry>,
}

/// Locates and loads specifications from one specification directory.
#[derive(Clone)]
pub struct StandardsRegistry {
    spec_dir: PathBuf,
    references: Arc<dyn ReferenceLookup>,
}

impl std::fmt::Debug for StandardsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardsRegistry")
            .field("spec_dir", &self.spec_dir)
            .finish_non_exhaustive()
    }
}

impl StandardsRegistry {
    pub fn new(spec_dir: impl Into<PathBuf>, references: Arc<dyn ReferenceLookup>) -> Self {
        Self {
            spec_dir: spec_dir.into(),
            references,
        }
    }

    /// Opens `spec_dir` and loads the reference tables from `ref_dir`
    /// (default `<spec_dir>/ref`).
    pub fn open(spec_dir: &Path, ref_dir: Option<&Path>) -> Result<Self> {
        let ref_dir = ref_dir.map_or_else(|| reference_dir(spec_dir), Path::to_path_buf);
        let references = ReferenceTables::load(&ref_dir)?;
        info!(
            spec_dir = %spec_dir.display(),
            ref_dir = %ref_dir.display(),
            "opened specification directory"
        );
        Ok(Self::new(spec_dir, Arc::new(references)))
    }

    pub fn spec_dir(&self) -> &Path {
        &self.spec_dir
    }

    pub fn references(&self) -> &dyn ReferenceLookup {
        self.references.as_ref()
    }

    pub fn shared_references(&self) -> Arc<dyn ReferenceLookup> {
        Arc::clone(&self.references)
    }

    pub fn has_spec(&self, file_type: FileType, version: &str) -> bool {
        spec_file_path(&self.spec_dir, file_type, version).is_file()
    }

    /// Loads the specification and, for metadata and technical files, the
    /// config/tech parameter registry of the same version.
    pub fn load_spec(&self, file_type: FileType, version: &str) -> Result<LoadedSpec> {
        let spec = load_file_spec(&self.spec_dir, file_type, version)?;
        let tables = ParamTables::for_file_type(file_type);
        let params = if tables.is_empty() {
            None
        } else {
            Some(ParamUnitRegistry::load(
                &self.spec_dir,
                version,
                tables,
                self.references(),
            )?)
        };
        info!(spec = spec.name(), params = params.is_some(), "loaded specification");
        Ok(LoadedSpec { spec, params })
    }
}
