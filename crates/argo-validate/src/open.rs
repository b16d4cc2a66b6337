//! Opening a data file: file-type detection and specification attachment.

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use argo_model::{
    DataFile, DataTypeClass, FileSpec, FileType, MemoryFile, NullHandling, ValidationOutcome,
    classify_data_type,
};
use argo_standards::{LoadedSpec, ParamUnitRegistry, SpecCache, StandardsError, StandardsRegistry};
use tracing::{debug, info, warn};

use crate::error::{Result, ValidateError};

/// Result of opening a data file.
#[derive(Debug)]
pub enum OpenOutcome {
    Opened(Box<ArgoFile>),
    /// The file cannot be checked; the message says why.
    Rejected(String),
}

/// A data file recognised as an Argo file.
pub struct ArgoFile {
    data: Box<dyn DataFile>,
    file_type: FileType,
    data_type: String,
    format_version: String,
    spec: Option<Arc<LoadedSpec>>,
    notices: ValidationOutcome,
}

impl fmt::Debug for ArgoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgoFile")
            .field("file_name", &self.data.file_name())
            .field("file_type", &self.file_type)
            .field("format_version", &self.format_version)
            .field("spec", &self.spec.as_ref().map(|loaded| loaded.spec.name()))
            .finish_non_exhaustive()
    }
}

impl ArgoFile {
    /// Reads `DATA_TYPE` and `FORMAT_VERSION`. No specification is attached.
    pub fn identify<D: DataFile + 'static>(data: D) -> OpenOutcome {
        let file = data.file_name().to_string();

        let Some(raw_type) = data.read_string("DATA_TYPE", NullHandling::Truncate) else {
            info!(file, "DATA_TYPE not in file");
            return OpenOutcome::Rejected("DATA_TYPE not in file".to_string());
        };
        let data_type = raw_type.trim().to_string();
        debug!(file, data_type, "data type");

        let mut notices = ValidationOutcome::new();
        let (file_type, tolerated) = match classify_data_type(&data_type) {
            DataTypeClass::Standard(file_type) => (file_type, false),
            DataTypeClass::Tolerated {
                file_type,
                correction,
            } => {
                let message = format!("Non-standard DATA_TYPE (temporarily allowed): '{data_type}'");
                warn!(file, correction, "TEMP WARNING: {message}");
                notices.add_temporary_warning(message);
                (file_type, true)
            }
            DataTypeClass::Unknown => {
                info!(file, data_type, "invalid DATA_TYPE");
                return OpenOutcome::Rejected(format!("Invalid DATA_TYPE: '{data_type}'"));
            }
        };

        let Some(raw_version) = data.read_string("FORMAT_VERSION", NullHandling::Truncate) else {
            info!(file, "FORMAT_VERSION not in file");
            return OpenOutcome::Rejected("FORMAT_VERSION not in file".to_string());
        };
        let format_version = raw_version.trim().to_string();

        if tolerated && format_version == "3.1" {
            info!(file, data_type, format_version, "non-standard DATA_TYPE no longer tolerated");
            return OpenOutcome::Rejected(format!("Invalid DATA_TYPE: '{data_type}'"));
        }

        info!(file, file_type = %file_type, format_version, "identified data file");
        OpenOutcome::Opened(Box::new(Self {
            data: Box::new(data),
            file_type,
            data_type,
            format_version,
            spec: None,
            notices,
        }))
    }

    /// Identifies the file and attaches the specification for its type and
    /// version, loading it through `cache`.
    pub fn open<D: DataFile + 'static>(
        data: D,
        registry: &StandardsRegistry,
        cache: &SpecCache,
    ) -> Result<OpenOutcome> {
        let mut file = match Self::identify(data) {
            OpenOutcome::Opened(file) => file,
            rejected @ OpenOutcome::Rejected(_) => return Ok(rejected),
        };

        match cache.get_or_load(registry, file.file_type, &file.format_version) {
            Ok(loaded) => {
                file.spec = Some(loaded);
                Ok(OpenOutcome::Opened(file))
            }
            Err(StandardsError::SpecNotFound { .. }) => {
                info!(
                    file = file.file_name(),
                    file_type = %file.file_type,
                    format_version = file.format_version,
                    "no specification for this file type and version"
                );
                Ok(OpenOutcome::Rejected(format!(
                    "File type / version not valid in the FileChecker: {} / {}",
                    file.file_type, file.format_version
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Attaches an already loaded specification.
    #[must_use]
    pub fn with_spec(mut self, spec: Arc<LoadedSpec>) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn data(&self) -> &dyn DataFile {
        self.data.as_ref()
    }

    pub fn file_name(&self) -> &str {
        self.data.file_name()
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// `DATA_TYPE` as found in the file, trimmed.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// `FORMAT_VERSION` as found in the file, trimmed.
    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    pub fn spec(&self) -> Option<&LoadedSpec> {
        self.spec.as_deref()
    }

    pub fn file_spec(&self) -> Option<&FileSpec> {
        self.spec().map(|loaded| &loaded.spec)
    }

    pub fn params(&self) -> Option<&ParamUnitRegistry> {
        self.spec().and_then(|loaded| loaded.params.as_ref())
    }

    /// Findings raised while opening (tolerated `DATA_TYPE` spellings).
    pub fn notices(&self) -> &ValidationOutcome {
        &self.notices
    }

    /// Format versions before 3.1 only get rudimentary data checks.
    pub fn is_pre_v31(&self) -> bool {
        compare_versions(&self.format_version, "3.1") == Ordering::Less
    }
}

/// Compares dotted format versions component by component. Falls back to a
/// plain string comparison when either side is not purely numeric.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let parse = |version: &str| {
        version
            .trim()
            .split('.')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()
    };
    match (parse(left), parse(right)) {
        (Some(l), Some(r)) => l.cmp(&r),
        _ => left.trim().cmp(right.trim()),
    }
}

/// Reads a JSON header/data dump.
///
/// The file name defaults to the dump's own name and the modification time to
/// the dump file's when the dump does not carry them.
pub fn read_dump(path: &Path) -> Result<MemoryFile> {
    let bytes = fs::read(path).map_err(|source| ValidateError::open(path, source))?;
    if bytes.is_empty() {
        return Err(ValidateError::EmptySource {
            path: path.to_path_buf(),
        });
    }

    let mut file = MemoryFile::from_reader(bytes.as_slice())?;
    if file.file_name().is_empty()
        && let Some(name) = path.file_name()
    {
        file.set_file_name(name.to_string_lossy());
    }
    if file.modified().is_none()
        && let Ok(modified) = fs::metadata(path).and_then(|meta| meta.modified())
    {
        file.set_modified(modified);
    }
    debug!(path = %path.display(), file = file.file_name(), "read data file dump");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_compare_numerically() {
        assert_eq!(compare_versions("2.2", "2.2"), Ordering::Equal);
        assert_eq!(compare_versions("2.10", "2.2"), Ordering::Greater);
        assert_eq!(compare_versions(" 3.0", "3.1"), Ordering::Less);
        assert_eq!(compare_versions("3.1", "2.2"), Ordering::Greater);
        assert_eq!(compare_versions("v3", "3.1"), Ordering::Greater);
    }
}
