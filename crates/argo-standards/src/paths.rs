//! Specification directory path resolution.

use std::path::{Path, PathBuf};

/// Environment variable for overriding the specification directory.
pub const SPEC_DIR_ENV_VAR: &str = "ARGO_SPEC_DIR";

/// Get the default specification root directory.
///
/// Resolution order:
/// 1. `ARGO_SPEC_DIR` environment variable
/// 2. `spec/` directory relative to workspace root
pub fn default_spec_root() -> PathBuf {
    if let Ok(root) = std::env::var(SPEC_DIR_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../spec")
}

/// Reference tables directory inside a specification directory.
pub fn reference_dir(spec_dir: &Path) -> PathBuf {
    spec_dir.join("ref")
}

/// Path of the `.deprecated` companion of a table file.
pub fn deprecated_companion(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".deprecated");
    PathBuf::from(name)
}
