#![deny(unsafe_code)]

pub mod cache;
pub mod error;
pub mod params;
pub mod paths;
pub mod reference;
pub mod registry;
pub mod spec_loader;
pub mod table_file;

pub use crate::cache::SpecCache;
pub use crate::error::{Result, StandardsError};
pub use crate::params::{ParamMatch, ParamTables, ParamUnitRegistry, TemplatePattern, ValueType};
pub use crate::paths::{SPEC_DIR_ENV_VAR, default_spec_root, reference_dir};
pub use crate::reference::{RefEntry, RefTable, ReferenceLookup, ReferenceTables, XrefTable};
pub use crate::registry::{LoadedSpec, StandardsRegistry};
pub use crate::spec_loader::{load_file_spec, spec_file_name};
