pub mod data;
pub mod date;
pub mod error;
pub mod file_type;
pub mod memory;
pub mod outcome;
pub mod spec;

pub use data::{DataDimension, DataFile, DataVariable, NullHandling};
pub use date::{
    ARGO_DATE_FORMAT, earliest_argo_date, format_argo_date, matches_date_pattern, parse_argo_date,
};
pub use error::{ModelError, Result};
pub use file_type::{DataTypeClass, FileType, classify_data_type};
pub use memory::{MemoryFile, VariableData};
pub use outcome::{
    FileReport, FileStatus, Finding, Phase, Severity, TEMPORARY_SUFFIX, ValidationOutcome,
};
pub use spec::{
    AttrHandling, AttrRegex, AttrRegexDef, AttrValue, DataType, FileSpec, FileSpecDocument,
    SpecAttribute, SpecDimension, SpecGlobalAttribute, SpecVariable, format_real,
};
