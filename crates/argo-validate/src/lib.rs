//! Checking of Argo data files.
//!
//! A file goes through three phases: it is opened (type and version
//! identified, specification attached), its format is verified against the
//! specification, and its data is validated against the business rules of
//! its file type.

#![deny(unsafe_code)]

pub mod error;
pub mod file_name;
pub mod open;
pub mod semantic;
pub mod session;
pub mod structural;

pub use crate::error::{Result, ValidateError};
pub use crate::file_name::{check_file_name, expected_file_name};
pub use crate::open::{ArgoFile, OpenOutcome, compare_versions, read_dump};
pub use crate::semantic::{DataContext, check_dac, is_valid_platform_number, validate_data};
pub use crate::session::{ValidationOptions, ValidationSession};
pub use crate::structural::{NO_SPEC_MESSAGE, verify_format};
