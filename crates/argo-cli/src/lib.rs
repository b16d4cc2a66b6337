//! Library side of the `argo-checker` command line tool.

pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
