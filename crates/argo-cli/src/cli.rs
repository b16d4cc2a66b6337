//! CLI argument definitions for the Argo file checker.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "argo-checker",
    version,
    about = "Argo file checker - verify Argo NetCDF files against the format specifications",
    long_about = "Verify Argo NetCDF data files against the Argo format specifications.\n\n\
                  Each file is opened, its format compared with the specification of its\n\
                  type and version, and its data checked against the Argo reference tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check Argo files given as JSON header/data dumps.
    Check(CheckArgs),

    /// List the supported file types.
    FileTypes,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Header/data dumps of the NetCDF files to check.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// DAC the files belong to (DATA_CENTRE is checked against its centres).
    #[arg(long = "dac", value_name = "DAC")]
    pub dac: Option<String>,

    /// Specification directory (default: $ARGO_SPEC_DIR, else the bundled spec/).
    #[arg(long = "spec-dir", value_name = "DIR")]
    pub spec_dir: Option<PathBuf>,

    /// Reference tables directory (default: <SPEC_DIR>/ref).
    #[arg(long = "ref-dir", value_name = "DIR")]
    pub ref_dir: Option<PathBuf>,

    /// Do not warn about NUL characters inside text variables.
    #[arg(long = "no-nulls")]
    pub no_nulls: bool,

    /// Check BATTERY_TYPE and BATTERY_PACKS of meta-data files.
    #[arg(long = "battery")]
    pub battery: bool,

    /// Compare each file name with the name expected on the GDAC.
    #[arg(long = "file-name")]
    pub file_name: bool,

    /// Stop after format verification.
    #[arg(long = "format-only")]
    pub format_only: bool,

    /// Write the reports as JSON to this path.
    #[arg(long = "json", value_name = "PATH")]
    pub json: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
