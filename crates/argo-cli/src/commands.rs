use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{debug, info, info_span, warn};

use argo_model::{FileReport, FileType};
use argo_standards::StandardsRegistry;
use argo_validate::ValidationSession;

use crate::summary::{apply_table_style, header_cell};
use crate::types::{CheckConfig, CheckResult, FileFailure};

/// Checks every file of the run and writes the JSON reports when asked to.
///
/// Files that cannot be read are collected as failures; the run only stops
/// early when the specification directory itself is unusable.
pub fn run_check(config: &CheckConfig) -> Result<CheckResult> {
    let dac = config.options.dac().unwrap_or("unk");
    let span = info_span!("check", files = config.files.len(), dac = dac);
    let _guard = span.enter();
    let start = Instant::now();

    let registry = StandardsRegistry::open(&config.spec_dir, config.ref_dir.as_deref())
        .with_context(|| {
            format!(
                "open specification directory {}",
                config.spec_dir.display()
            )
        })?;
    let session = ValidationSession::with_global_cache(&registry, config.options.clone());

    let mut result = CheckResult::default();
    for path in &config.files {
        debug!(path = %path.display(), "checking file");
        match session.validate_path(path) {
            Ok(report) => result.reports.push(report),
            Err(error) if error.is_recoverable() => {
                warn!(path = %path.display(), %error, "file could not be checked");
                result.failures.push(FileFailure {
                    path: path.clone(),
                    error: error.to_string(),
                    suggestion: error.suggestion(),
                });
            }
            Err(error) => {
                return Err(error).with_context(|| format!("check {}", path.display()));
            }
        }
    }

    if let Some(output) = &config.json_output {
        write_reports(output, &result.reports)?;
    }

    info!(
        accepted = result.accepted_count(),
        rejected = result.rejected_count(),
        failures = result.failures.len(),
        duration_ms = start.elapsed().as_millis(),
        "check complete"
    );
    Ok(result)
}

/// Writes the reports as a pretty-printed JSON array.
pub fn write_reports(path: &Path, reports: &[FileReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports).context("serialize reports")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("write reports to {}", path.display()))?;
    info!(path = %path.display(), reports = reports.len(), "wrote JSON reports");
    Ok(())
}

pub fn file_types_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File type"),
        header_cell("DATA_TYPE"),
        header_cell("Specification"),
    ]);
    apply_table_style(&mut table);
    for file_type in FileType::ALL {
        table.add_row(vec![
            file_type.label().to_string(),
            file_type.data_type().to_string(),
            format!("argo-{}-spec-v<version>", file_type.spec_type()),
        ]);
    }
    table
}

pub fn run_file_types() -> Result<()> {
    println!("{}", file_types_table());
    Ok(())
}
