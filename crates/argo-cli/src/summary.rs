use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use argo_model::{FileReport, FileStatus, FileType, Finding, Severity};

use crate::types::CheckResult;

pub fn print_summary(result: &CheckResult) {
    if !result.reports.is_empty() {
        println!("{}", summary_table(result));
    }
    if let Some(table) = issue_table(result) {
        println!();
        println!("Issues:");
        println!("{table}");
    }
    if !result.failures.is_empty() {
        eprintln!("Errors:");
        for failure in &result.failures {
            eprintln!("- {}: {}", failure.path.display(), failure.error);
            if let Some(hint) = failure.suggestion {
                eprintln!("  hint: {hint}");
            }
        }
    }
}

/// One row per checked file plus a total row.
pub fn summary_table(result: &CheckResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Type"),
        header_cell("Version"),
        header_cell("DAC"),
        header_cell("Status"),
        header_cell("Phase"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 6, CellAlignment::Right);
    align_column(&mut table, 7, CellAlignment::Right);

    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;
    for report in &result.reports {
        total_errors += report.error_count();
        total_warnings += report.warning_count();
        table.add_row(vec![
            Cell::new(&report.file_name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            optional_cell(report.file_type.as_ref().map(FileType::label)),
            optional_cell(report.format_version.as_deref()),
            optional_cell(report.dac.as_deref()),
            status_cell(report.status),
            Cell::new(report.phase.label()),
            count_cell(report.error_count(), Color::Red),
            count_cell(report.warning_count(), Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(format!(
            "{} accepted / {} rejected",
            result.accepted_count(),
            result.rejected_count()
        ))
        .add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_errors, Color::Red).add_attribute(Attribute::Bold),
        count_cell(total_warnings, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Every message of every file: stop reasons first, then errors, then warnings.
///
/// Returns `None` when there is nothing to show.
pub fn issue_table(result: &CheckResult) -> Option<Table> {
    let rows: Vec<IssueRow<'_>> = result.reports.iter().flat_map(issue_rows).collect();
    if rows.is_empty() {
        return None;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Severity"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.file_name),
            row.kind.cell(),
            Cell::new(row.text),
        ]);
    }
    Some(table)
}

struct IssueRow<'a> {
    file_name: &'a str,
    kind: IssueKind,
    text: String,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum IssueKind {
    Reject,
    Error,
    Warning,
    Temporary,
}

impl IssueKind {
    fn of(finding: &Finding) -> Self {
        match (finding.severity, finding.temporary) {
            (Severity::Error, _) => IssueKind::Error,
            (Severity::Warning, true) => IssueKind::Temporary,
            (Severity::Warning, false) => IssueKind::Warning,
        }
    }

    fn cell(self) -> Cell {
        match self {
            IssueKind::Reject => Cell::new("REJECT")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            IssueKind::Error => Cell::new("ERROR").fg(Color::Red),
            IssueKind::Warning => Cell::new("WARN").fg(Color::Yellow),
            IssueKind::Temporary => Cell::new("WARN*")
                .fg(Color::Yellow)
                .add_attribute(Attribute::Bold),
        }
    }
}

fn issue_rows(report: &FileReport) -> Vec<IssueRow<'_>> {
    let mut rows = Vec::new();
    if let Some(message) = &report.message {
        rows.push(IssueRow {
            file_name: &report.file_name,
            kind: IssueKind::Reject,
            text: message.clone(),
        });
    }
    for finding in report.findings.findings() {
        rows.push(IssueRow {
            file_name: &report.file_name,
            kind: IssueKind::of(finding),
            text: finding.text(),
        });
    }
    // Stable, so findings keep the order the checks produced them in.
    rows.sort_by_key(|row| row.kind);
    rows
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 8 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::UpperBoundary(Width::Fixed(12)),
            ColumnConstraint::LowerBoundary(Width::Fixed(13)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
        ]);
    }
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 3 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Percentage(70)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: FileStatus) -> Cell {
    match status {
        FileStatus::Accepted => Cell::new(status.label())
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        FileStatus::Rejected => Cell::new(status.label())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argo_model::{Phase, ValidationOutcome};

    fn report(findings: ValidationOutcome) -> FileReport {
        FileReport {
            file_name: "R6900001_001.nc".to_string(),
            dac: Some("coriolis".to_string()),
            file_type: Some(FileType::Profile),
            format_version: Some("3.1".to_string()),
            status: FileStatus::Rejected,
            phase: Phase::DataValidation,
            findings,
            message: None,
        }
    }

    #[test]
    fn issues_are_ordered_by_kind() {
        let mut findings = ValidationOutcome::new();
        findings.add_warning("first warning");
        findings.add_temporary_warning("temporary");
        findings.add_error("first error");
        findings.add_error("second error");

        let report = report(findings);
        let rows = issue_rows(&report);
        let texts: Vec<&str> = rows.iter().map(|row| row.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "first error",
                "second error",
                "first warning",
                "temporary   *** WILL BECOME AN ERROR ***",
            ]
        );
    }

    #[test]
    fn stop_reason_comes_first() {
        let report = FileReport::rejected_at_open("bad.nc", "DATA_TYPE not in file");
        let rows = issue_rows(&report);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].kind == IssueKind::Reject);
    }

    #[test]
    fn empty_run_has_no_issue_table() {
        assert!(issue_table(&CheckResult::default()).is_none());
    }
}
