//! Date checks: creation/update for every file type, launch and mission dates
//! for meta-data files.

use argo_model::{ValidationOutcome, earliest_argo_date, format_argo_date, parse_argo_date};
use chrono::{NaiveDateTime, TimeDelta};
use tracing::debug;

use super::DataContext;

/// State of a date variable after trimming.
enum DateField {
    NotSet,
    Invalid,
    Valid(NaiveDateTime),
}

fn parse_field(value: &str) -> DateField {
    if value.is_empty() {
        return DateField::NotSet;
    }
    match parse_argo_date(value) {
        Some(date) => DateField::Valid(date),
        None => DateField::Invalid,
    }
}

fn after_receipt(date: NaiveDateTime, file_time: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    file_time.filter(|received| date - *received > TimeDelta::days(1))
}

/// DATE_CREATION and DATE_UPDATE: set, valid, not before the earliest Argo
/// date, not after receipt, update not before creation.
pub(super) fn creation_update(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    let creation = ctx.trimmed("DATE_CREATION");
    let update = ctx.trimmed("DATE_UPDATE");
    debug!(creation, update, file_time = ?ctx.file_time, "creation/update dates");

    let earliest = earliest_argo_date();
    let mut creation_date = None;
    match parse_field(&creation) {
        DateField::NotSet => outcome.add_error("DATE_CREATION: Not set"),
        DateField::Invalid => {
            outcome.add_error(format!("DATE_CREATION: '{creation}': Invalid date"));
        }
        DateField::Valid(date) => {
            creation_date = Some(date);
            if date < earliest {
                outcome.add_error(format!(
                    "DATE_CREATION: '{creation}': Before earliest allowed date ('{}')",
                    format_argo_date(&earliest)
                ));
            } else if let Some(received) = after_receipt(date, ctx.file_time) {
                outcome.add_error(format!(
                    "DATE_CREATION: '{creation}': After GDAC receipt time ('{}')",
                    format_argo_date(&received)
                ));
            }
        }
    }

    match parse_field(&update) {
        DateField::NotSet => outcome.add_error("DATE_UPDATE: Not set"),
        DateField::Invalid => outcome.add_error(format!("DATE_UPDATE: '{update}': Invalid date")),
        DateField::Valid(date) => {
            if creation_date.is_some_and(|created| date < created) {
                outcome.add_error(format!(
                    "DATE_UPDATE: '{update}': Before DATE_CREATION ('{creation}')"
                ));
            }
            if let Some(received) = after_receipt(date, ctx.file_time) {
                outcome.add_error(format!(
                    "DATE_UPDATE: '{update}': After GDAC receipt time ('{}')",
                    format_argo_date(&received)
                ));
            }
        }
    }
}

/// Pre-3.1 files: DATE_CREATION and DATE_UPDATE only need to be set and
/// parseable.
pub(super) fn rudimentary(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    for name in ["DATE_CREATION", "DATE_UPDATE"] {
        let value = ctx.trimmed(name);
        match parse_field(&value) {
            DateField::NotSet => outcome.add_error(format!("{name}: Not set")),
            DateField::Invalid => outcome.add_error(format!("{name}: '{value}': Invalid date")),
            DateField::Valid(_) => {}
        }
    }
}

/// Meta-data dates. Creation/update first, then launch, start, startup and
/// end of mission.
pub(super) fn metadata_dates(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    let launch = ctx.trimmed("LAUNCH_DATE");
    let start = ctx.trimmed("START_DATE");
    let startup = ctx.trimmed("STARTUP_DATE");
    let end = ctx.trimmed("END_MISSION_DATE");
    debug!(launch, start, startup, end, "meta-data dates");

    creation_update(ctx, outcome);

    let mut launch_date = None;
    match parse_field(&launch) {
        DateField::NotSet => outcome.add_error("LAUNCH_DATE: Not set"),
        DateField::Invalid => outcome.add_error(format!("LAUNCH_DATE: '{launch}': Invalid date")),
        DateField::Valid(date) => {
            launch_date = Some(date);
            let earliest = earliest_argo_date();
            if date < earliest {
                outcome.add_error(format!(
                    "LAUNCH_DATE: '{launch}': Before earliest allowed date ('{}')",
                    format_argo_date(&earliest)
                ));
            }
        }
    }

    for (name, value) in [("START_DATE", &start), ("STARTUP_DATE", &startup)] {
        if let DateField::Invalid = parse_field(value) {
            outcome.add_error(format!("{name}: '{value}': Invalid date"));
        }
    }

    match (parse_field(&end), launch_date) {
        (DateField::NotSet, _) => {}
        (DateField::Invalid, _) => {
            outcome.add_error(format!("END_MISSION_DATE: '{end}': Invalid date"));
        }
        (DateField::Valid(date), Some(launched)) => {
            if date < launched {
                outcome.add_error(format!(
                    "END_MISSION_DATE: '{end}': Before LAUNCH_DATE ('{launch}')"
                ));
            }
        }
        (DateField::Valid(_), None) => {
            outcome.add_warning("END_MISSION_DATE: Set. LAUNCH_DATE missing");
        }
    }
}
