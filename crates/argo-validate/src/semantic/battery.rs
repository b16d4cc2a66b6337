//! BATTERY_TYPE and BATTERY_PACKS descriptions.
//!
//! Both are `+`-joined lists. A battery type reads `TADIRAN Alkaline 12 V`, a
//! pack reads `4DD Li` or `U` when unknown.

use std::sync::LazyLock;

use argo_model::ValidationOutcome;
use argo_standards::RefTable;
use regex::Regex;
use tracing::debug;

use super::DataContext;

static BATTERY_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<manufacturer>\w+)\s+(?P<type>\w+)\s+(?P<volts>\d+\.?\d*)\s+V\s*$")
        .expect("Invalid battery type regex")
});

static BATTERY_PACKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<packs>\d+)(?P<style>\w+)\s+(?P<type>\w+)\s*$")
        .expect("Invalid battery packs regex")
});

const UNDEFINED_PACK: &str = "U";

/// Splits a `+`-joined description. Trailing empty pieces are dropped.
fn split_records(value: &str) -> Vec<&str> {
    let mut pieces: Vec<&str> = value.split('+').collect();
    while pieces.last().is_some_and(|piece| piece.is_empty()) {
        pieces.pop();
    }
    pieces
}

pub(super) fn check(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    let types = ctx.string("BATTERY_TYPE");
    debug!(battery_type = types.as_str(), "battery types");
    let type_count = if types.trim().is_empty() {
        outcome.add_error("BATTERY_TYPE: Empty");
        0
    } else {
        let records = split_records(&types);
        for (n, record) in records.iter().enumerate() {
            battery_type(ctx, n + 1, record, outcome);
        }
        records.len()
    };

    let packs = ctx.string("BATTERY_PACKS");
    debug!(battery_packs = packs.as_str(), "battery packs");
    if packs.trim().is_empty() {
        return;
    }
    let records = split_records(&packs);
    for (n, record) in records.iter().enumerate() {
        battery_pack(ctx, n + 1, record, outcome);
    }

    if type_count != records.len() {
        ctx.temporary_warning(
            outcome,
            format!(
                "Number of BATTERY_TYPES {type_count} != number of BATTERY_PACKS {}",
                records.len()
            ),
        );
    }
}

fn battery_type(ctx: &DataContext<'_>, n: usize, record: &str, outcome: &mut ValidationOutcome) {
    let Some(caps) = BATTERY_TYPE.captures(record) else {
        ctx.temporary_warning(
            outcome,
            format!(
                "BATTERY_TYPE[{n}]: Does not match template 'manufacturer type volts V': '{}'",
                record.trim()
            ),
        );
        return;
    };
    let manufacturer = &caps["manufacturer"];
    let kind = &caps["type"];
    debug!(manufacturer, kind, volts = &caps["volts"], "battery type");

    if !ctx
        .references
        .contains(RefTable::BatteryTypeManufacturer, manufacturer)
    {
        ctx.temporary_warning(
            outcome,
            format!("BATTERY_TYPE[{n}]: Invalid manufacturer: '{manufacturer}'"),
        );
    }
    if !ctx.references.contains(RefTable::BatteryTypeType, kind) {
        ctx.temporary_warning(outcome, format!("BATTERY_TYPE[{n}]: Invalid type: '{kind}'"));
    }
}

fn battery_pack(ctx: &DataContext<'_>, n: usize, record: &str, outcome: &mut ValidationOutcome) {
    if record.trim() == UNDEFINED_PACK {
        debug!(n, "battery pack undefined");
        return;
    }
    let Some(caps) = BATTERY_PACKS.captures(record) else {
        ctx.temporary_warning(
            outcome,
            format!(
                "BATTERY_PACKS[{n}]: Does not match template 'xStyle type (or U)': '{}'",
                record.trim()
            ),
        );
        return;
    };
    let style = &caps["style"];
    let kind = &caps["type"];
    debug!(packs = &caps["packs"], style, kind, "battery pack");

    if !ctx.references.contains(RefTable::BatteryPacksStyle, style) {
        ctx.temporary_warning(
            outcome,
            format!("BATTERY_PACKS[{n}]: Invalid style of battery: '{style}'"),
        );
    }
    if !ctx.references.contains(RefTable::BatteryPacksType, kind) {
        ctx.temporary_warning(outcome, format!("BATTERY_PACKS[{n}]: Invalid type: '{kind}'"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_split_on_plus() {
        assert_eq!(split_records("A B 3.6 V+C D 7 V"), vec!["A B 3.6 V", "C D 7 V"]);
        assert_eq!(split_records("4DD Li+"), vec!["4DD Li"]);
    }

    #[test]
    fn templates() {
        assert!(BATTERY_TYPE.is_match(" TADIRAN Alkaline 12 V"));
        assert!(BATTERY_TYPE.is_match("SAFT Lithium 3.6 V "));
        assert!(!BATTERY_TYPE.is_match("Alkaline 12V"));
        assert!(BATTERY_PACKS.is_match("4DD Li"));
        assert!(!BATTERY_PACKS.is_match("DD Li"));
    }
}
