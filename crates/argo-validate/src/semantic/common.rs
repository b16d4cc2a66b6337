//! Checks shared by profile, trajectory and technical files, plus the
//! DATA_CENTRE and PLATFORM_NUMBER rules meta-data files reuse.

use std::sync::LazyLock;

use argo_model::ValidationOutcome;
use regex::Regex;
use tracing::debug;

use super::{DataContext, dates};

static PLATFORM_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[1-9][0-9]{4}|[1-9]9[0-9]{5})$").expect("Invalid platform number regex")
});

/// WMO platform number: five digits, or seven digits with a 9 in second
/// position. No leading zero.
pub fn is_valid_platform_number(value: &str) -> bool {
    PLATFORM_NUMBER.is_match(value)
}

pub(super) fn check(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    if ctx.file.is_pre_v31() {
        debug!(
            format_version = ctx.file.format_version(),
            "pre-3.1 file: rudimentary date checks only"
        );
        dates::rudimentary(ctx, outcome);
        return;
    }

    // 1. Creation and update dates
    dates::creation_update(ctx, outcome);

    // 2. DATA_CENTRE against the DAC's centre codes
    data_centre(ctx, outcome);

    // 3. PLATFORM_NUMBER for every record
    platform_number(ctx, outcome);
}

/// DATA_CENTRE must be a centre code of the DAC, or of any DAC when none was
/// given.
pub(super) fn data_centre(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    for (label, code) in ctx.labelled_records("DATA_CENTRE") {
        debug!(label, code, "data centre");
        match ctx.dac {
            Some(dac) => {
                let known = ctx
                    .references
                    .dac_centres(dac)
                    .is_some_and(|centres| centres.iter().any(|centre| *centre == code));
                if !known {
                    outcome.add_error(format!("{label}: '{code}': Invalid for DAC {dac}"));
                }
            }
            None => {
                if !ctx.references.is_any_centre(&code) {
                    outcome.add_error(format!("{label}: '{code}': Invalid (for all DACs)"));
                }
            }
        }
    }
}

pub(super) fn platform_number(ctx: &DataContext<'_>, outcome: &mut ValidationOutcome) {
    for (label, number) in ctx.labelled_records("PLATFORM_NUMBER") {
        debug!(label, number, "platform number");
        if !is_valid_platform_number(&number) {
            outcome.add_error(format!("{label}: '{number}': Invalid"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_numbers() {
        assert!(is_valid_platform_number("12345"));
        assert!(is_valid_platform_number("6900001"));
        assert!(!is_valid_platform_number("1234567"));
        assert!(!is_valid_platform_number("01234"));
        assert!(!is_valid_platform_number("abcde"));
        assert!(!is_valid_platform_number(""));
    }
}
