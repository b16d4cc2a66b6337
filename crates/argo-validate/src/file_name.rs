//! GDAC file-name check.
//!
//! The name a file must carry on the GDAC follows from its type, platform
//! number and, for profiles, cycle number, direction and data mode.

use std::sync::LazyLock;

use argo_model::{FileType, NullHandling, ValidationOutcome};
use regex::Regex;
use tracing::{debug, info};

use crate::open::ArgoFile;

static DATA_MODES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[RDA]+$").expect("Invalid data mode regex"));

fn platform(file: &ArgoFile) -> String {
    file.data()
        .read_string("PLATFORM_NUMBER", NullHandling::Truncate)
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn first_char(file: &ArgoFile, variable: &str, nulls: NullHandling) -> char {
    file.data()
        .read_string(variable, nulls)
        .and_then(|value| value.chars().next())
        .unwrap_or(' ')
}

/// `D` when any profile or measurement is in delayed mode, `R` otherwise.
fn file_mode(data_mode: &str) -> Option<char> {
    DATA_MODES
        .is_match(data_mode)
        .then(|| if data_mode.contains('D') { 'D' } else { 'R' })
}

/// Builds the expected GDAC name. When it cannot be determined the reason is
/// recorded as an error and `None` returned.
pub fn expected_file_name(file: &ArgoFile, outcome: &mut ValidationOutcome) -> Option<String> {
    let platform = platform(file);
    let name = match file.file_type() {
        FileType::Metadata => format!("{platform}_meta.nc"),
        FileType::Technical => format!("{platform}_tech.nc"),
        FileType::Profile | FileType::BioProfile => {
            let cycle = file.data().read_int_at("CYCLE_NUMBER", 0).unwrap_or(0);
            let direction = first_char(file, "DIRECTION", NullHandling::Keep);

            let mode = if file.file_type() == FileType::Profile {
                match first_char(file, "DATA_MODE", NullHandling::Truncate) {
                    'R' | 'A' => 'R',
                    'D' => 'D',
                    other => {
                        outcome.add_error(format!(
                            "Could not determine file name: invalid DATA_MODE ='{other}'"
                        ));
                        return None;
                    }
                }
            } else {
                let data_mode = file
                    .data()
                    .read_string("DATA_MODE", NullHandling::Truncate)
                    .unwrap_or_default();
                let Some(mode) = file_mode(&data_mode) else {
                    outcome.add_error(format!(
                        "Could not determine file name: invalid DATA_MODE = '{data_mode}'"
                    ));
                    return None;
                };
                mode
            };

            let suffix = match direction {
                'A' => "",
                'D' => "D",
                other => {
                    outcome.add_error(format!(
                        "Could not determine file name: invalid DIRECTION ='{other}'"
                    ));
                    return None;
                }
            };
            let bio = if file.file_type().is_bio() { "B" } else { "" };
            format!("{bio}{mode}{platform}_{cycle:03}{suffix}.nc")
        }
        FileType::Trajectory | FileType::BioTrajectory => {
            let data_mode = file
                .data()
                .read_string("DATA_MODE", NullHandling::Keep)
                .unwrap_or_default();
            let Some(mode) = file_mode(&data_mode) else {
                outcome.add_error(format!(
                    "Could not determine file name: invalid DATA_MODE = '{data_mode}'"
                ));
                return None;
            };
            let bio = if file.file_type().is_bio() { "B" } else { "" };
            format!("{platform}_{bio}{mode}traj.nc")
        }
    };
    debug!(expected = name.as_str(), "expected GDAC file name");
    Some(name)
}

/// Compares the received file name with the expected GDAC name.
pub fn check_file_name(file: &ArgoFile, outcome: &mut ValidationOutcome) -> bool {
    let Some(expected) = expected_file_name(file, outcome) else {
        return false;
    };
    let name = file.file_name();
    if name == expected {
        return true;
    }

    // Trajectories written before 3.1 were named `<platform>_traj.nc`.
    let version = file.format_version();
    if (version.starts_with("2.") || version.starts_with("3.0"))
        && expected.ends_with("_Rtraj.nc")
        && name == expected.replacen("_Rtraj", "_traj", 1)
    {
        debug!(name, expected = expected.as_str(), "pre-3.1 trajectory name accepted");
        return true;
    }

    info!(name, expected = expected.as_str(), "inconsistent file name");
    outcome.add_error(format!(
        "Inconsistent file name\n\tDAC file name       '{name}'\n\tExpected file name according to file type, DIRECTION, DATA_MODE, CYCLE_NUMBER and PLATFORM_NUMBER : '{expected}'"
    ));
    false
}
