use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The Argo file families, as announced by the `DATA_TYPE` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    Metadata,
    Profile,
    BioProfile,
    Technical,
    Trajectory,
    BioTrajectory,
}

impl FileType {
    pub const ALL: [FileType; 6] = [
        FileType::Metadata,
        FileType::Profile,
        FileType::BioProfile,
        FileType::Technical,
        FileType::Trajectory,
        FileType::BioTrajectory,
    ];

    /// Type component of the specification file name (`argo-<type>-spec-v<version>`).
    pub fn spec_type(&self) -> &'static str {
        match self {
            FileType::Metadata => "metadata",
            FileType::Profile => "profile",
            FileType::BioProfile => "b_profile",
            FileType::Technical => "technical",
            FileType::Trajectory => "trajectory",
            FileType::BioTrajectory => "b_trajectory",
        }
    }

    /// The standard `DATA_TYPE` value for this family.
    pub fn data_type(&self) -> &'static str {
        match self {
            FileType::Metadata => "Argo meta-data",
            FileType::Profile => "Argo profile",
            FileType::BioProfile => "B-Argo profile",
            FileType::Technical => "Argo technical data",
            FileType::Trajectory => "Argo trajectory",
            FileType::BioTrajectory => "B-Argo trajectory",
        }
    }

    /// Upper-case label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Metadata => "METADATA",
            FileType::Profile => "PROFILE",
            FileType::BioProfile => "BIO_PROFILE",
            FileType::Technical => "TECHNICAL",
            FileType::Trajectory => "TRAJECTORY",
            FileType::BioTrajectory => "BIO_TRAJECTORY",
        }
    }

    pub fn is_bio(&self) -> bool {
        matches!(self, FileType::BioProfile | FileType::BioTrajectory)
    }

    pub fn is_profile(&self) -> bool {
        matches!(self, FileType::Profile | FileType::BioProfile)
    }

    pub fn is_trajectory(&self) -> bool {
        matches!(self, FileType::Trajectory | FileType::BioTrajectory)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FileType {
    type Err = String;

    /// Accepts either the diagnostic label or the specification type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        FileType::ALL
            .into_iter()
            .find(|ft| ft.spec_type() == normalized || ft.label().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("Unknown file type: {}", s))
    }
}

/// Outcome of classifying a raw `DATA_TYPE` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTypeClass {
    /// One of the six standard values.
    Standard(FileType),
    /// A non-standard spelling that is still accepted for older format versions.
    Tolerated {
        file_type: FileType,
        correction: &'static str,
    },
    Unknown,
}

const TOLERATED_DATA_TYPES: [(&str, FileType, &str); 4] = [
    (
        "ARGO profile",
        FileType::Profile,
        "DATA_TYPE = 'ARGO profile' non-standard. Change to 'Argo profile'",
    ),
    (
        "ARGO trajectory",
        FileType::Trajectory,
        "DATA_TYPE = 'ARGO trajectory' non-standard. Change to 'Argo trajectory'",
    ),
    (
        "Argo technical",
        FileType::Technical,
        "DATA_TYPE = 'Argo technical' non-standard. Change to 'Argo technical data'",
    ),
    (
        "ARGO technical data",
        FileType::Technical,
        "DATA_TYPE = 'ARGO technical data' non-standard. Change to 'Argo technical data'",
    ),
];

/// Classifies a `DATA_TYPE` value. The comparison is exact; callers trim first.
pub fn classify_data_type(value: &str) -> DataTypeClass {
    if let Some(file_type) = FileType::ALL.into_iter().find(|ft| ft.data_type() == value) {
        return DataTypeClass::Standard(file_type);
    }
    TOLERATED_DATA_TYPES
        .iter()
        .find(|(raw, _, _)| *raw == value)
        .map_or(DataTypeClass::Unknown, |(_, file_type, correction)| {
            DataTypeClass::Tolerated {
                file_type: *file_type,
                correction,
            }
        })
}
