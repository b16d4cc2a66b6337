use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid data file dump: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid attribute regex for '{variable}:{attribute}': {source}")]
    InvalidRegex {
        variable: String,
        attribute: String,
        #[source]
        source: regex::Error,
    },
    #[error("specification {spec}: {message}")]
    InvalidSpec { spec: String, message: String },
    #[error("variable {variable}: {found} values do not fit dimensions ({expected} expected)")]
    ShapeMismatch {
        variable: String,
        expected: usize,
        found: usize,
    },
    #[error("variable {variable}: unknown dimension '{dimension}'")]
    UnknownDimension { variable: String, dimension: String },
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
