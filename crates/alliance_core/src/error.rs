use thiserror::Error;

/// Configuration rejected at load or validation time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported config format: {path}")]
    UnsupportedFormat { path: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AllianceError {
    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("Record source failed: {0}")]
    Source(String),
}

impl AllianceError {
    /// Source failures may succeed on the next refresh; the rest will not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AllianceError::Source(_))
    }
}

pub type Result<T> = std::result::Result<T, AllianceError>;
