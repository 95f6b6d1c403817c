//! Error types for TypeScript generation

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::Category;

/// Result type alias for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Error type for generator operations
///
/// Only run-level failures live here. A single type that fails to load is
/// reported as a [`LoadFailure`](crate::discovery::LoadFailure) and skipped.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// A non-empty category has no converter configured
    #[error("{category} converter is not set")]
    MissingConverter { category: Category },

    /// Discovery input was produced by a host this build cannot read
    #[error("unsupported host: {0}")]
    UnsupportedHost(String),

    /// The discovery collaborator could not produce descriptors at all
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// Reading or writing a file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A filter specification cannot be built
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl GeneratorError {
    /// Returns a stable code, used by the CLI as its exit status
    pub fn error_code(&self) -> u32 {
        match self {
            GeneratorError::MissingConverter { .. } => 2,
            GeneratorError::Discovery(_) => 3,
            GeneratorError::Io { .. } => 4,
            GeneratorError::Serialization(_) => 5,
            GeneratorError::Config(_) => 6,
            GeneratorError::InvalidFilter(_) => 7,
            GeneratorError::UnsupportedHost(_) => 8,
        }
    }

    /// Whether the error reflects caller setup rather than input data
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GeneratorError::MissingConverter { .. }
                | GeneratorError::UnsupportedHost(_)
                | GeneratorError::Config(_)
                | GeneratorError::InvalidFilter(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeneratorError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for GeneratorError {
    fn from(err: toml::de::Error) -> Self {
        GeneratorError::Config(err.to_string())
    }
}
