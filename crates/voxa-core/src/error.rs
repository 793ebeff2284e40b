use thiserror::Error;

/// Top-level error type for the Voxa client.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for VoxaError` so that the `?` operator works
/// across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoxaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Orchestrator error: {0}")]
    Orchestrator(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Shutdown in progress")]
    ShuttingDown,
}

impl From<toml::de::Error> for VoxaError {
    fn from(err: toml::de::Error) -> Self {
        VoxaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoxaError {
    fn from(err: toml::ser::Error) -> Self {
        VoxaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VoxaError {
    fn from(err: serde_json::Error) -> Self {
        VoxaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Voxa operations.
pub type Result<T> = std::result::Result<T, VoxaError>;
