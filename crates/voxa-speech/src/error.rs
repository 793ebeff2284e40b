use thiserror::Error;
use voxa_core::VoxaError;

/// Errors returned synchronously by the speech adapters.
///
/// Asynchronous engine failures are reported through the adapters' event
/// channels instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("Speech recognition is not available")]
    Unavailable,

    #[error("A recognition attempt is already active")]
    AlreadyActive,

    #[error("Speech engine error: {0}")]
    Engine(String),
}

impl From<SpeechError> for VoxaError {
    fn from(err: SpeechError) -> Self {
        VoxaError::Speech(err.to_string())
    }
}
