//! Error types for the conversation orchestrator.

use voxa_core::{TurnState, VoxaError};

/// Errors surfaced by the orchestrator and its handle.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error("orchestrator is no longer running")]
    Closed,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("a turn is already being processed")]
    Busy,
    #[error("invalid turn transition: {from} -> {to}")]
    InvalidTransition { from: TurnState, to: TurnState },
    #[error(transparent)]
    Core(#[from] VoxaError),
}

impl From<ChatError> for VoxaError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Core(inner) => inner,
            ChatError::Closed => VoxaError::ShuttingDown,
            other => VoxaError::Orchestrator(other.to_string()),
        }
    }
}
