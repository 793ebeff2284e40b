use serde::{Deserialize, Serialize};
use thiserror::Error;
use voxa_core::VoxaError;

/// Why a remote call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Host name could not be resolved.
    Dns,
    /// The bounded request timeout elapsed.
    Timeout,
    /// TLS handshake or certificate failure.
    Tls,
    /// Nothing is listening at the configured address.
    ConnectionRefused,
    /// The server answered but declared a failure (non-2xx or no `data`).
    Rejected,
    Other,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dns => "dns",
            Self::Timeout => "timeout",
            Self::Tls => "tls",
            Self::ConnectionRefused => "connection_refused",
            Self::Rejected => "rejected",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed remote call, with a human-readable cause.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RemoteFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RemoteFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Rejected, message)
    }
}

impl From<RemoteFailure> for VoxaError {
    fn from(err: RemoteFailure) -> Self {
        VoxaError::Remote(err.to_string())
    }
}

/// Outcome of every remote call.
pub type RemoteResult<T> = std::result::Result<T, RemoteFailure>;
