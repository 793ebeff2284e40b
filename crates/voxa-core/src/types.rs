use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// The conversation turn state.
///
/// Exactly one is active at any instant. `Error` is a transient sub-state of
/// `Idle`: every guard that accepts `Idle` also accepts `Error`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum TurnState {
    #[default]
    Idle,
    Listening,
    Processing,
    Speaking,
    Error(String),
}

impl TurnState {
    /// `Idle` or `Error`.
    pub fn is_idle(&self) -> bool {
        matches!(self, TurnState::Idle | TurnState::Error(_))
    }

    pub fn is_listening(&self) -> bool {
        matches!(self, TurnState::Listening)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, TurnState::Processing)
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self, TurnState::Speaking)
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Idle => write!(f, "idle"),
            TurnState::Listening => write!(f, "listening"),
            TurnState::Processing => write!(f, "processing"),
            TurnState::Speaking => write!(f, "speaking"),
            TurnState::Error(reason) => write!(f, "error: {}", reason),
        }
    }
}

/// Who produced an utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// One message in the conversation. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: Uuid,
    pub text: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
}

impl Utterance {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            role,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn is_from_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Whether speech input re-arms itself after each spoken response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoListenPolicy {
    pub enabled: bool,
}

impl AutoListenPolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for AutoListenPolicy {
    fn default() -> Self {
        Self { enabled: true }
    }
}
