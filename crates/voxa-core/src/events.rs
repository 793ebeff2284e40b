use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{TurnState, Utterance};

/// How a conversation turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Answered locally by the fast-path matcher.
    FastPath,
    /// Answered by the remote assistant.
    Remote,
    /// The remote call failed; the fallback apology was spoken.
    RemoteFailed,
    /// A stop command ended the turn silently.
    Stopped,
    /// The user cancelled the turn while it was processing.
    Cancelled,
    /// A reply was produced but nothing was left to speak after cleaning.
    Silent,
}

/// Events published by the conversation orchestrator.
///
/// Broadcast to every subscriber (UI layer, console, tests). Subscribers that
/// lag simply miss events; the orchestrator never blocks on them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConversationEvent {
    // =========================================================================
    // Turn state
    // =========================================================================
    /// The turn state machine moved between two states.
    StateChanged {
        from: TurnState,
        to: TurnState,
        timestamp: DateTime<Utc>,
    },

    /// A turn finished.
    TurnCompleted {
        turn_id: Uuid,
        outcome: TurnOutcome,
        timestamp: DateTime<Utc>,
    },

    // =========================================================================
    // History
    // =========================================================================
    /// An utterance was appended to the conversation history.
    UtteranceAppended { utterance: Utterance },

    // =========================================================================
    // Policy & failures
    // =========================================================================
    /// Auto-listen was switched on or off.
    AutoListenChanged {
        enabled: bool,
        timestamp: DateTime<Utc>,
    },

    /// A remote call failed. `kind` is the failure classification.
    RemoteFailed {
        turn_id: Uuid,
        kind: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Speech recognition reported an error.
    RecognitionFailed {
        kind: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    // =========================================================================
    // Announcements
    // =========================================================================
    /// A push notification was received.
    NotificationReceived {
        kind: String,
        title: Option<String>,
        spoken: bool,
        timestamp: DateTime<Utc>,
    },
}

impl ConversationEvent {
    /// When the event happened.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::StateChanged { timestamp, .. }
            | Self::TurnCompleted { timestamp, .. }
            | Self::AutoListenChanged { timestamp, .. }
            | Self::RemoteFailed { timestamp, .. }
            | Self::RecognitionFailed { timestamp, .. }
            | Self::NotificationReceived { timestamp, .. } => *timestamp,
            Self::UtteranceAppended { utterance } => utterance.timestamp,
        }
    }

    /// Stable snake_case name, used in log fields.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::TurnCompleted { .. } => "turn_completed",
            Self::UtteranceAppended { .. } => "utterance_appended",
            Self::AutoListenChanged { .. } => "auto_listen_changed",
            Self::RemoteFailed { .. } => "remote_failed",
            Self::RecognitionFailed { .. } => "recognition_failed",
            Self::NotificationReceived { .. } => "notification_received",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_timestamp() {
        let ts = Utc::now();
        let event = ConversationEvent::StateChanged {
            from: TurnState::Idle,
            to: TurnState::Listening,
            timestamp: ts,
        };
        assert_eq!(event.timestamp(), ts);
    }

    #[test]
    fn test_utterance_event_uses_utterance_timestamp() {
        let utterance = Utterance::user("oi");
        let ts = utterance.timestamp;
        let event = ConversationEvent::UtteranceAppended { utterance };
        assert_eq!(event.timestamp(), ts);
        assert_eq!(event.event_name(), "utterance_appended");
    }

    #[test]
    fn test_event_name() {
        let event = ConversationEvent::TurnCompleted {
            turn_id: Uuid::new_v4(),
            outcome: TurnOutcome::FastPath,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_name(), "turn_completed");
    }

    #[test]
    fn test_event_serialization() {
        let event = ConversationEvent::AutoListenChanged {
            enabled: false,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("AutoListenChanged"));
        assert!(json.contains("\"enabled\":false"));
    }

    #[test]
    fn test_turn_outcome_serialization() {
        let json = serde_json::to_string(&TurnOutcome::RemoteFailed).unwrap();
        assert_eq!(json, "\"remote_failed\"");
    }
}
