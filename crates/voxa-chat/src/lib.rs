//! Voxa chat crate - the conversation orchestrator.
//!
//! Arbitrates between listening, processing and speaking: recognized speech
//! becomes a turn, the turn is answered locally or by the remote assistant,
//! the answer is spoken, and listening is re-armed when the policy allows.

pub mod error;
pub mod fast_path;
pub mod history;
pub mod notification;
pub mod orchestrator;
pub mod state;

pub use error::ChatError;
pub use fast_path::{FastPathIntent, FastPathMatch, FastPathMatcher};
pub use history::ConversationHistory;
pub use notification::{NotificationKind, PushNotification};
pub use orchestrator::{
    ConversationOrchestrator, OrchestratorHandle, OrchestratorSettings, CONNECTIVITY_ERROR_TEXT,
    SPOKEN_APOLOGY,
};
pub use state::TurnMachine;
