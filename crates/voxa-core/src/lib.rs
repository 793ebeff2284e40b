//! Shared domain types, configuration and text shaping for the Voxa voice
//! assistant client.

pub mod config;
pub mod error;
pub mod events;
pub mod text;
pub mod types;

pub use config::VoxaConfig;
pub use error::{Result, VoxaError};
pub use events::{ConversationEvent, TurnOutcome};
pub use text::{clean_for_speech, normalize_command};
pub use types::*;
