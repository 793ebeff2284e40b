//! Wire types for the assistant API.
//!
//! Every response is wrapped in an [`Envelope`]. Domain records keep every
//! field optional because the backend omits or nulls them freely; fields the
//! client does not know about are kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use voxa_core::{Role, Utterance};

// =============================================================================
// Envelope
// =============================================================================

/// `{ data?, error?, message? }` wrapper used by every endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// The failure text the server supplied, preferring `error` over
    /// `message`. Blank strings count as absent.
    pub fn failure_text(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

// =============================================================================
// Chat
// =============================================================================

/// One prior message forwarded as context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Utterance> for ChatTurn {
    fn from(utterance: &Utterance) -> Self {
        Self {
            role: utterance.role,
            content: utterance.text.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<ChatTurn>,
}

/// The assistant's answer to a chat message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<String>>,
}

// =============================================================================
// Domain records
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskItem {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialSummary {
    pub balance: Option<f64>,
    pub total_income: Option<f64>,
    pub total_expenses: Option<f64>,
    pub pending_payments: Option<u32>,
    pub currency: Option<String>,
    pub period: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Alert {
    pub id: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub severity: Option<String>,
    pub read: Option<bool>,
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub relationship: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
