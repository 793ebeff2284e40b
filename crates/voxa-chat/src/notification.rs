//! Push notification payloads.
//!
//! Delivery is handled elsewhere; this module turns the flat string map a
//! push carries into a typed [`PushNotification`] and decides whether and
//! what to say aloud.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use voxa_core::clean_for_speech;

/// The recognized notification kinds, with their type-specific fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NotificationKind {
    PaymentReminder { payment_type: Option<String> },
    TaskReminder { priority: Option<String> },
    Checkin { checkin_type: Option<String> },
    VoiceReminder,
    ContextualReminder,
    Alert,
    /// A `type` this client does not know, kept verbatim.
    Other { raw_type: String },
}

impl NotificationKind {
    fn from_payload(data: &HashMap<String, String>) -> Self {
        let field = |key: &str| data.get(key).filter(|v| !v.is_empty()).cloned();
        let raw_type = data.get("type").map(|t| t.trim()).unwrap_or_default();

        match raw_type {
            "payment_reminder" => Self::PaymentReminder {
                payment_type: field("paymentType"),
            },
            "task_reminder" => Self::TaskReminder {
                priority: field("priority"),
            },
            "checkin" => Self::Checkin {
                checkin_type: field("checkinType"),
            },
            "voice_reminder" => Self::VoiceReminder,
            "contextual_reminder" => Self::ContextualReminder,
            "alert" => Self::Alert,
            other => Self::Other {
                raw_type: other.to_string(),
            },
        }
    }

    /// Kinds that are always read aloud.
    pub fn is_spoken_by_default(&self) -> bool {
        matches!(self, Self::VoiceReminder | Self::ContextualReminder)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PaymentReminder { .. } => "payment_reminder",
            Self::TaskReminder { .. } => "task_reminder",
            Self::Checkin { .. } => "checkin",
            Self::VoiceReminder => "voice_reminder",
            Self::ContextualReminder => "contextual_reminder",
            Self::Alert => "alert",
            Self::Other { raw_type } => raw_type,
        }
    }
}

/// A proactive notification pushed by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub body: Option<String>,
    pub speak: bool,
    pub speak_text: Option<String>,
}

impl PushNotification {
    /// Parse a push payload. Unknown keys are ignored; an unknown `type`
    /// becomes [`NotificationKind::Other`].
    pub fn from_payload(data: &HashMap<String, String>) -> Self {
        let field = |key: &str| {
            data.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            kind: NotificationKind::from_payload(data),
            title: field("title"),
            body: field("body"),
            speak: data.get("speak").map(|v| v.trim()) == Some("true"),
            speak_text: field("speakText"),
        }
    }

    /// Whether this notification should be read aloud.
    pub fn should_speak(&self) -> bool {
        self.speak || self.kind.is_spoken_by_default()
    }

    /// The cleaned text to vocalize: `speakText` if present, otherwise
    /// `"{title}. {body}"`. Empty when there is nothing to say.
    pub fn speakable_text(&self) -> String {
        let raw = match (&self.speak_text, &self.title, &self.body) {
            (Some(text), _, _) => text.clone(),
            (None, Some(title), Some(body)) => format!("{title}. {body}"),
            (None, Some(title), None) => title.clone(),
            (None, None, Some(body)) => body.clone(),
            (None, None, None) => String::new(),
        };
        clean_for_speech(&raw)
    }
}
