//! Conversation history.
//!
//! Append-only: utterances are kept in arrival order and never edited,
//! reordered or removed. The full history is available for display; only a
//! bounded window is forwarded to the assistant as context.

use voxa_core::Utterance;
use voxa_remote::ChatTurn;

#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    entries: Vec<Utterance>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an utterance and return a reference to the stored copy.
    pub fn push(&mut self, utterance: Utterance) -> &Utterance {
        self.entries.push(utterance);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Utterance] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Utterance> {
        self.entries.last()
    }

    /// Context for the most recent entry: up to `window` entries preceding
    /// it, oldest first.
    pub fn context_for_latest(&self, window: usize) -> Vec<ChatTurn> {
        let Some(preceding) = self.entries.len().checked_sub(1) else {
            return Vec::new();
        };
        let start = preceding.saturating_sub(window);
        self.entries[start..preceding]
            .iter()
            .map(ChatTurn::from)
            .collect()
    }
}
