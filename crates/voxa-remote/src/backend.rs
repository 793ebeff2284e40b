use async_trait::async_trait;

use crate::error::{FailureKind, RemoteFailure, RemoteResult};
use crate::types::{Alert, AssistantReply, ChatTurn, Contact, FinancialSummary, ScheduleEntry, TaskItem};

/// The assistant service as seen by the conversation orchestrator.
///
/// Implementations never panic and never retry; every outcome is a
/// [`RemoteResult`]. Only `chat` is required: the data accessors default to
/// an `Other` failure for backends that do not serve them.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Send one user message with the preceding conversation as context.
    async fn chat(&self, message: &str, history: &[ChatTurn]) -> RemoteResult<AssistantReply>;

    async fn tasks(&self) -> RemoteResult<Vec<TaskItem>> {
        Err(unsupported("tasks"))
    }

    async fn schedule(&self) -> RemoteResult<Vec<ScheduleEntry>> {
        Err(unsupported("schedule"))
    }

    async fn financial_summary(&self) -> RemoteResult<FinancialSummary> {
        Err(unsupported("financial summary"))
    }

    async fn alerts(&self) -> RemoteResult<Vec<Alert>> {
        Err(unsupported("alerts"))
    }

    async fn contacts(&self) -> RemoteResult<Vec<Contact>> {
        Err(unsupported("contacts"))
    }
}

fn unsupported(what: &str) -> RemoteFailure {
    RemoteFailure::new(FailureKind::Other, format!("{what} not supported by this backend"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoBackend;

    #[async_trait]
    impl AssistantBackend for EchoBackend {
        async fn chat(&self, message: &str, history: &[ChatTurn]) -> RemoteResult<AssistantReply> {
            Ok(AssistantReply {
                response: format!("{message} ({} turns)", history.len()),
                tools_used: None,
            })
        }
    }

    #[tokio::test]
    async fn test_chat_through_trait_object() {
        let backend: Box<dyn AssistantBackend> = Box::new(EchoBackend);
        let reply = backend.chat("oi", &[]).await.unwrap();
        assert_eq!(reply.response, "oi (0 turns)");
    }

    #[tokio::test]
    async fn test_default_accessors_fail_cleanly() {
        let backend = EchoBackend;
        let err = backend.tasks().await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Other);
        assert!(err.message.contains("tasks"));
        assert!(backend.contacts().await.is_err());
    }
}
