//! Voxa remote crate - client for the assistant backend.
//!
//! Every call is a single bounded round trip that returns a value: transport
//! errors, timeouts and server-declared failures all come back as a
//! [`RemoteFailure`] instead of escaping the client.

pub mod backend;
pub mod client;
pub mod error;
pub mod types;

pub use backend::AssistantBackend;
pub use client::RemoteAssistantClient;
pub use error::{FailureKind, RemoteFailure, RemoteResult};
pub use types::{
    Alert, AssistantReply, ChatRequest, ChatTurn, Contact, Envelope, FinancialSummary,
    ScheduleEntry, TaskItem,
};
