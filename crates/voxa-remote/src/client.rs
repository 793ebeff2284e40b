//! HTTP implementation of [`AssistantBackend`].

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use voxa_core::config::RemoteConfig;

use crate::backend::AssistantBackend;
use crate::error::{FailureKind, RemoteFailure, RemoteResult};
use crate::types::{
    Alert, AssistantReply, ChatRequest, ChatTurn, Contact, Envelope, FinancialSummary,
    ScheduleEntry, TaskItem,
};

/// Client for the assistant REST API.
///
/// Constructed once by the composition root and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RemoteAssistantClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl RemoteAssistantClient {
    /// Build a client for `base_url` with a bound on every request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteFailure::new(FailureKind::Other, format!("HTTP client setup failed: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            api_key: None,
            timeout,
        })
    }

    pub fn from_config(config: &RemoteConfig) -> RemoteResult<Self> {
        let client = Self::new(&config.base_url, config.timeout())?;
        Ok(match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => client.with_api_key(key),
            None => client,
        })
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> RemoteResult<T> {
        let request = self.authorize(self.http.get(self.url(path)));
        self.execute(path, request).await
    }

    /// Send the request and unwrap the response envelope.
    async fn execute<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> RemoteResult<T> {
        tracing::debug!(path, "Remote request");

        let response = request.send().await.map_err(|e| self.transport_failure(path, &e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_failure(path, &e))?;

        if !status.is_success() {
            let text = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|env| env.failure_text().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!(path, status = status.as_u16(), "Remote call rejected");
            return Err(RemoteFailure::rejected(text));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(path, error = %e, "Malformed response body");
            RemoteFailure::new(FailureKind::Other, format!("invalid response: {e}"))
        })?;

        match envelope.data {
            Some(data) => Ok(data),
            None => {
                let text = envelope
                    .failure_text()
                    .unwrap_or("response carried no data")
                    .to_string();
                tracing::warn!(path, reason = %text, "Remote call returned no data");
                Err(RemoteFailure::rejected(text))
            }
        }
    }

    fn transport_failure(&self, path: &str, err: &reqwest::Error) -> RemoteFailure {
        let kind = classify_reqwest_error(err);
        let message = match kind {
            FailureKind::Timeout => format!("request timed out after {:?}", self.timeout),
            _ => error_chain(err),
        };
        tracing::warn!(path, %kind, error = %message, "Remote call failed");
        RemoteFailure::new(kind, message)
    }
}

#[async_trait]
impl AssistantBackend for RemoteAssistantClient {
    async fn chat(&self, message: &str, history: &[ChatTurn]) -> RemoteResult<AssistantReply> {
        let body = ChatRequest {
            message: message.to_string(),
            conversation_history: history.to_vec(),
        };
        let request = self.authorize(self.http.post(self.url("/api/chat")).json(&body));
        let reply: AssistantReply = self.execute("/api/chat", request).await?;
        tracing::info!(
            response_len = reply.response.len(),
            tools = reply.tools_used.as_ref().map_or(0, Vec::len),
            "Assistant replied"
        );
        Ok(reply)
    }

    async fn tasks(&self) -> RemoteResult<Vec<TaskItem>> {
        self.get("/api/tasks").await
    }

    async fn schedule(&self) -> RemoteResult<Vec<ScheduleEntry>> {
        self.get("/api/schedule").await
    }

    async fn financial_summary(&self) -> RemoteResult<FinancialSummary> {
        self.get("/api/financial/summary").await
    }

    async fn alerts(&self) -> RemoteResult<Vec<Alert>> {
        self.get("/api/alerts").await
    }

    async fn contacts(&self) -> RemoteResult<Vec<Contact>> {
        self.get("/api/contacts").await
    }
}

// =============================================================================
// Failure classification
// =============================================================================

fn classify_reqwest_error(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        return FailureKind::Timeout;
    }

    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => return FailureKind::ConnectionRefused,
                std::io::ErrorKind::TimedOut => return FailureKind::Timeout,
                _ => {}
            }
        }
        source = cause.source();
    }

    classify_message(&error_chain(err))
}

/// Classify a transport error from its rendered message chain.
pub fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["dns error", "failed to lookup address", "name or service not known", "no such host", "nodename nor servname"]) {
        FailureKind::Dns
    } else if has(&["timed out", "timeout"]) {
        FailureKind::Timeout
    } else if has(&["certificate", "tls", "ssl", "handshake"]) {
        FailureKind::Tls
    } else if has(&["connection refused"]) {
        FailureKind::ConnectionRefused
    } else {
        FailureKind::Other
    }
}

/// `outer: inner: root` rendering of an error and its sources.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_dns() {
        assert_eq!(
            classify_message("error sending request: client error (Connect): dns error: failed to lookup address information: Name or service not known"),
            FailureKind::Dns
        );
        assert_eq!(classify_message("No such host is known"), FailureKind::Dns);
    }

    #[test]
    fn test_classify_timeout() {
        assert_eq!(classify_message("operation timed out"), FailureKind::Timeout);
    }

    #[test]
    fn test_classify_tls() {
        assert_eq!(
            classify_message("invalid peer certificate: UnknownIssuer"),
            FailureKind::Tls
        );
        assert_eq!(classify_message("TLS handshake eof"), FailureKind::Tls);
    }

    #[test]
    fn test_classify_connection_refused() {
        assert_eq!(
            classify_message("tcp connect error: Connection refused (os error 111)"),
            FailureKind::ConnectionRefused
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify_message("connection reset by peer"), FailureKind::Other);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            RemoteAssistantClient::new("https://api.example.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.url("/api/chat"), "https://api.example.com/api/chat");
    }

    #[test]
    fn test_from_config_ignores_empty_key() {
        let config = RemoteConfig {
            api_key: Some(String::new()),
            ..RemoteConfig::default()
        };
        let client = RemoteAssistantClient::from_config(&config).unwrap();
        assert!(client.api_key.is_none());
    }
}
