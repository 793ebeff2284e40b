//! Remote assistant client contract tests.
//!
//! These tests pin the HTTP contract with the assistant API: request body
//! shape, envelope unwrapping, and how transport failures are classified.

use std::time::Duration;

use serde_json::json;
use voxa_core::{Role, Utterance};
use voxa_remote::{AssistantBackend, ChatTurn, FailureKind, RemoteAssistantClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RemoteAssistantClient {
    RemoteAssistantClient::new(server.uri(), Duration::from_secs(5)).unwrap()
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_sends_message_and_history() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "message": "e amanhã?",
            "conversationHistory": [
                {"role": "user", "content": "quais sao minhas tarefas"},
                {"role": "assistant", "content": "Você tem 2 tarefas."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"response": "Amanhã você tem uma reunião.", "toolsUsed": ["schedule"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let history = vec![
        ChatTurn::from(&Utterance::user("quais sao minhas tarefas")),
        ChatTurn::from(&Utterance::assistant("Você tem 2 tarefas.")),
    ];
    let reply = client_for(&server).chat("e amanhã?", &history).await.unwrap();

    assert_eq!(reply.response, "Amanhã você tem uma reunião.");
    assert_eq!(reply.tools_used, Some(vec!["schedule".to_string()]));
}

#[tokio::test]
async fn test_chat_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"response": "ok"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_api_key("secret-token");
    let reply = client.chat("oi", &[]).await.unwrap();
    assert_eq!(reply.response, "ok");
}

#[tokio::test]
async fn test_envelope_without_data_uses_error_then_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Limite de uso atingido",
            "message": "tente mais tarde"
        })))
        .mount(&server)
        .await;

    let failure = client_for(&server).chat("oi", &[]).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert_eq!(failure.message, "Limite de uso atingido");
}

#[tokio::test]
async fn test_envelope_message_used_when_error_absent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "tente mais tarde"
        })))
        .mount(&server)
        .await;

    let failure = client_for(&server).chat("oi", &[]).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert_eq!(failure.message, "tente mais tarde");
}

#[tokio::test]
async fn test_non_2xx_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let failure = client_for(&server).chat("oi", &[]).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert_eq!(failure.message, "HTTP 503");
}

#[tokio::test]
async fn test_non_2xx_prefers_envelope_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Token inválido"
        })))
        .mount(&server)
        .await;

    let failure = client_for(&server).chat("oi", &[]).await.unwrap_err();
    assert_eq!(failure.message, "Token inválido");
}

#[tokio::test]
async fn test_malformed_body_is_other() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let failure = client_for(&server).chat("oi", &[]).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Other);
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"response": "tarde demais"}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = RemoteAssistantClient::new(server.uri(), Duration::from_millis(200)).unwrap();
    let failure = client.chat("quais sao minhas tarefas", &[]).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn test_closed_port_is_connection_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client =
        RemoteAssistantClient::new(format!("http://127.0.0.1:{port}"), Duration::from_secs(2))
            .unwrap();
    let failure = client.chat("oi", &[]).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::ConnectionRefused);
}

// =============================================================================
// Data endpoints
// =============================================================================

#[tokio::test]
async fn test_tasks_preserve_nullable_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "1", "title": "Pagar luz", "priority": "high", "dueDate": "2026-10-20"},
                {"id": "2", "title": null, "status": "done"}
            ]
        })))
        .mount(&server)
        .await;

    let tasks = client_for(&server).tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].priority.as_deref(), Some("high"));
    assert_eq!(tasks[0].due_date.as_deref(), Some("2026-10-20"));
    assert!(tasks[1].title.is_none());
    assert_eq!(tasks[1].status.as_deref(), Some("done"));
}

#[tokio::test]
async fn test_financial_summary_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/financial/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"balance": 1500.25, "totalExpenses": 320.0}
        })))
        .mount(&server)
        .await;

    let summary = client_for(&server).financial_summary().await.unwrap();
    assert_eq!(summary.balance, Some(1500.25));
    assert_eq!(summary.total_expenses, Some(320.0));
    assert!(summary.total_income.is_none());
}

#[tokio::test]
async fn test_schedule_alerts_and_contacts_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"title": "Dentista", "startTime": "2026-10-18T09:00:00Z"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"title": "Conta vencendo", "severity": "warning", "read": false}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let schedule = client.schedule().await.unwrap();
    assert_eq!(schedule[0].start_time.as_deref(), Some("2026-10-18T09:00:00Z"));

    let alerts = client.alerts().await.unwrap();
    assert_eq!(alerts[0].read, Some(false));

    assert!(client.contacts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_data_endpoint_without_data_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
        .mount(&server)
        .await;

    let failure = client_for(&server).contacts().await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert_eq!(failure.message, "response carried no data");
}

#[test]
fn test_role_wire_names() {
    assert_eq!(Role::User.as_str(), "user");
    assert_eq!(Role::Assistant.as_str(), "assistant");
}
