//! Voxa application binary - composition root.
//!
//! 1. Resolve configuration (file, environment, CLI flags)
//! 2. Install logging
//! 3. Build the remote assistant client and the speech adapters
//! 4. Spawn the conversation orchestrator
//! 5. Run the console loop until `/quit` or end of input

mod cli;
mod console;

use std::collections::HashMap;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use voxa_chat::{ChatError, ConversationOrchestrator, OrchestratorHandle, OrchestratorSettings, PushNotification};
use voxa_core::{normalize_command, ConversationEvent, TurnState, VoxaConfig};
use voxa_remote::{AssistantBackend, RemoteAssistantClient, RemoteResult};
use voxa_speech::{SpeechInput, SpeechOutput};

use cli::CliArgs;
use console::{ConsoleCommand, ConsoleMic, ConsoleRecognizer, ConsoleSynthesizer, HELP};

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print conversation events for the console user.
async fn print_events(mut events: broadcast::Receiver<ConversationEvent>) {
    loop {
        match events.recv().await {
            Ok(ConversationEvent::UtteranceAppended { utterance }) if !utterance.is_from_user() => {
                println!("voxa: {}", utterance.text);
            }
            Ok(ConversationEvent::StateChanged { to, .. }) => match to {
                TurnState::Listening => println!("[listening]"),
                TurnState::Error(reason) => println!("[error] {reason}"),
                _ => {}
            },
            Ok(ConversationEvent::NotificationReceived { kind, title, .. }) => {
                println!("[notification] {kind}: {}", title.unwrap_or_default());
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Console fell behind on events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_data<T: Serialize>(result: RemoteResult<T>) {
    match result {
        Ok(data) => match serde_json::to_string_pretty(&data) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "Could not render response"),
        },
        Err(failure) => println!("[error] {failure}"),
    }
}

fn report(result: Result<(), ChatError>) {
    match result {
        Ok(()) => {}
        Err(ChatError::Busy) => println!("Still working on the previous request."),
        Err(e) => tracing::warn!(error = %e, "Command failed"),
    }
}

/// Build a push payload the way the notification service would send it.
fn simulated_push(kind: String, text: String) -> PushNotification {
    let payload: HashMap<String, String> = [
        ("type".to_string(), kind),
        ("title".to_string(), "Voxa".to_string()),
        ("body".to_string(), text.clone()),
        ("speakText".to_string(), text),
    ]
    .into_iter()
    .collect();
    PushNotification::from_payload(&payload)
}

/// Handle one console line. Returns false when the user asked to quit.
async fn dispatch(
    line: &str,
    handle: &OrchestratorHandle,
    mic: &ConsoleMic,
    client: &RemoteAssistantClient,
    wake_keyword: Option<&str>,
) -> bool {
    match ConsoleCommand::parse(line) {
        ConsoleCommand::Say(text) if text.is_empty() => {
            // An empty line while listening is silence.
            mic.deliver("");
        }
        ConsoleCommand::Say(text) => {
            if wake_keyword.is_some_and(|k| normalize_command(&text) == k) {
                report(handle.wake_word_detected().await);
            } else if !mic.deliver(&text) {
                report(handle.submit_text(text).await);
            }
        }
        ConsoleCommand::Listen => report(handle.start_listening().await),
        ConsoleCommand::Stop => report(handle.stop_listening().await),
        ConsoleCommand::Quiet => report(handle.stop_speaking().await),
        ConsoleCommand::AutoListen(enabled) => report(handle.set_auto_listen(enabled).await),
        ConsoleCommand::Wake => report(handle.wake_word_detected().await),
        ConsoleCommand::Tasks => print_data(client.tasks().await),
        ConsoleCommand::Schedule => print_data(client.schedule().await),
        ConsoleCommand::Finance => print_data(client.financial_summary().await),
        ConsoleCommand::Alerts => print_data(client.alerts().await),
        ConsoleCommand::Contacts => print_data(client.contacts().await),
        ConsoleCommand::History => match handle.history().await {
            Ok(history) => {
                for utterance in history {
                    println!(
                        "{} {}: {}",
                        utterance.timestamp.format("%H:%M:%S"),
                        utterance.role,
                        utterance.text
                    );
                }
            }
            Err(e) => tracing::warn!(error = %e, "History unavailable"),
        },
        ConsoleCommand::Notify { kind, text } => {
            report(handle.notify(simulated_push(kind, text)).await);
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => return false,
        ConsoleCommand::Unknown(input) => println!("Unknown command: {input} (try /help)"),
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config: file, then environment, then flags.
    let config_file = args.resolve_config_path();
    let mut config = VoxaConfig::load_or_default(&config_file);
    config.apply_env_overrides();
    args.apply_to(&mut config);

    init_tracing(&config.general.log_level);
    tracing::info!("Starting Voxa v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Remote assistant.
    let client = Arc::new(RemoteAssistantClient::from_config(&config.remote)?);
    tracing::info!(base_url = client.base_url(), "Assistant client ready");

    // Wake word. The console stands in for the detector, so the keyword is
    // matched against typed lines.
    let wake_keyword = if config.wake_word.enabled {
        if config.wake_word.access_key.is_none() {
            tracing::warn!("Wake word enabled without an access key; a platform detector would refuse to start");
        }
        Some(normalize_command(&config.wake_word.keyword))
    } else {
        None
    };

    // Speech adapters and orchestrator.
    let (recognizer, mic) = ConsoleRecognizer::new();
    let input = SpeechInput::new(Box::new(recognizer), config.voice.locale.clone());
    let output = SpeechOutput::new(Box::new(ConsoleSynthesizer::new()), config.voice.locale.clone());
    let backend: Arc<dyn AssistantBackend> = client.clone();

    let (orchestrator, handle) = ConversationOrchestrator::new(
        input,
        output,
        backend,
        OrchestratorSettings::from(&config.voice),
    );
    tokio::spawn(print_events(handle.subscribe()));
    let orchestrator_task = tokio::spawn(orchestrator.run());

    println!("{HELP}");
    if config.voice.auto_listen {
        report(handle.start_listening().await);
    }

    // Console loop.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !dispatch(&line, &handle, &mic, &client, wake_keyword.as_deref()).await {
            break;
        }
    }

    tracing::info!("Shutting down");
    if let Err(e) = handle.shutdown().await {
        tracing::debug!(error = %e, "Orchestrator already stopped");
    }
    orchestrator_task.await?;
    Ok(())
}
