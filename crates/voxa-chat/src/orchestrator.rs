//! Conversation orchestrator.
//!
//! A single task owns the speech adapters, the turn state and the history.
//! Recognition callbacks, synthesis callbacks, remote replies, user commands
//! and the settle timer all arrive on channels and are handled one at a time,
//! so no two of them ever interleave.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;
use uuid::Uuid;

use voxa_core::config::VoiceConfig;
use voxa_core::{
    clean_for_speech, normalize_command, AutoListenPolicy, ConversationEvent, TurnOutcome,
    TurnState, Utterance,
};
use voxa_remote::{AssistantBackend, AssistantReply, RemoteFailure, RemoteResult};
use voxa_speech::{
    OutputEvent, RecognitionErrorKind, RecognitionOutcome, SpeechError, SpeechInput, SpeechOutput,
};

use crate::error::ChatError;
use crate::fast_path::{FastPathMatch, FastPathMatcher};
use crate::history::ConversationHistory;
use crate::notification::PushNotification;
use crate::state::TurnMachine;

/// Appended to the history when the assistant cannot be reached.
pub const CONNECTIVITY_ERROR_TEXT: &str =
    "Desculpe, não consegui me conectar ao servidor. Verifique sua conexão e tente novamente.";

/// Spoken instead of the raw failure when the assistant cannot be reached.
pub const SPOKEN_APOLOGY: &str = "Desculpe, estou com problemas de conexão.";

const COMMAND_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 256;

// =============================================================================
// Settings
// =============================================================================

/// Turn-taking knobs.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub auto_listen: bool,
    /// Pause between speech completion (or a silent attempt) and re-arming.
    pub settle_delay: Duration,
    /// Pause before re-arming after a recognition error.
    pub error_retry_delay: Duration,
    /// Prior history entries forwarded with each chat request.
    pub history_window: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&VoiceConfig::default())
    }
}

impl From<&VoiceConfig> for OrchestratorSettings {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            auto_listen: config.auto_listen,
            settle_delay: config.settle_delay(),
            error_retry_delay: config.error_retry_delay(),
            history_window: config.history_window,
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

#[derive(Debug)]
enum Command {
    StartListening,
    StopListening,
    StopSpeaking,
    SetAutoListen(bool),
    WakeWord,
    SubmitText(String, oneshot::Sender<Result<(), ChatError>>),
    Notify(PushNotification),
    History(oneshot::Sender<Vec<Utterance>>),
    Shutdown,
}

/// Cloneable handle for driving a running orchestrator.
///
/// The orchestrator stops once `shutdown` is called or every handle is
/// dropped.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<TurnState>,
    events: broadcast::Sender<ConversationEvent>,
    speaking: watch::Receiver<bool>,
    amplitude: watch::Receiver<f32>,
}

impl OrchestratorHandle {
    async fn send(&self, command: Command) -> Result<(), ChatError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ChatError::Closed)
    }

    /// Begin listening. Ignored unless idle and not speaking.
    pub async fn start_listening(&self) -> Result<(), ChatError> {
        self.send(Command::StartListening).await
    }

    /// Stop listening, or cancel the turn being processed.
    pub async fn stop_listening(&self) -> Result<(), ChatError> {
        self.send(Command::StopListening).await
    }

    /// Halt speech and go idle without re-arming listening.
    pub async fn stop_speaking(&self) -> Result<(), ChatError> {
        self.send(Command::StopSpeaking).await
    }

    pub async fn set_auto_listen(&self, enabled: bool) -> Result<(), ChatError> {
        self.send(Command::SetAutoListen(enabled)).await
    }

    /// Wake word heard: enable auto-listen and start listening when idle.
    pub async fn wake_word_detected(&self) -> Result<(), ChatError> {
        self.send(Command::WakeWord).await
    }

    /// Process typed text as if it had been recognized.
    pub async fn submit_text(&self, text: impl Into<String>) -> Result<(), ChatError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SubmitText(text.into(), tx)).await?;
        rx.await.map_err(|_| ChatError::Closed)?
    }

    /// Hand over a push notification.
    pub async fn notify(&self, notification: PushNotification) -> Result<(), ChatError> {
        self.send(Command::Notify(notification)).await
    }

    /// Snapshot of the full conversation history.
    pub async fn history(&self) -> Result<Vec<Utterance>, ChatError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::History(tx)).await?;
        rx.await.map_err(|_| ChatError::Closed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> watch::Receiver<TurnState> {
        self.state.clone()
    }

    pub fn speaking(&self) -> watch::Receiver<bool> {
        self.speaking.clone()
    }

    /// Input level of the active recognition attempt, 0..1.
    pub fn amplitude(&self) -> watch::Receiver<f32> {
        self.amplitude.clone()
    }

    pub async fn shutdown(&self) -> Result<(), ChatError> {
        self.send(Command::Shutdown).await
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

#[derive(Debug)]
struct RemoteReply {
    turn_id: Uuid,
    result: RemoteResult<AssistantReply>,
}

/// The conversation orchestrator actor. Create it with [`new`](Self::new),
/// then drive it with [`run`](Self::run) on its own task.
pub struct ConversationOrchestrator {
    input: SpeechInput,
    output: SpeechOutput,
    backend: Arc<dyn AssistantBackend>,
    machine: TurnMachine,
    history: ConversationHistory,
    matcher: FastPathMatcher,
    policy: AutoListenPolicy,
    settings: OrchestratorSettings,
    /// Turn awaiting a remote reply.
    current_turn: Option<Uuid>,
    settle_deadline: Option<Instant>,
    relisten_suppressed: bool,
    deferred_announcements: VecDeque<String>,
    commands_rx: mpsc::Receiver<Command>,
    replies_tx: mpsc::UnboundedSender<RemoteReply>,
    replies_rx: mpsc::UnboundedReceiver<RemoteReply>,
    events_tx: broadcast::Sender<ConversationEvent>,
}

impl ConversationOrchestrator {
    pub fn new(
        input: SpeechInput,
        output: SpeechOutput,
        backend: Arc<dyn AssistantBackend>,
        settings: OrchestratorSettings,
    ) -> (Self, OrchestratorHandle) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let machine = TurnMachine::new();

        let handle = OrchestratorHandle {
            commands: commands_tx,
            state: machine.subscribe(),
            events: events_tx.clone(),
            speaking: output.speaking(),
            amplitude: input.amplitude(),
        };

        let orchestrator = Self {
            input,
            output,
            backend,
            machine,
            history: ConversationHistory::new(),
            matcher: FastPathMatcher::new(),
            policy: AutoListenPolicy::new(settings.auto_listen),
            settings,
            current_turn: None,
            settle_deadline: None,
            relisten_suppressed: false,
            deferred_announcements: VecDeque::new(),
            commands_rx,
            replies_tx,
            replies_rx,
            events_tx,
        };
        (orchestrator, handle)
    }

    /// Run until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        tracing::info!(auto_listen = self.policy.enabled, "Conversation orchestrator started");

        loop {
            tokio::select! {
                command = self.commands_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                signal = self.input.next_signal() => {
                    if let Some(outcome) = self.input.handle_signal(signal) {
                        self.on_recognition(outcome);
                    }
                }
                signal = self.output.next_signal() => {
                    if let Some(OutputEvent::Drained) = self.output.handle_signal(signal) {
                        self.on_speech_drained();
                    }
                }
                Some(reply) = self.replies_rx.recv() => self.on_remote_reply(reply),
                _ = settle(self.settle_deadline) => {
                    self.settle_deadline = None;
                    self.on_settle_elapsed();
                }
            }
        }

        self.input.stop_listening();
        self.output.stop();
        tracing::info!(utterances = self.history.len(), "Conversation orchestrator stopped");
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartListening => {
                self.relisten_suppressed = false;
                self.begin_listening();
            }
            Command::StopListening => self.stop_listening(),
            Command::StopSpeaking => self.stop_speaking(),
            Command::SetAutoListen(enabled) => self.set_auto_listen(enabled),
            Command::WakeWord => {
                tracing::info!("Wake word detected");
                self.set_auto_listen(true);
                self.relisten_suppressed = false;
                self.begin_listening();
            }
            Command::SubmitText(text, reply) => {
                let result = self.submit_text(text);
                let _ = reply.send(result);
            }
            Command::Notify(notification) => self.announce(notification),
            Command::History(reply) => {
                let _ = reply.send(self.history.entries().to_vec());
            }
            // Handled by the run loop.
            Command::Shutdown => {}
        }
    }

    fn begin_listening(&mut self) -> bool {
        if !self.machine.current().is_idle() || self.output.is_speaking() {
            tracing::debug!(state = %self.machine.current(), "Start listening dropped");
            return false;
        }
        self.settle_deadline = None;

        match self.input.start_listening() {
            Ok(()) => self.transition(TurnState::Listening),
            Err(SpeechError::Unavailable) => {
                tracing::warn!("Speech recognition unavailable");
                self.transition(TurnState::Error(SpeechError::Unavailable.to_string()));
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not start listening");
                self.transition(TurnState::Error(e.to_string()));
                self.schedule_auto_relisten(self.settings.error_retry_delay);
                false
            }
        }
    }

    fn stop_listening(&mut self) {
        match self.machine.current() {
            TurnState::Listening => {
                self.input.stop_listening();
                self.transition(TurnState::Idle);
                self.flush_deferred();
            }
            TurnState::Processing => {
                if let Some(turn_id) = self.current_turn.take() {
                    tracing::info!(%turn_id, "Turn cancelled");
                    self.complete_turn(turn_id, TurnOutcome::Cancelled);
                }
                self.transition(TurnState::Idle);
                self.flush_deferred();
            }
            _ => {}
        }
        self.settle_deadline = None;
    }

    fn stop_speaking(&mut self) {
        self.output.stop();
        self.relisten_suppressed = true;
        self.settle_deadline = None;
        if self.machine.current().is_speaking() {
            self.transition(TurnState::Idle);
        }
    }

    fn set_auto_listen(&mut self, enabled: bool) {
        if self.policy.enabled == enabled {
            return;
        }
        self.policy.enabled = enabled;
        if !enabled {
            self.settle_deadline = None;
        }
        tracing::info!(enabled, "Auto-listen changed");
        self.emit(ConversationEvent::AutoListenChanged {
            enabled,
            timestamp: Utc::now(),
        });
    }

    fn submit_text(&mut self, text: String) -> Result<(), ChatError> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        match self.machine.current() {
            TurnState::Processing => return Err(ChatError::Busy),
            TurnState::Listening => self.input.stop_listening(),
            TurnState::Speaking => {
                self.output.stop();
                self.transition(TurnState::Idle);
            }
            TurnState::Idle | TurnState::Error(_) => {}
        }
        self.settle_deadline = None;
        self.relisten_suppressed = false;
        self.begin_turn(text);
        Ok(())
    }

    // =========================================================================
    // Turns
    // =========================================================================

    fn on_recognition(&mut self, outcome: RecognitionOutcome) {
        if !self.machine.current().is_listening() {
            tracing::debug!(state = %self.machine.current(), "Recognition outcome outside listening");
            return;
        }

        match outcome {
            RecognitionOutcome::Recognized(text) => self.begin_turn(text),
            RecognitionOutcome::Silent => {
                self.transition(TurnState::Idle);
                if !self.flush_deferred() {
                    self.schedule_auto_relisten(self.settings.settle_delay);
                }
            }
            RecognitionOutcome::Failed(kind) => {
                self.emit(ConversationEvent::RecognitionFailed {
                    kind: kind.to_string(),
                    message: kind.user_message().to_string(),
                    timestamp: Utc::now(),
                });
                self.transition(TurnState::Error(kind.user_message().to_string()));
                if self.flush_deferred() {
                    return;
                }
                // Retrying without permission would loop forever.
                if kind != RecognitionErrorKind::Permission {
                    self.schedule_auto_relisten(self.settings.error_retry_delay);
                }
            }
        }
    }

    fn begin_turn(&mut self, text: String) {
        if !self.transition(TurnState::Processing) {
            return;
        }
        let turn_id = Uuid::new_v4();
        tracing::info!(%turn_id, text_len = text.len(), "Turn started");
        self.append(Utterance::user(text.clone()));

        let normalized = normalize_command(&text);
        match self.matcher.resolve(&normalized) {
            Some(FastPathMatch::Stop) => {
                tracing::info!(%turn_id, "Stop command");
                self.output.stop();
                self.deferred_announcements.clear();
                self.relisten_suppressed = true;
                self.settle_deadline = None;
                self.transition(TurnState::Idle);
                self.complete_turn(turn_id, TurnOutcome::Stopped);
            }
            Some(FastPathMatch::Reply { intent, text }) => {
                tracing::debug!(%turn_id, ?intent, "Answered locally");
                self.deliver_reply(turn_id, text, TurnOutcome::FastPath);
            }
            None => self.dispatch_remote(turn_id, text),
        }
    }

    fn dispatch_remote(&mut self, turn_id: Uuid, message: String) {
        self.current_turn = Some(turn_id);
        let context = self.history.context_for_latest(self.settings.history_window);
        let backend = Arc::clone(&self.backend);
        let replies = self.replies_tx.clone();

        tracing::debug!(%turn_id, context = context.len(), "Dispatching to assistant");
        tokio::spawn(async move {
            let result = backend.chat(&message, &context).await;
            let _ = replies.send(RemoteReply { turn_id, result });
        });
    }

    fn on_remote_reply(&mut self, reply: RemoteReply) {
        if self.current_turn != Some(reply.turn_id) || !self.machine.current().is_processing() {
            tracing::debug!(turn_id = %reply.turn_id, "Discarding reply for a finished turn");
            return;
        }
        self.current_turn = None;

        match reply.result {
            Ok(answer) => self.deliver_reply(reply.turn_id, answer.response, TurnOutcome::Remote),
            Err(failure) => self.deliver_failure(reply.turn_id, failure),
        }
    }

    fn deliver_reply(&mut self, turn_id: Uuid, text: String, outcome: TurnOutcome) {
        let spoken = clean_for_speech(&text);
        self.append(Utterance::assistant(text));

        if spoken.is_empty() {
            tracing::debug!(%turn_id, "Nothing to say after cleaning");
            self.transition(TurnState::Idle);
            self.complete_turn(turn_id, TurnOutcome::Silent);
            self.flush_deferred();
            return;
        }
        self.speak(&spoken, false);
        self.complete_turn(turn_id, outcome);
    }

    fn deliver_failure(&mut self, turn_id: Uuid, failure: RemoteFailure) {
        tracing::warn!(%turn_id, kind = %failure.kind, error = %failure.message, "Assistant unreachable");
        self.emit(ConversationEvent::RemoteFailed {
            turn_id,
            kind: failure.kind.to_string(),
            message: failure.message,
            timestamp: Utc::now(),
        });
        self.append(Utterance::assistant(CONNECTIVITY_ERROR_TEXT));
        self.speak(SPOKEN_APOLOGY, false);
        self.complete_turn(turn_id, TurnOutcome::RemoteFailed);
    }

    fn complete_turn(&mut self, turn_id: Uuid, outcome: TurnOutcome) {
        tracing::info!(%turn_id, ?outcome, "Turn completed");
        self.emit(ConversationEvent::TurnCompleted {
            turn_id,
            outcome,
            timestamp: Utc::now(),
        });
    }

    // =========================================================================
    // Speech output
    // =========================================================================

    fn speak(&mut self, text: &str, queue_mode: bool) {
        self.output.speak(text, queue_mode);
        if !self.machine.current().is_speaking() {
            self.transition(TurnState::Speaking);
        }
    }

    fn on_speech_drained(&mut self) {
        if !self.machine.current().is_speaking() {
            return;
        }
        self.transition(TurnState::Idle);
        if self.flush_deferred() {
            return;
        }
        self.schedule_auto_relisten(self.settings.settle_delay);
    }

    fn announce(&mut self, notification: PushNotification) {
        let spoken = notification.should_speak();
        self.emit(ConversationEvent::NotificationReceived {
            kind: notification.kind.as_str().to_string(),
            title: notification.title.clone(),
            spoken,
            timestamp: Utc::now(),
        });
        if !spoken {
            return;
        }
        let text = notification.speakable_text();
        if text.is_empty() {
            return;
        }

        match self.machine.current() {
            TurnState::Idle | TurnState::Error(_) => {
                tracing::info!(kind = notification.kind.as_str(), "Announcing notification");
                self.settle_deadline = None;
                self.speak(&text, true);
            }
            TurnState::Speaking => {
                tracing::debug!("Announcement queued behind current speech");
                self.output.speak(&text, true);
            }
            TurnState::Listening | TurnState::Processing => {
                tracing::debug!("Announcement deferred until the turn ends");
                self.deferred_announcements.push_back(text);
            }
        }
    }

    /// Speak announcements held back during a turn. Returns true if anything
    /// started playing.
    fn flush_deferred(&mut self) -> bool {
        if self.deferred_announcements.is_empty() || !self.machine.current().is_idle() {
            return false;
        }
        while let Some(text) = self.deferred_announcements.pop_front() {
            self.speak(&text, true);
        }
        true
    }

    // =========================================================================
    // Auto-listen
    // =========================================================================

    fn schedule_auto_relisten(&mut self, delay: Duration) {
        if self.policy.enabled && !self.relisten_suppressed {
            self.schedule_relisten(delay);
        }
    }

    fn schedule_relisten(&mut self, delay: Duration) {
        if self.settle_deadline.is_none() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Relisten scheduled");
            self.settle_deadline = Some(Instant::now() + delay);
        }
    }

    fn on_settle_elapsed(&mut self) {
        if self.relisten_suppressed || !self.policy.enabled {
            return;
        }
        self.begin_listening();
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    fn transition(&mut self, target: TurnState) -> bool {
        match self.machine.transition(target.clone()) {
            Ok(from) => {
                self.emit(ConversationEvent::StateChanged {
                    from,
                    to: target,
                    timestamp: Utc::now(),
                });
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Turn transition rejected");
                false
            }
        }
    }

    fn append(&mut self, utterance: Utterance) {
        let stored = self.history.push(utterance).clone();
        self.emit(ConversationEvent::UtteranceAppended { utterance: stored });
    }

    fn emit(&self, event: ConversationEvent) {
        tracing::trace!(event = event.event_name(), "Conversation event");
        // No subscribers is fine.
        let _ = self.events_tx.send(event);
    }
}

async fn settle(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use voxa_speech::testing::{InstantSynthesizer, ScriptedRecognizer};

    struct Unreachable;

    #[async_trait::async_trait]
    impl AssistantBackend for Unreachable {
        async fn chat(
            &self,
            _message: &str,
            _history: &[voxa_remote::ChatTurn],
        ) -> RemoteResult<AssistantReply> {
            Err(RemoteFailure::new(voxa_remote::FailureKind::Dns, "no such host"))
        }
    }

    fn orchestrator() -> ConversationOrchestrator {
        let (recognizer, _) = ScriptedRecognizer::new();
        let (synth, _) = InstantSynthesizer::manual();
        let (orch, _handle) = ConversationOrchestrator::new(
            SpeechInput::new(Box::new(recognizer), "pt-BR"),
            SpeechOutput::new(Box::new(synth), "pt-BR"),
            Arc::new(Unreachable),
            OrchestratorSettings::default(),
        );
        orch
    }

    #[test]
    fn test_settings_from_voice_config() {
        let config = VoiceConfig {
            auto_listen: false,
            settle_delay_ms: 100,
            error_retry_delay_ms: 900,
            history_window: 3,
            locale: "pt-BR".into(),
        };
        let settings = OrchestratorSettings::from(&config);
        assert!(!settings.auto_listen);
        assert_eq!(settings.settle_delay, Duration::from_millis(100));
        assert_eq!(settings.error_retry_delay, Duration::from_millis(900));
        assert_eq!(settings.history_window, 3);
    }

    #[tokio::test]
    async fn test_stale_reply_is_discarded() {
        let mut orch = orchestrator();
        orch.submit_text("qual meu saldo".into()).unwrap();
        assert!(orch.machine.current().is_processing());
        let live_turn = orch.current_turn.unwrap();

        orch.on_remote_reply(RemoteReply {
            turn_id: Uuid::new_v4(),
            result: Ok(AssistantReply {
                response: "resposta velha".into(),
                tools_used: None,
            }),
        });
        assert!(orch.machine.current().is_processing());
        assert_eq!(orch.history.len(), 1);
        assert_eq!(orch.current_turn, Some(live_turn));
    }

    #[tokio::test]
    async fn test_cancelled_turn_ignores_late_reply() {
        let mut orch = orchestrator();
        orch.submit_text("qual meu saldo".into()).unwrap();
        let turn_id = orch.current_turn.unwrap();

        orch.stop_listening();
        assert_eq!(*orch.machine.current(), TurnState::Idle);

        orch.on_remote_reply(RemoteReply {
            turn_id,
            result: Ok(AssistantReply {
                response: "tarde demais".into(),
                tools_used: None,
            }),
        });
        assert_eq!(*orch.machine.current(), TurnState::Idle);
        assert_eq!(orch.history.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_while_processing_is_busy() {
        let mut orch = orchestrator();
        orch.submit_text("qual meu saldo".into()).unwrap();
        assert!(matches!(
            orch.submit_text("e minhas tarefas".into()),
            Err(ChatError::Busy)
        ));
        assert!(matches!(orch.submit_text("   ".into()), Err(ChatError::EmptyMessage)));
    }

    #[tokio::test]
    async fn test_announcement_deferred_during_turn() {
        let mut orch = orchestrator();
        orch.submit_text("qual meu saldo".into()).unwrap();

        let mut payload = std::collections::HashMap::new();
        payload.insert("type".to_string(), "voice_reminder".to_string());
        payload.insert("speakText".to_string(), "Hora do remédio".to_string());
        orch.announce(PushNotification::from_payload(&payload));

        assert_eq!(orch.deferred_announcements.len(), 1);
        assert!(orch.machine.current().is_processing());

        orch.stop_listening();
        assert!(orch.deferred_announcements.is_empty());
        assert!(orch.machine.current().is_speaking());
    }

    #[tokio::test]
    async fn test_silent_reply_returns_to_idle() {
        let mut orch = orchestrator();
        orch.submit_text("mostre um emoji".into()).unwrap();
        let turn_id = orch.current_turn.unwrap();

        orch.on_remote_reply(RemoteReply {
            turn_id,
            result: Ok(AssistantReply {
                response: "🎉".into(),
                tools_used: None,
            }),
        });
        assert_eq!(*orch.machine.current(), TurnState::Idle);
        // Full reply is still recorded
        assert_eq!(orch.history.last().map(|u| u.text.as_str()), Some("🎉"));
        assert!(!orch.output.is_speaking());
    }
}
