//! Speech input adapter.
//!
//! [`SpeechInput`] runs one recognition attempt at a time on top of a
//! platform [`RecognitionBackend`]. It never retries; deciding when to listen
//! again belongs to the conversation orchestrator.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::error::SpeechError;

// =============================================================================
// Error kinds
// =============================================================================

/// Classification of a recognition failure reported by the platform engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionErrorKind {
    NoMatch,
    Timeout,
    Network,
    Permission,
    Audio,
    Client,
    Busy,
    Server,
    Unknown,
}

impl RecognitionErrorKind {
    /// Kinds that mean "the user said nothing". They end the attempt quietly
    /// instead of surfacing an error.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NoMatch | Self::Timeout)
    }

    /// Map a numeric platform error code onto a kind.
    ///
    /// Codes follow the common mobile recognizer numbering: 1 network
    /// timeout, 2 network, 3 audio, 4 server, 5 client, 6 speech timeout,
    /// 7 no match, 8 busy, 9 insufficient permissions.
    pub fn from_platform_code(code: i32) -> Self {
        match code {
            1 | 2 => Self::Network,
            3 => Self::Audio,
            4 => Self::Server,
            5 => Self::Client,
            6 => Self::Timeout,
            7 => Self::NoMatch,
            8 => Self::Busy,
            9 => Self::Permission,
            _ => Self::Unknown,
        }
    }

    /// User-facing message for this kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoMatch => "Não entendi. Pode repetir?",
            Self::Timeout => "Não ouvi nada.",
            Self::Network => "Erro de rede no reconhecimento de voz.",
            Self::Permission => "Permissão de microfone necessária.",
            Self::Audio => "Erro ao gravar o áudio.",
            Self::Client => "Erro no reconhecimento de voz.",
            Self::Busy => "O reconhecimento de voz está ocupado.",
            Self::Server => "Erro no servidor de reconhecimento de voz.",
            Self::Unknown => "Erro desconhecido no reconhecimento de voz.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMatch => "no_match",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Permission => "permission",
            Self::Audio => "audio",
            Self::Client => "client",
            Self::Busy => "busy",
            Self::Server => "server",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Published state
// =============================================================================

/// Recognition state published to observers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionState {
    #[default]
    Idle,
    Listening,
    /// End of speech detected; waiting for the final transcript.
    Processing,
    Result(String),
    Error(RecognitionErrorKind),
}

/// Terminal outcome of one recognition attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionOutcome {
    Recognized(String),
    /// No speech was captured (no match, speech timeout or empty transcript).
    Silent,
    Failed(RecognitionErrorKind),
}

/// Map a platform RMS level in dB (roughly -2..10) onto 0..1.
pub fn normalize_level(rms_db: f32) -> f32 {
    if rms_db.is_nan() {
        return 0.0;
    }
    ((rms_db + 2.0) / 12.0).clamp(0.0, 1.0)
}

// =============================================================================
// Backend contract
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum RecognitionEvent {
    Ready,
    Level(f32),
    EndOfSpeech,
    Result(String),
    Error(RecognitionErrorKind),
}

/// A callback delivered by the backend, tagged with its attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionSignal {
    pub attempt: u64,
    pub event: RecognitionEvent,
}

/// Callback handle given to the backend for one attempt.
///
/// Cheap to clone and safe to call from any thread. Calls made after the
/// attempt ended are ignored by the adapter.
#[derive(Clone, Debug)]
pub struct RecognitionCallbacks {
    attempt: u64,
    tx: mpsc::UnboundedSender<RecognitionSignal>,
}

impl RecognitionCallbacks {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn ready(&self) {
        self.send(RecognitionEvent::Ready);
    }

    /// Report the current input level in dB.
    pub fn level(&self, rms_db: f32) {
        self.send(RecognitionEvent::Level(rms_db));
    }

    pub fn end_of_speech(&self) {
        self.send(RecognitionEvent::EndOfSpeech);
    }

    pub fn result(&self, text: impl Into<String>) {
        self.send(RecognitionEvent::Result(text.into()));
    }

    pub fn error(&self, kind: RecognitionErrorKind) {
        self.send(RecognitionEvent::Error(kind));
    }

    fn send(&self, event: RecognitionEvent) {
        // The adapter may already be gone during shutdown.
        let _ = self.tx.send(RecognitionSignal {
            attempt: self.attempt,
            event,
        });
    }
}

/// A platform speech recognition engine.
pub trait RecognitionBackend: Send {
    fn is_available(&self) -> bool;

    /// Begin listening. Results are reported through `callbacks`.
    fn begin(&mut self, locale: &str, callbacks: RecognitionCallbacks) -> Result<(), SpeechError>;

    /// Abort the current attempt. Late callbacks are tolerated.
    fn cancel(&mut self);
}

// =============================================================================
// Adapter
// =============================================================================

/// Speech input adapter owning a recognition backend.
pub struct SpeechInput {
    backend: Box<dyn RecognitionBackend>,
    locale: String,
    next_attempt: u64,
    active: Option<u64>,
    signals_tx: mpsc::UnboundedSender<RecognitionSignal>,
    signals_rx: mpsc::UnboundedReceiver<RecognitionSignal>,
    state_tx: watch::Sender<RecognitionState>,
    amplitude_tx: watch::Sender<f32>,
}

impl std::fmt::Debug for SpeechInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechInput")
            .field("locale", &self.locale)
            .field("active", &self.active)
            .field("state", &*self.state_tx.borrow())
            .finish()
    }
}

impl SpeechInput {
    pub fn new(backend: Box<dyn RecognitionBackend>, locale: impl Into<String>) -> Self {
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(RecognitionState::Idle);
        let (amplitude_tx, _) = watch::channel(0.0);
        Self {
            backend,
            locale: locale.into(),
            next_attempt: 1,
            active: None,
            signals_tx,
            signals_rx,
            state_tx,
            amplitude_tx,
        }
    }

    /// Whether a recognition attempt is in flight.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn state(&self) -> watch::Receiver<RecognitionState> {
        self.state_tx.subscribe()
    }

    /// Live input level for the active attempt, normalized to 0..1.
    pub fn amplitude(&self) -> watch::Receiver<f32> {
        self.amplitude_tx.subscribe()
    }

    /// Begin one recognition attempt.
    pub fn start_listening(&mut self) -> Result<(), SpeechError> {
        if !self.backend.is_available() {
            return Err(SpeechError::Unavailable);
        }
        if self.active.is_some() {
            return Err(SpeechError::AlreadyActive);
        }

        let attempt = self.next_attempt;
        self.next_attempt += 1;

        let callbacks = RecognitionCallbacks {
            attempt,
            tx: self.signals_tx.clone(),
        };
        self.backend.begin(&self.locale, callbacks)?;

        self.active = Some(attempt);
        self.state_tx.send_replace(RecognitionState::Listening);
        self.amplitude_tx.send_replace(0.0);
        tracing::debug!(attempt, locale = %self.locale, "Recognition attempt started");
        Ok(())
    }

    /// Cancel the active attempt, if any.
    pub fn stop_listening(&mut self) {
        if let Some(attempt) = self.active.take() {
            self.backend.cancel();
            tracing::debug!(attempt, "Recognition attempt cancelled");
        }
        self.state_tx.send_replace(RecognitionState::Idle);
        self.amplitude_tx.send_replace(0.0);
    }

    /// Wait for the next backend callback. Cancel-safe.
    pub async fn next_signal(&mut self) -> RecognitionSignal {
        match self.signals_rx.recv().await {
            Some(signal) => signal,
            // The adapter holds a sender, so the channel never closes.
            None => std::future::pending().await,
        }
    }

    /// Apply a backend callback. Returns the terminal outcome when the
    /// callback ends the active attempt; callbacks from other attempts are
    /// dropped.
    pub fn handle_signal(&mut self, signal: RecognitionSignal) -> Option<RecognitionOutcome> {
        if self.active != Some(signal.attempt) {
            tracing::trace!(attempt = signal.attempt, "Ignoring stale recognition callback");
            return None;
        }

        match signal.event {
            RecognitionEvent::Ready => {
                tracing::debug!(attempt = signal.attempt, "Recognizer ready for speech");
                None
            }
            RecognitionEvent::Level(db) => {
                self.amplitude_tx.send_replace(normalize_level(db));
                None
            }
            RecognitionEvent::EndOfSpeech => {
                self.state_tx.send_replace(RecognitionState::Processing);
                self.amplitude_tx.send_replace(0.0);
                None
            }
            RecognitionEvent::Result(text) => {
                self.active = None;
                self.amplitude_tx.send_replace(0.0);
                let text = text.trim().to_string();
                if text.is_empty() {
                    tracing::debug!(attempt = signal.attempt, "Empty transcript");
                    self.state_tx.send_replace(RecognitionState::Idle);
                    Some(RecognitionOutcome::Silent)
                } else {
                    tracing::debug!(attempt = signal.attempt, text_len = text.len(), "Speech recognized");
                    self.state_tx
                        .send_replace(RecognitionState::Result(text.clone()));
                    Some(RecognitionOutcome::Recognized(text))
                }
            }
            RecognitionEvent::Error(kind) => {
                self.active = None;
                self.amplitude_tx.send_replace(0.0);
                if kind.is_silent() {
                    tracing::debug!(attempt = signal.attempt, %kind, "No speech captured");
                    self.state_tx.send_replace(RecognitionState::Idle);
                    Some(RecognitionOutcome::Silent)
                } else {
                    tracing::warn!(attempt = signal.attempt, %kind, "Recognition failed");
                    self.state_tx.send_replace(RecognitionState::Error(kind));
                    Some(RecognitionOutcome::Failed(kind))
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
