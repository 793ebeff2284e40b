//! Speech output adapter.
//!
//! [`SpeechOutput`] vocalizes at most one utterance at a time through a
//! [`SynthesisBackend`], keeps a FIFO queue behind it, and reports a single
//! [`OutputEvent::Drained`] once the queue has fully played out.

use std::collections::VecDeque;

use tokio::sync::{mpsc, watch};

use crate::error::SpeechError;

/// Identifies one utterance handed to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl std::fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "utt-{}", self.0)
    }
}

/// Synthesis engine lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

/// A callback delivered by the synthesis backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SynthesisSignal {
    Ready,
    InitFailed(String),
    Started(UtteranceId),
    Finished(UtteranceId),
    Failed(UtteranceId, String),
}

/// What the adapter reports to its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputEvent {
    /// The last queued utterance completed and nothing is left to say.
    Drained,
}

/// Callback handle given to the backend at initialization.
#[derive(Clone, Debug)]
pub struct SynthesisCallbacks {
    tx: mpsc::UnboundedSender<SynthesisSignal>,
}

impl SynthesisCallbacks {
    pub fn ready(&self) {
        self.send(SynthesisSignal::Ready);
    }

    pub fn init_failed(&self, reason: impl Into<String>) {
        self.send(SynthesisSignal::InitFailed(reason.into()));
    }

    pub fn started(&self, id: UtteranceId) {
        self.send(SynthesisSignal::Started(id));
    }

    pub fn finished(&self, id: UtteranceId) {
        self.send(SynthesisSignal::Finished(id));
    }

    pub fn failed(&self, id: UtteranceId, reason: impl Into<String>) {
        self.send(SynthesisSignal::Failed(id, reason.into()));
    }

    fn send(&self, signal: SynthesisSignal) {
        let _ = self.tx.send(signal);
    }
}

/// A platform text-to-speech engine.
pub trait SynthesisBackend: Send {
    /// Start engine initialization. Completion is reported through
    /// `callbacks.ready()` or `callbacks.init_failed()`.
    fn initialize(&mut self, locale: &str, callbacks: SynthesisCallbacks);

    /// Start vocalizing `text`. Progress is reported with `id`.
    fn vocalize(&mut self, id: UtteranceId, text: &str) -> Result<(), SpeechError>;

    /// Stop whatever is playing. Late callbacks are tolerated.
    fn halt(&mut self);
}

/// Speech output adapter owning a synthesis backend.
pub struct SpeechOutput {
    backend: Box<dyn SynthesisBackend>,
    locale: String,
    engine: EngineState,
    pending: VecDeque<String>,
    current: Option<UtteranceId>,
    next_id: u64,
    signals_tx: mpsc::UnboundedSender<SynthesisSignal>,
    signals_rx: mpsc::UnboundedReceiver<SynthesisSignal>,
    speaking_tx: watch::Sender<bool>,
}

impl std::fmt::Debug for SpeechOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechOutput")
            .field("engine", &self.engine)
            .field("pending", &self.pending.len())
            .field("current", &self.current)
            .finish()
    }
}

impl SpeechOutput {
    pub fn new(backend: Box<dyn SynthesisBackend>, locale: impl Into<String>) -> Self {
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let (speaking_tx, _) = watch::channel(false);
        Self {
            backend,
            locale: locale.into(),
            engine: EngineState::Uninitialized,
            pending: VecDeque::new(),
            current: None,
            next_id: 1,
            signals_tx,
            signals_rx,
            speaking_tx,
        }
    }

    /// True while an utterance is playing or text is waiting to be played.
    pub fn is_speaking(&self) -> bool {
        self.current.is_some() || !self.pending.is_empty()
    }

    pub fn speaking(&self) -> watch::Receiver<bool> {
        self.speaking_tx.subscribe()
    }

    pub fn engine_state(&self) -> &EngineState {
        &self.engine
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Speak `text`.
    ///
    /// When idle, playback starts at once. While speaking, `queue_mode`
    /// appends to the queue and otherwise the current utterance and queue are
    /// replaced. Text arriving before the engine is ready is buffered.
    pub fn speak(&mut self, text: &str, queue_mode: bool) {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty speech request");
            return;
        }

        match self.engine {
            EngineState::Uninitialized | EngineState::Failed(_) => {
                self.pending.push_back(text.to_string());
                self.initialize();
            }
            EngineState::Initializing => {
                self.pending.push_back(text.to_string());
            }
            EngineState::Ready => {
                if self.current.is_none() {
                    self.pending.clear();
                    self.pending.push_back(text.to_string());
                    self.start_next();
                } else if queue_mode {
                    tracing::debug!(queued = self.pending.len() + 1, "Speech queued");
                    self.pending.push_back(text.to_string());
                } else {
                    tracing::debug!("Interrupting current speech");
                    self.backend.halt();
                    self.current = None;
                    self.pending.clear();
                    self.pending.push_back(text.to_string());
                    self.start_next();
                }
            }
        }
        self.publish_speaking();
    }

    /// Flush the queue and halt playback immediately.
    pub fn stop(&mut self) {
        let had_speech = self.is_speaking();
        self.pending.clear();
        self.current = None;
        self.backend.halt();
        if had_speech {
            tracing::debug!("Speech stopped");
        }
        self.publish_speaking();
    }

    /// Wait for the next backend callback. Cancel-safe.
    pub async fn next_signal(&mut self) -> SynthesisSignal {
        match self.signals_rx.recv().await {
            Some(signal) => signal,
            // The adapter holds a sender, so the channel never closes.
            None => std::future::pending().await,
        }
    }

    /// Apply a backend callback. Returns [`OutputEvent::Drained`] when the
    /// last utterance completes.
    pub fn handle_signal(&mut self, signal: SynthesisSignal) -> Option<OutputEvent> {
        match signal {
            SynthesisSignal::Ready => {
                if self.engine != EngineState::Initializing {
                    return None;
                }
                tracing::info!(locale = %self.locale, "Speech synthesis ready");
                self.engine = EngineState::Ready;
                if self.current.is_none() && !self.pending.is_empty() {
                    self.start_next();
                }
                self.publish_speaking();
                None
            }
            SynthesisSignal::InitFailed(reason) => {
                if self.engine != EngineState::Initializing {
                    return None;
                }
                tracing::warn!(reason = %reason, dropped = self.pending.len(), "Speech synthesis failed to initialize");
                self.engine = EngineState::Failed(reason);
                // Buffered text terminates as if it had been spoken.
                let had_pending = !self.pending.is_empty();
                self.pending.clear();
                self.publish_speaking();
                had_pending.then_some(OutputEvent::Drained)
            }
            SynthesisSignal::Started(id) => {
                if self.current == Some(id) {
                    tracing::debug!(%id, "Utterance started");
                }
                None
            }
            SynthesisSignal::Finished(id) => self.complete(id, None),
            SynthesisSignal::Failed(id, reason) => self.complete(id, Some(reason)),
        }
    }

    fn complete(&mut self, id: UtteranceId, failure: Option<String>) -> Option<OutputEvent> {
        if self.current != Some(id) {
            tracing::trace!(%id, "Ignoring stale synthesis callback");
            return None;
        }
        match failure {
            Some(reason) => tracing::warn!(%id, reason = %reason, "Utterance failed"),
            None => tracing::debug!(%id, "Utterance finished"),
        }
        self.current = None;

        if !self.pending.is_empty() {
            self.start_next();
            self.publish_speaking();
            return None;
        }
        self.publish_speaking();
        Some(OutputEvent::Drained)
    }

    fn initialize(&mut self) {
        tracing::debug!(locale = %self.locale, "Initializing speech synthesis");
        self.engine = EngineState::Initializing;
        let callbacks = SynthesisCallbacks {
            tx: self.signals_tx.clone(),
        };
        self.backend.initialize(&self.locale, callbacks);
    }

    fn start_next(&mut self) {
        let Some(text) = self.pending.pop_front() else {
            return;
        };
        let id = UtteranceId(self.next_id);
        self.next_id += 1;
        self.current = Some(id);

        tracing::debug!(%id, text_len = text.len(), "Vocalizing utterance");
        if let Err(e) = self.backend.vocalize(id, &text) {
            // Surfaces through the normal completion path.
            let _ = self
                .signals_tx
                .send(SynthesisSignal::Failed(id, e.to_string()));
        }
    }

    fn publish_speaking(&self) {
        let speaking = self.is_speaking();
        self.speaking_tx.send_if_modified(|current| {
            if *current != speaking {
                *current = speaking;
                true
            } else {
                false
            }
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
