//! In-memory speech backends for tests and demos.
//!
//! [`ScriptedRecognizer`] plays back a queue of recognition steps, one per
//! attempt. [`InstantSynthesizer`] records what it was asked to say and
//! finishes each utterance immediately (or on demand in manual mode). Both
//! come with a cloneable handle the test keeps after moving the backend into
//! its adapter.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SpeechError;
use crate::input::{RecognitionBackend, RecognitionCallbacks, RecognitionErrorKind};
use crate::output::{SynthesisBackend, SynthesisCallbacks, UtteranceId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Recognition
// =============================================================================

/// What the scripted recognizer does on one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionStep {
    /// Report a final transcript.
    Say(String),
    /// Report an error of this kind.
    Fail(RecognitionErrorKind),
    /// Stay silent until cancelled.
    Hang,
}

impl RecognitionStep {
    pub fn say(text: impl Into<String>) -> Self {
        Self::Say(text.into())
    }
}

#[derive(Debug)]
struct RecognizerState {
    available: bool,
    script: VecDeque<RecognitionStep>,
    begins: usize,
    cancels: usize,
    last_callbacks: Option<RecognitionCallbacks>,
}

/// Recognition backend driven by a script of [`RecognitionStep`]s.
///
/// Once the script runs out every attempt hangs.
#[derive(Debug)]
pub struct ScriptedRecognizer {
    state: Arc<Mutex<RecognizerState>>,
}

/// Test-side view of a [`ScriptedRecognizer`].
#[derive(Clone, Debug)]
pub struct RecognizerHandle {
    state: Arc<Mutex<RecognizerState>>,
}

impl ScriptedRecognizer {
    pub fn new() -> (Self, RecognizerHandle) {
        let state = Arc::new(Mutex::new(RecognizerState {
            available: true,
            script: VecDeque::new(),
            begins: 0,
            cancels: 0,
            last_callbacks: None,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            RecognizerHandle { state },
        )
    }
}

impl RecognitionBackend for ScriptedRecognizer {
    fn is_available(&self) -> bool {
        lock(&self.state).available
    }

    fn begin(&mut self, _locale: &str, callbacks: RecognitionCallbacks) -> Result<(), SpeechError> {
        let mut state = lock(&self.state);
        state.begins += 1;
        state.last_callbacks = Some(callbacks.clone());
        let step = state.script.pop_front().unwrap_or(RecognitionStep::Hang);
        drop(state);

        match step {
            RecognitionStep::Say(text) => {
                callbacks.ready();
                callbacks.end_of_speech();
                callbacks.result(text);
            }
            RecognitionStep::Fail(kind) => {
                callbacks.ready();
                callbacks.error(kind);
            }
            RecognitionStep::Hang => callbacks.ready(),
        }
        Ok(())
    }

    fn cancel(&mut self) {
        lock(&self.state).cancels += 1;
    }
}

impl RecognizerHandle {
    /// Append a step for a future attempt.
    pub fn push(&self, step: RecognitionStep) {
        lock(&self.state).script.push_back(step);
    }

    pub fn set_available(&self, available: bool) {
        lock(&self.state).available = available;
    }

    /// Number of attempts started.
    pub fn begins(&self) -> usize {
        lock(&self.state).begins
    }

    pub fn cancels(&self) -> usize {
        lock(&self.state).cancels
    }

    /// Callbacks of the most recent attempt, for driving it by hand.
    pub fn last_callbacks(&self) -> Option<RecognitionCallbacks> {
        lock(&self.state).last_callbacks.clone()
    }
}

// =============================================================================
// Synthesis
// =============================================================================

#[derive(Debug, Default)]
struct SynthesizerState {
    auto_finish: bool,
    fail_init: bool,
    duplicate_finished: bool,
    failing_texts: Vec<String>,
    spoken: Vec<String>,
    halts: usize,
    initializations: usize,
    current: Option<UtteranceId>,
    callbacks: Option<SynthesisCallbacks>,
}

/// Synthesis backend that records requested text.
#[derive(Debug)]
pub struct InstantSynthesizer {
    state: Arc<Mutex<SynthesizerState>>,
}

/// Test-side view of an [`InstantSynthesizer`].
#[derive(Clone, Debug)]
pub struct SynthesizerHandle {
    state: Arc<Mutex<SynthesizerState>>,
}

impl InstantSynthesizer {
    /// Every utterance finishes as soon as it starts.
    pub fn new() -> (Self, SynthesizerHandle) {
        Self::with_auto_finish(true)
    }

    /// Utterances stay in progress until the handle finishes them.
    pub fn manual() -> (Self, SynthesizerHandle) {
        Self::with_auto_finish(false)
    }

    fn with_auto_finish(auto_finish: bool) -> (Self, SynthesizerHandle) {
        let state = Arc::new(Mutex::new(SynthesizerState {
            auto_finish,
            ..SynthesizerState::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            SynthesizerHandle { state },
        )
    }
}

impl SynthesisBackend for InstantSynthesizer {
    fn initialize(&mut self, _locale: &str, callbacks: SynthesisCallbacks) {
        let mut state = lock(&self.state);
        state.initializations += 1;
        if state.fail_init {
            callbacks.init_failed("engine unavailable");
        } else {
            callbacks.ready();
        }
        state.callbacks = Some(callbacks);
    }

    fn vocalize(&mut self, id: UtteranceId, text: &str) -> Result<(), SpeechError> {
        let mut state = lock(&self.state);
        if state.failing_texts.iter().any(|t| t == text) {
            return Err(SpeechError::Engine(format!("cannot vocalize {text:?}")));
        }
        state.spoken.push(text.to_string());
        state.current = Some(id);

        let Some(callbacks) = state.callbacks.clone() else {
            return Err(SpeechError::Engine("not initialized".into()));
        };
        callbacks.started(id);
        if state.auto_finish {
            state.current = None;
            callbacks.finished(id);
            if state.duplicate_finished {
                callbacks.finished(id);
            }
        }
        Ok(())
    }

    fn halt(&mut self) {
        let mut state = lock(&self.state);
        state.halts += 1;
        state.current = None;
    }
}

impl SynthesizerHandle {
    /// Texts vocalized so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        lock(&self.state).spoken.clone()
    }

    pub fn halts(&self) -> usize {
        lock(&self.state).halts
    }

    pub fn initializations(&self) -> usize {
        lock(&self.state).initializations
    }

    pub fn fail_init(&self, fail: bool) {
        lock(&self.state).fail_init = fail;
    }

    /// Make `vocalize` reject this exact text.
    pub fn fail_text(&self, text: impl Into<String>) {
        lock(&self.state).failing_texts.push(text.into());
    }

    /// Report every completion twice.
    pub fn duplicate_finished(&self, duplicate: bool) {
        lock(&self.state).duplicate_finished = duplicate;
    }

    /// Finish the utterance currently playing (manual mode).
    pub fn finish_current(&self) {
        let mut state = lock(&self.state);
        if let (Some(id), Some(callbacks)) = (state.current.take(), state.callbacks.clone()) {
            callbacks.finished(id);
        }
    }

    /// Report completion for an arbitrary utterance id.
    pub fn finish_id(&self, id: UtteranceId) {
        if let Some(callbacks) = lock(&self.state).callbacks.clone() {
            callbacks.finished(id);
        }
    }
}
