//! Terminal stand-ins for the platform speech engines, plus the console
//! command grammar.
//!
//! Typed lines play the part of recognized speech while a recognition
//! attempt is open; spoken text is printed and "lasts" in proportion to its
//! length so interruption and auto-listen behave as they would with audio.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use voxa_speech::{
    RecognitionBackend, RecognitionCallbacks, SpeechError, SynthesisBackend, SynthesisCallbacks,
    UtteranceId,
};

const MS_PER_CHAR: u64 = 40;
const MAX_SPEECH: Duration = Duration::from_secs(6);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Recognition
// =============================================================================

/// Recognition backend fed from the console.
pub struct ConsoleRecognizer {
    open: Arc<Mutex<Option<RecognitionCallbacks>>>,
}

/// Console-side end of a [`ConsoleRecognizer`].
#[derive(Clone)]
pub struct ConsoleMic {
    open: Arc<Mutex<Option<RecognitionCallbacks>>>,
}

impl ConsoleRecognizer {
    pub fn new() -> (Self, ConsoleMic) {
        let open = Arc::new(Mutex::new(None));
        (
            Self {
                open: Arc::clone(&open),
            },
            ConsoleMic { open },
        )
    }
}

impl RecognitionBackend for ConsoleRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    fn begin(&mut self, _locale: &str, callbacks: RecognitionCallbacks) -> Result<(), SpeechError> {
        callbacks.ready();
        *lock(&self.open) = Some(callbacks);
        Ok(())
    }

    fn cancel(&mut self) {
        lock(&self.open).take();
    }
}

impl ConsoleMic {
    /// Whether a recognition attempt is waiting for input.
    pub fn is_open(&self) -> bool {
        lock(&self.open).is_some()
    }

    /// Deliver a typed line as the transcript of the open attempt. Returns
    /// false when nothing is listening.
    pub fn deliver(&self, text: &str) -> bool {
        let Some(callbacks) = lock(&self.open).take() else {
            return false;
        };
        callbacks.end_of_speech();
        callbacks.result(text);
        true
    }
}

// =============================================================================
// Synthesis
// =============================================================================

/// Synthesis backend that prints what it says.
#[derive(Default)]
pub struct ConsoleSynthesizer {
    callbacks: Option<SynthesisCallbacks>,
    playing: Option<JoinHandle<()>>,
}

impl ConsoleSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// How long `text` takes to "say".
fn speech_duration(text: &str) -> Duration {
    Duration::from_millis(MS_PER_CHAR * text.chars().count() as u64).min(MAX_SPEECH)
}

impl SynthesisBackend for ConsoleSynthesizer {
    fn initialize(&mut self, locale: &str, callbacks: SynthesisCallbacks) {
        tracing::debug!(locale, "Console synthesizer ready");
        callbacks.ready();
        self.callbacks = Some(callbacks);
    }

    fn vocalize(&mut self, id: UtteranceId, text: &str) -> Result<(), SpeechError> {
        let Some(callbacks) = self.callbacks.clone() else {
            return Err(SpeechError::Engine("synthesizer not initialized".into()));
        };
        println!("  (speaking) {text}");
        callbacks.started(id);

        let duration = speech_duration(text);
        self.playing = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            callbacks.finished(id);
        }));
        Ok(())
    }

    fn halt(&mut self) {
        if let Some(playing) = self.playing.take() {
            playing.abort();
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Plain text: speech while listening, otherwise typed input.
    Say(String),
    Listen,
    Stop,
    Quiet,
    AutoListen(bool),
    Wake,
    Tasks,
    Schedule,
    Finance,
    Alerts,
    Contacts,
    History,
    /// Simulated push: `/notify <type> <text>`.
    Notify { kind: String, text: String },
    Help,
    Quit,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Self::Say(line.to_string());
        };

        let mut parts = command.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_lowercase();
        let rest = parts.next().unwrap_or_default().trim();

        match (name.as_str(), rest) {
            ("listen" | "l", _) => Self::Listen,
            ("stop", _) => Self::Stop,
            ("quiet" | "q", _) => Self::Quiet,
            ("auto", "on") => Self::AutoListen(true),
            ("auto", "off") => Self::AutoListen(false),
            ("wake", _) => Self::Wake,
            ("tasks", _) => Self::Tasks,
            ("schedule", _) => Self::Schedule,
            ("finance", _) => Self::Finance,
            ("alerts", _) => Self::Alerts,
            ("contacts", _) => Self::Contacts,
            ("history", _) => Self::History,
            ("notify", rest) if !rest.is_empty() => {
                let mut args = rest.splitn(2, char::is_whitespace);
                let kind = args.next().unwrap_or_default().to_string();
                let text = args.next().unwrap_or_default().trim().to_string();
                Self::Notify { kind, text }
            }
            ("help" | "h" | "?", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Type to talk. While [listening], a line is taken as speech; otherwise it is sent as text.
  /listen            start listening
  /stop              stop listening or cancel the pending request
  /quiet             stop speaking
  /auto on|off       toggle auto-listen
  /wake              simulate the wake word
  /tasks /schedule /finance /alerts /contacts
                     fetch data from the assistant
  /history           show the conversation
  /notify TYPE TEXT  simulate a push notification
  /quit              exit";

#[cfg(test)]
mod tests {
    use super::*;
    use voxa_speech::{OutputEvent, RecognitionOutcome, SpeechInput, SpeechOutput};

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(
            ConsoleCommand::parse("  quais sao minhas tarefas "),
            ConsoleCommand::Say("quais sao minhas tarefas".into())
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("/listen"), ConsoleCommand::Listen);
        assert_eq!(ConsoleCommand::parse("/STOP"), ConsoleCommand::Stop);
        assert_eq!(ConsoleCommand::parse("/auto off"), ConsoleCommand::AutoListen(false));
        assert_eq!(ConsoleCommand::parse("/finance"), ConsoleCommand::Finance);
        assert_eq!(ConsoleCommand::parse("/quit"), ConsoleCommand::Quit);
    }

    #[test]
    fn test_parse_notify() {
        assert_eq!(
            ConsoleCommand::parse("/notify voice_reminder Hora do remédio"),
            ConsoleCommand::Notify {
                kind: "voice_reminder".into(),
                text: "Hora do remédio".into()
            }
        );
        assert!(matches!(ConsoleCommand::parse("/notify"), ConsoleCommand::Unknown(_)));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            ConsoleCommand::parse("/auto maybe"),
            ConsoleCommand::Unknown("/auto maybe".into())
        );
        assert!(matches!(ConsoleCommand::parse("/dance"), ConsoleCommand::Unknown(_)));
    }

    #[test]
    fn test_speech_duration_is_capped() {
        assert_eq!(speech_duration("oi"), Duration::from_millis(80));
        assert_eq!(speech_duration(&"a".repeat(1000)), MAX_SPEECH);
    }

    #[tokio::test]
    async fn test_typed_line_becomes_transcript() {
        let (recognizer, mic) = ConsoleRecognizer::new();
        let mut input = SpeechInput::new(Box::new(recognizer), "pt-BR");
        assert!(!mic.deliver("cedo demais"));

        input.start_listening().unwrap();
        assert!(mic.is_open());
        assert!(mic.deliver("bom dia"));
        assert!(!mic.is_open());

        let outcome = loop {
            let signal = input.next_signal().await;
            if let Some(outcome) = input.handle_signal(signal) {
                break outcome;
            }
        };
        assert_eq!(outcome, RecognitionOutcome::Recognized("bom dia".into()));
    }

    #[tokio::test]
    async fn test_cancel_closes_attempt() {
        let (recognizer, mic) = ConsoleRecognizer::new();
        let mut input = SpeechInput::new(Box::new(recognizer), "pt-BR");

        input.start_listening().unwrap();
        input.stop_listening();
        assert!(!mic.is_open());
        assert!(!mic.deliver("tarde demais"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_console_speech_drains() {
        let mut output = SpeechOutput::new(Box::new(ConsoleSynthesizer::new()), "pt-BR");
        output.speak("Olá!", false);
        assert!(output.is_speaking());

        let event = loop {
            let signal = output.next_signal().await;
            if let Some(event) = output.handle_signal(signal) {
                break event;
            }
        };
        assert_eq!(event, OutputEvent::Drained);
        assert!(!output.is_speaking());
    }
}
