//! Voxa speech crate - speech input and output adapters.
//!
//! Platform recognition and synthesis engines implement the backend traits
//! in [`input`] and [`output`] and report through callback handles. Every
//! callback is marshalled onto a channel so the owning task consumes them one
//! at a time, tagged with the attempt or utterance it belongs to.

pub mod error;
pub mod input;
pub mod output;
pub mod testing;

pub use error::SpeechError;
pub use input::{
    normalize_level, RecognitionBackend, RecognitionCallbacks, RecognitionErrorKind, RecognitionEvent,
    RecognitionOutcome, RecognitionSignal, RecognitionState, SpeechInput,
};
pub use output::{
    EngineState, OutputEvent, SpeechOutput, SynthesisBackend, SynthesisCallbacks,
    SynthesisSignal, UtteranceId,
};
