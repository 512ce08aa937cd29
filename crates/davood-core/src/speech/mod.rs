//! Speech output collaborator.
//!
//! The chat session hands rendered replies to a `SpeechOutput`. Synthesis is
//! always external; implementations only start and stop utterances.

/// Text-to-speech sink.
pub trait SpeechOutput: Send + Sync {
    /// Speak `text` at `speed` (1.0 = normal). Any utterance still playing
    /// is cancelled first.
    fn speak(&self, text: &str, speed: f32);

    /// Cancel the current utterance, if any.
    fn stop(&self);

    /// Switch the synthesis engine used for later utterances.
    fn set_engine(&self, _engine: &str) {}
}

impl<T: SpeechOutput + ?Sized> SpeechOutput for std::sync::Arc<T> {
    fn speak(&self, text: &str, speed: f32) {
        (**self).speak(text, speed)
    }

    fn stop(&self) {
        (**self).stop()
    }

    fn set_engine(&self, engine: &str) {
        (**self).set_engine(engine)
    }
}

/// Speech output that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeech;

impl SpeechOutput for SilentSpeech {
    fn speak(&self, _text: &str, _speed: f32) {}

    fn stop(&self) {}
}
