//! Speech through an external text-to-speech program.
//!
//! Each utterance spawns one child process; a new utterance or `stop()`
//! kills the previous child. Synthesis quality and voices are entirely up to
//! the external program.

use std::sync::Mutex;

use tokio::process::{Child, Command};

use davood_core::speech::SpeechOutput;
use davood_types::config::SpeechCommandConfig;

/// Words per minute at speed 1.0 for engines that take a WPM rate.
const BASE_WPM: f32 = 175.0;

/// A resolved command line for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Build the command line that speaks `text` with `engine` at `speed`.
///
/// A configured program overrides the engine: its args are used as given and
/// the text is appended last.
pub fn build_invocation(
    engine: &str,
    speed: f32,
    text: &str,
    custom: &SpeechCommandConfig,
) -> Invocation {
    if let Some(program) = &custom.program {
        let mut args = custom.args.clone();
        args.push(text.to_string());
        return Invocation {
            program: program.clone(),
            args,
        };
    }

    let wpm = (BASE_WPM * speed).round().max(1.0) as u32;
    match engine {
        "edge" => {
            let percent = ((speed - 1.0) * 100.0).round() as i32;
            Invocation {
                program: "edge-playback".to_string(),
                args: vec![
                    format!("--rate={percent:+}%"),
                    "--text".to_string(),
                    text.to_string(),
                ],
            }
        }
        "say" => Invocation {
            program: "say".to_string(),
            args: vec!["-r".to_string(), wpm.to_string(), text.to_string()],
        },
        other => {
            if other != "espeak" && other != "offline" {
                tracing::warn!(engine = %other, "Unknown speech engine, using espeak");
            }
            Invocation {
                program: "espeak".to_string(),
                args: vec!["-s".to_string(), wpm.to_string(), text.to_string()],
            }
        }
    }
}

/// [`SpeechOutput`] that shells out to a TTS program.
pub struct CommandSpeaker {
    engine: Mutex<String>,
    custom: SpeechCommandConfig,
    current: Mutex<Option<Child>>,
}

impl CommandSpeaker {
    pub fn new(engine: impl Into<String>, custom: SpeechCommandConfig) -> Self {
        Self {
            engine: Mutex::new(engine.into()),
            custom,
            current: Mutex::new(None),
        }
    }

    fn engine(&self) -> String {
        self.engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace_child(&self, next: Option<Child>) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(mut previous) = current.take() {
            if let Err(e) = previous.start_kill() {
                tracing::debug!(error = %e, "Previous utterance already finished");
            }
        }
        *current = next;
    }
}

impl SpeechOutput for CommandSpeaker {
    fn speak(&self, text: &str, speed: f32) {
        let invocation = build_invocation(&self.engine(), speed, text, &self.custom);
        let spawned = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                tracing::debug!(program = %invocation.program, chars = text.len(), "Speaking reply");
                self.replace_child(Some(child));
            }
            Err(e) => {
                tracing::warn!(program = %invocation.program, error = %e, "Failed to start speech program");
                self.replace_child(None);
            }
        }
    }

    fn stop(&self) {
        self.replace_child(None);
    }

    fn set_engine(&self, engine: &str) {
        *self
            .engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = engine.to_string();
    }
}
