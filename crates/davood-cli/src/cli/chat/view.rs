//! `ChatView` implementation for the terminal.
//!
//! The terminal cannot un-print a line, so the view tracks the window of
//! messages that counts as "on screen" and reflects eviction there; `clear`
//! additionally wipes the screen.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use davood_core::chat::view::ChatView;
use davood_types::chat::Message;
use davood_types::error::ChatError;
use davood_types::notice::{Toast, ToastKind};

use super::renderer::{ASSISTANT_LABEL, ChatRenderer};

/// How the typing indicator is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingStyle {
    /// Animated spinner on stderr (one-shot commands).
    Spinner,
    /// A single dim line (inside the readline loop, where a spinner would
    /// fight the prompt).
    Line,
    Hidden,
}

pub struct TerminalView {
    out: Mutex<Box<dyn Write + Send>>,
    renderer: ChatRenderer,
    visible: Mutex<VecDeque<Message>>,
    typing_style: TypingStyle,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write + Send>, typing_style: TypingStyle) -> Self {
        Self {
            out: Mutex::new(out),
            renderer: ChatRenderer::new(),
            visible: Mutex::new(VecDeque::new()),
            typing_style,
            spinner: Mutex::new(None),
        }
    }

    /// Styled output on stdout with a spinner while waiting.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()), TypingStyle::Spinner)
    }

    /// Renders nothing. Used for `--json` output.
    pub fn silent() -> Self {
        Self::new(Box::new(std::io::sink()), TypingStyle::Hidden)
    }

    /// Write free-form text followed by a newline.
    pub fn say(&self, text: &str) {
        if let Err(e) = self.write_str(&format!("{text}\n")) {
            tracing::debug!(error = %e, "Terminal write failed");
        }
    }

    /// Write several lines at once.
    pub fn say_lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text: String = lines
            .into_iter()
            .map(|l| format!("{}\n", l.as_ref()))
            .collect();
        if let Err(e) = self.write_str(&text) {
            tracing::debug!(error = %e, "Terminal write failed");
        }
    }

    fn write_str(&self, text: &str) -> std::io::Result<()> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn visible(&self) -> std::sync::MutexGuard<'_, VecDeque<Message>> {
        self.visible
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChatView for TerminalView {
    fn render_message(&self, message: &Message, formatted: bool) -> Result<(), ChatError> {
        let block = self.renderer.format_message(message, formatted);
        self.write_str(&format!("\n{block}"))
            .map_err(|e| ChatError::Render(e.to_string()))?;
        self.visible().push_back(message.clone());
        Ok(())
    }

    fn set_typing(&self, visible: bool) {
        match self.typing_style {
            TypingStyle::Hidden => {}
            TypingStyle::Line => {
                if visible {
                    self.say(&format!(
                        "  {}",
                        style(format!("{ASSISTANT_LABEL} is typing...")).dim()
                    ));
                }
            }
            TypingStyle::Spinner => {
                let mut spinner = self
                    .spinner
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Some(active) = spinner.take() {
                    active.finish_and_clear();
                }
                if visible {
                    let bar = ProgressBar::new_spinner();
                    if let Ok(spinner_style) =
                        ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
                    {
                        bar.set_style(spinner_style);
                    }
                    bar.set_message(format!("{ASSISTANT_LABEL} is typing..."));
                    bar.enable_steady_tick(Duration::from_millis(80));
                    *spinner = Some(bar);
                }
            }
        }
    }

    fn evict_oldest(&self) {
        self.visible().pop_front();
    }

    fn rendered_count(&self) -> usize {
        self.visible().len()
    }

    fn clear(&self) {
        self.visible().clear();
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = crossterm::execute!(
            out,
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
            crossterm::cursor::MoveTo(0, 0)
        ) {
            tracing::debug!(error = %e, "Failed to clear terminal");
        }
    }

    fn toast(&self, toast: &Toast) {
        let icon = match toast.kind {
            ToastKind::Success => style(toast.kind.icon()).green().bold(),
            ToastKind::Error => style(toast.kind.icon()).red().bold(),
            ToastKind::Info => style(toast.kind.icon()).blue().bold(),
        };
        self.say(&format!("\n  {icon} {}", toast.message));
    }
}
