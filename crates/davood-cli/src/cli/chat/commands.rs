//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and control the session, settings and the
//! decorative extras.

use console::style;

/// Accepted range for `/speed`.
pub const MIN_VOICE_SPEED: f32 = 0.5;
pub const MAX_VOICE_SPEED: f32 = 2.0;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the chat (asks for confirmation).
    Clear,
    /// Clear all data including settings (asks for confirmation).
    Reset,
    /// Exit the chat session.
    Exit,
    /// Show the transcript.
    History,
    /// Write the transcript to a JSON file.
    Export,
    /// Probe the endpoint.
    Test,
    /// Show current settings.
    Settings,
    /// Set or toggle (`None`) sending conversation context.
    Context(Option<bool>),
    /// Toggle the voice visualizer.
    Voice,
    /// Set or toggle (`None`) reading replies aloud.
    Speak(Option<bool>),
    /// Set the speech rate.
    Speed(f32),
    /// Unknown command or bad argument, with a message for the user.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, ' ');
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" => ChatCommand::Clear,
        "/reset" => ChatCommand::Reset,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/history" => ChatCommand::History,
        "/export" => ChatCommand::Export,
        "/test" => ChatCommand::Test,
        "/settings" => ChatCommand::Settings,
        "/voice" => ChatCommand::Voice,
        "/context" => match parse_switch(arg) {
            Ok(value) => ChatCommand::Context(value),
            Err(()) => ChatCommand::Unknown("/context expects on or off".to_string()),
        },
        "/speak" => match parse_switch(arg) {
            Ok(value) => ChatCommand::Speak(value),
            Err(()) => ChatCommand::Unknown("/speak expects on or off".to_string()),
        },
        "/speed" => match arg.and_then(|a| a.parse::<f32>().ok()) {
            Some(speed) if (MIN_VOICE_SPEED..=MAX_VOICE_SPEED).contains(&speed) => {
                ChatCommand::Speed(speed)
            }
            _ => ChatCommand::Unknown(format!(
                "/speed expects a number between {MIN_VOICE_SPEED} and {MAX_VOICE_SPEED}"
            )),
        },
        other => ChatCommand::Unknown(format!("Unknown command: {other}")),
    };
    Some(command)
}

/// `None` means toggle.
fn parse_switch(arg: Option<&str>) -> Result<Option<bool>, ()> {
    match arg.map(str::to_lowercase).as_deref() {
        None => Ok(None),
        Some("on" | "true" | "yes") => Ok(Some(true)),
        Some("off" | "false" | "no") => Ok(Some(false)),
        Some(_) => Err(()),
    }
}

/// Whether a confirmation answer means yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Help text listing all available commands.
pub fn help_lines() -> Vec<String> {
    let entries = [
        ("/help", "Show this help message"),
        ("/clear", "Clear the chat"),
        ("/reset", "Clear all chat history and settings"),
        ("/history", "Show the conversation"),
        ("/export", "Save the conversation as JSON"),
        ("/test", "Test the backend connection"),
        ("/settings", "Show current settings"),
        ("/context on|off", "Send recent messages as context"),
        ("/speak on|off", "Read replies aloud"),
        ("/speed <x>", "Speech rate (0.5 to 2.0)"),
        ("/voice", "Toggle the voice visualizer"),
        ("/exit", "End the chat session"),
    ];

    let mut lines = vec![String::new(), format!("  {}", style("Available commands:").bold()), String::new()];
    for (cmd, about) in entries {
        lines.push(format!("  {}  {about}", style(format!("{cmd:<16}")).cyan()));
    }
    lines.push(String::new());
    lines.push(format!("  {}", style("Ctrl+D to exit").dim()));
    lines.push(String::new());
    lines
}
