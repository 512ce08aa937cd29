//! Welcome banner display for chat sessions.

use std::path::Path;

use console::style;

use davood_types::config::Settings;

use super::view::TerminalView;

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Print the banner shown when the interactive chat starts: endpoint,
/// voice and context toggles, and where data lives.
pub fn print_welcome_banner(
    view: &TerminalView,
    endpoint: &str,
    settings: &Settings,
    data_dir: &Path,
) {
    let voice = if settings.voice_enabled {
        format!("{} ({}x, {})", on_off(true), settings.voice_speed, settings.tts_engine)
    } else {
        on_off(false).to_string()
    };

    view.say_lines([
        String::new(),
        format!("  {} {}", style("◆").cyan(), style("DavoodAI").cyan().bold()),
        format!("  {}", style("Terminal chat client").dim()),
        String::new(),
        format!("  {}  {}", style("Endpoint:").bold(), style(endpoint).dim()),
        format!("  {}     {}", style("Voice:").bold(), style(voice).dim()),
        format!(
            "  {}   {}",
            style("Context:").bold(),
            style(on_off(settings.include_context)).dim()
        ),
        format!(
            "  {}      {}",
            style("Data:").bold(),
            style(data_dir.display()).dim()
        ),
        String::new(),
        format!("  {}", style("Type /help for commands, Ctrl+D to exit").dim()),
        format!("  {}", style("---").dim()),
    ]);
}
