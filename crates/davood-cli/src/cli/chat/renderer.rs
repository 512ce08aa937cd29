//! Terminal rendering for chat messages.
//!
//! `ChatRenderer` formats a [`Message`] as a labelled block. Formatted
//! messages go through `termimad` (inline `code`, **bold**, *emphasis*) with
//! fenced code blocks highlighted by `syntect`; plain messages are printed
//! verbatim.

use chrono::Local;
use console::style;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

use davood_types::chat::{Message, MessageRole};

/// Label shown above assistant messages.
pub const ASSISTANT_LABEL: &str = "DavoodAI";

pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);
        skin.italic.set_fg(termimad::crossterm::style::Color::Magenta);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Header line plus indented body for one message.
    pub fn format_message(&self, message: &Message, formatted: bool) -> String {
        let label = match message.role {
            MessageRole::User => style("You").green().bold().to_string(),
            MessageRole::Assistant => style(ASSISTANT_LABEL).cyan().bold().to_string(),
        };
        let time = message.timestamp.with_timezone(&Local).format("%H:%M:%S");

        let body = if formatted {
            self.render_markdown(&message.content)
        } else {
            message.content.clone()
        };

        let mut out = format!("  {label} {}\n", style(time).dim());
        for line in body.trim_end().lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Render markdown with syntax-highlighted code fences.
    pub fn render_markdown(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            if line.starts_with("```") && !in_code_block {
                in_code_block = true;
                code_lang = line.trim_start_matches('`').trim().to_string();
                code_buf.clear();
            } else if line.starts_with("```") && in_code_block {
                in_code_block = false;
                output.push_str(&self.highlight_code(&code_buf, &code_lang));
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                output.push_str(&format!("{}", self.skin.term_text(line)));
            }
        }

        // Unclosed fence: highlight what we have.
        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }

        output
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let Some(theme) = self.theme_set.themes.get("base16-ocean.dark") else {
            return code.to_string();
        };
        let mut h = HighlightLines::new(syntax, theme);

        let mut output = format!("{}\n", style(format!("--- {lang} ---")).dim());
        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("{escaped}\x1b[0m\n"));
        }
        output
    }
}
