//! Transcript CLI commands: history, export, clear.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use console::style;
use dialoguer::Confirm;

use davood_core::chat::view::ChatView;
use davood_infra::export::write_export;
use davood_types::chat::{LogEntry, Message, MessageRole};
use davood_types::notice::Toast;

use super::chat::renderer::ASSISTANT_LABEL;
use super::command_view;
use crate::state::AppState;

const PREVIEW_CHARS: usize = 100;

/// One line per message: who, when, and the first line of the text.
pub fn history_lines(entries: &[LogEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![format!("  {}", style("No messages yet.").dim())];
    }
    entries
        .iter()
        .map(|entry| {
            let msg = &entry.message;
            let label = match msg.role {
                MessageRole::User => style("You").green().bold(),
                MessageRole::Assistant => style(ASSISTANT_LABEL).cyan().bold(),
            };
            let time = msg.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M");
            format!("  {label} {} {}", style(time).dim(), preview(&msg.content))
        })
        .collect()
}

fn preview(content: &str) -> String {
    let first = content.lines().next().unwrap_or_default();
    if first.chars().count() > PREVIEW_CHARS {
        let cut: String = first.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else if content.lines().nth(1).is_some() {
        format!("{first} ...")
    } else {
        first.to_string()
    }
}

/// Print the saved conversation, optionally only the last `limit` messages.
pub async fn show_history(state: &AppState, limit: Option<usize>, json: bool) -> Result<()> {
    let session = state.build_session(command_view(true, false)).await?;
    session.restore().await?;

    let entries = session.transcript();
    let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
    let entries = &entries[skip..];

    if json {
        let messages: Vec<&Message> = entries.iter().map(|e| &e.message).collect();
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    println!();
    for line in history_lines(entries) {
        println!("{line}");
    }
    println!();
    Ok(())
}

/// Write the displayed conversation to `davoodai-chat-<date>.json`.
pub async fn export_chat(
    state: &AppState,
    out: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let view = command_view(json, quiet);
    let session = state.build_session(view.clone()).await?;
    session.restore().await?;

    let dir = match out {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let export = session.export();
    let path = write_export(&dir, &export).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"path": path, "total_messages": export.total_messages})
        );
    } else {
        view.toast(&Toast::success("Chat exported successfully"));
        view.say(&format!("    {}", style(path.display()).dim()));
    }
    Ok(())
}

/// Clear the conversation, or with `all` every stored value.
pub async fn clear(state: &AppState, all: bool, force: bool, json: bool, quiet: bool) -> Result<()> {
    if !force && !json {
        let prompt = if all {
            "This will clear all chat history and settings. Are you sure?"
        } else {
            "Are you sure you want to clear the chat?"
        };
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    // Silent view: clearing must not wipe the user's screen.
    let session = state.build_session(command_view(true, false)).await?;
    let toast = if all {
        session.clear_all_data().await?;
        Toast::info("All data cleared")
    } else {
        session.clear_chat().await?;
        Toast::info("Chat cleared")
    };

    if json {
        println!("{}", serde_json::json!({"cleared": true, "all": all}));
    } else {
        command_view(false, quiet).toast(&toast);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_lines() {
        let long = "x".repeat(150);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_marks_multiline() {
        assert_eq!(preview("first\nsecond"), "first ...");
        assert_eq!(preview("single"), "single");
    }

    #[test]
    fn test_history_lines() {
        assert_eq!(history_lines(&[]).len(), 1);
        let entries = vec![
            LogEntry::exchanged(Message::user("question")),
            LogEntry::exchanged(Message::assistant("answer")),
        ];
        let lines = history_lines(&entries);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("question"));
        assert!(lines[1].contains(ASSISTANT_LABEL));
    }
}
