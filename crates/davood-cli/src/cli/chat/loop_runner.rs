//! Main chat loop orchestration.
//!
//! Coordinates the interactive session: optional splash, welcome banner,
//! transcript restore, then the input loop with slash commands and
//! confirmations for destructive actions.

use std::sync::Arc;

use console::style;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use davood_core::chat::session::{RejectReason, SubmitOutcome, load_settings};
use davood_core::chat::view::ChatView;
use davood_core::visual::spectrum::SpectrumFrame;
use davood_infra::export::write_export;
use davood_types::notice::Toast;

use crate::cli::config::settings_table;
use crate::cli::transcript::history_lines;
use crate::state::{AppState, ConcreteSession};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::splash::run_splash;
use super::view::{TerminalView, TypingStyle};
use super::visualizer::render_frame;

/// Rows drawn by the voice visualizer.
const VISUALIZER_ROWS: usize = 4;

/// A destructive command waiting for a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Clear,
    Reset,
}

/// What the loop should do after a command.
enum Flow {
    Continue,
    Exit,
}

struct LoopState {
    pending: Option<Pending>,
    visualizer: bool,
}

/// Run the interactive chat until the user exits.
pub async fn run_chat_loop(state: &AppState, show_splash: bool) -> anyhow::Result<()> {
    let stored = load_settings(state.store.as_ref()).await;
    if show_splash && stored.animations {
        let particles = stored.particles;
        match tokio::task::spawn_blocking(move || run_splash(particles)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Splash screen failed"),
            Err(e) => warn!(error = %e, "Splash screen task failed"),
        }
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;
    let view = Arc::new(TerminalView::new(Box::new(writer), TypingStyle::Line));

    let session = state.build_session(view.clone()).await?;
    print_welcome_banner(
        &view,
        &session.client().endpoint(),
        &session.settings(),
        &state.data_dir,
    );
    session.start().await?;
    info!(endpoint = %session.client().endpoint(), "Chat session started");

    let mut loop_state = LoopState {
        pending: None,
        visualizer: false,
    };

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                view.say(&format!("\n  {}", style("Session ended.").dim()));
                break;
            }
            InputEvent::Interrupted => {
                if loop_state.pending.take().is_some() {
                    view.say(&format!("  {}", style("Cancelled.").dim()));
                } else {
                    view.say(&format!(
                        "\n  {}",
                        style("Press Ctrl+D to exit, or keep chatting.").dim()
                    ));
                }
                continue;
            }
            InputEvent::Line(text) => text,
        };

        if let Some(pending) = loop_state.pending.take() {
            confirm(state, &session, &view, pending, &text).await;
            continue;
        }

        if let Some(cmd) = commands::parse(&text) {
            match handle_command(state, &session, &view, &mut loop_state, cmd).await {
                Flow::Continue => continue,
                Flow::Exit => {
                    view.say(&format!("\n  {}", style("Session ended.").dim()));
                    break;
                }
            }
        }

        match session.submit(&text, &CancellationToken::new()).await {
            SubmitOutcome::Rejected(RejectReason::Empty) => {}
            SubmitOutcome::Rejected(RejectReason::Busy) => {
                view.say(&format!(
                    "  {}",
                    style("Still waiting for the previous reply.").dim()
                ));
            }
            SubmitOutcome::Replied(_) | SubmitOutcome::Failed(_) => {
                if loop_state.visualizer {
                    draw_visualizer(&view);
                }
            }
        }
    }

    session.stop_speech();
    chat_input.close();
    Ok(())
}

async fn handle_command(
    state: &AppState,
    session: &ConcreteSession,
    view: &TerminalView,
    loop_state: &mut LoopState,
    cmd: ChatCommand,
) -> Flow {
    match cmd {
        ChatCommand::Help => view.say_lines(commands::help_lines()),
        ChatCommand::Exit => return Flow::Exit,
        ChatCommand::Clear => {
            loop_state.pending = Some(Pending::Clear);
            view.say(&format!(
                "\n  {} Are you sure you want to clear the chat? (y/N)",
                style("?").yellow().bold()
            ));
        }
        ChatCommand::Reset => {
            loop_state.pending = Some(Pending::Reset);
            view.say(&format!(
                "\n  {} This will clear all chat history and settings. Are you sure? (y/N)",
                style("?").yellow().bold()
            ));
        }
        ChatCommand::History => {
            let mut lines = vec![String::new()];
            lines.extend(history_lines(&session.transcript()));
            lines.push(String::new());
            view.say_lines(lines);
        }
        ChatCommand::Export => export(session, view).await,
        ChatCommand::Test => {
            session.test_connection().await;
        }
        ChatCommand::Settings => {
            let credential = if session.client().has_credential() {
                "set"
            } else {
                "not set"
            };
            let table = settings_table(
                &session.client().endpoint(),
                credential,
                &session.settings(),
            );
            view.say(&format!("\n{table}\n"));
            view.say(&format!(
                "  {}",
                style(format!(
                    "Change with `davood config set` (data in {})",
                    state.data_dir.display()
                ))
                .dim()
            ));
        }
        ChatCommand::Context(value) => {
            let updated = session
                .update_settings(|s| s.include_context = value.unwrap_or(!s.include_context))
                .await;
            report_switch(view, "Context", updated.map(|s| s.include_context));
        }
        ChatCommand::Speak(value) => {
            let updated = session
                .update_settings(|s| s.voice_enabled = value.unwrap_or(!s.voice_enabled))
                .await;
            if matches!(updated, Ok(ref s) if !s.voice_enabled) {
                session.stop_speech();
            }
            report_switch(view, "Voice", updated.map(|s| s.voice_enabled));
        }
        ChatCommand::Speed(speed) => {
            match session.update_settings(|s| s.voice_speed = speed).await {
                Ok(_) => view.say(&format!(
                    "  {} Voice speed: {speed}x",
                    style("✓").green().bold()
                )),
                Err(e) => view.toast(&Toast::error(format!("Failed to save settings: {e}"))),
            }
        }
        ChatCommand::Voice => {
            loop_state.visualizer = !loop_state.visualizer;
            if loop_state.visualizer {
                view.say(&format!("  {}", style("Voice visualizer on").dim()));
                draw_visualizer(view);
            } else {
                view.say(&format!("  {}", style("Voice visualizer off").dim()));
            }
        }
        ChatCommand::Unknown(message) => {
            view.say(&format!(
                "\n  {} {}. Type /help for available commands.\n",
                style("?").yellow().bold(),
                message
            ));
        }
    }
    Flow::Continue
}

async fn confirm(
    state: &AppState,
    session: &ConcreteSession,
    view: &TerminalView,
    pending: Pending,
    answer: &str,
) {
    if !commands::is_affirmative(answer) {
        view.say(&format!("  {}", style("Cancelled.").dim()));
        return;
    }

    let result = match pending {
        Pending::Clear => session.clear_chat().await,
        Pending::Reset => match session.clear_all_data().await {
            // Start over the way a fresh launch would.
            Ok(()) => {
                print_welcome_banner(
                    view,
                    &session.client().endpoint(),
                    &session.settings(),
                    &state.data_dir,
                );
                session.start().await
            }
            Err(e) => Err(e),
        },
    };
    if let Err(e) = result {
        warn!(error = %e, ?pending, "Confirmed action failed");
        view.toast(&Toast::error(format!("Failed: {e}")));
    }
}

async fn export(session: &ConcreteSession, view: &TerminalView) {
    let dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            view.toast(&Toast::error(format!("Export failed: {e}")));
            return;
        }
    };
    match write_export(&dir, &session.export()).await {
        Ok(path) => {
            view.toast(&Toast::success("Chat exported successfully"));
            view.say(&format!("    {}", style(path.display()).dim()));
        }
        Err(e) => view.toast(&Toast::error(format!("Export failed: {e}"))),
    }
}

fn report_switch<E: std::fmt::Display>(view: &TerminalView, name: &str, result: Result<bool, E>) {
    match result {
        Ok(on) => view.say(&format!(
            "  {} {name}: {}",
            style("✓").green().bold(),
            if on { "on" } else { "off" }
        )),
        Err(e) => view.toast(&Toast::error(format!("Failed to save settings: {e}"))),
    }
}

fn draw_visualizer(view: &TerminalView) {
    let frame = SpectrumFrame::random(&mut rand::thread_rng());
    let lines = render_frame(&frame, VISUALIZER_ROWS)
        .into_iter()
        .map(|line| format!("  {}", style(line).magenta()));
    view.say_lines(lines);
}
