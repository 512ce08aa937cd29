//! CLI command definitions for the `davood` binary.
//!
//! Uses clap derive macros for argument parsing. With no subcommand the
//! interactive chat starts.

pub mod chat;
pub mod config;
pub mod send;
pub mod transcript;

use std::path::PathBuf;
use std::sync::Arc;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use chat::view::TerminalView;

/// Chat with the DavoodAI backend from your terminal.
#[derive(Parser)]
#[command(name = "davood", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Data directory (defaults to $DAVOOD_DATA_DIR or ~/.davood).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session (the default).
    Chat {
        /// Skip the startup splash.
        #[arg(long)]
        no_splash: bool,
    },

    /// Send one message and print the reply.
    Send {
        /// Message text.
        message: String,

        /// Don't include recent conversation as context.
        #[arg(long)]
        no_context: bool,
    },

    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Test the connection to the backend.
    Test,

    /// Print the saved conversation.
    History {
        /// Show only the last N messages.
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Export the conversation as JSON.
    Export {
        /// Directory to write into (defaults to the current directory).
        #[arg(long, short, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Clear the conversation.
    Clear {
        /// Also clear endpoint, API key and settings.
        #[arg(long)]
        all: bool,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current settings.
    Show,

    /// Change settings. Options left out keep their current value.
    Set(SetArgs),
}

#[derive(Args, Debug, Default)]
pub struct SetArgs {
    /// Backend chat endpoint URL.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Bearer token sent to the backend (empty to remove).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Artificial delay before a reply is shown, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub response_delay: Option<u64>,

    /// Maximum number of messages kept on screen.
    #[arg(long)]
    pub message_limit: Option<usize>,

    /// Send recent messages as context.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub context: Option<bool>,

    /// Read replies aloud.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub voice: Option<bool>,

    /// Speech rate, 0.5 to 2.0.
    #[arg(long, value_parser = config::parse_voice_speed)]
    pub voice_speed: Option<f32>,

    /// Speech engine: edge, say, espeak or offline.
    #[arg(long)]
    pub tts_engine: Option<String>,

    /// Particle background on the splash screen.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub particles: Option<bool>,

    /// Startup splash animation.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub animations: Option<bool>,
}

/// View for one-shot commands: styled on stdout, or nothing at all for
/// `--json` and `--quiet`.
pub fn command_view(json: bool, quiet: bool) -> Arc<TerminalView> {
    if json || quiet {
        Arc::new(TerminalView::silent())
    } else {
        Arc::new(TerminalView::stdout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["davood"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_set_parses_switches() {
        let cli = Cli::try_parse_from([
            "davood",
            "config",
            "set",
            "--context",
            "off",
            "--voice-speed",
            "1.5",
        ])
        .unwrap();
        let Some(Commands::Config {
            command: ConfigCommand::Set(args),
        }) = cli.command
        else {
            panic!("expected config set");
        };
        assert_eq!(args.context, Some(false));
        assert_eq!(args.voice_speed, Some(1.5));
        assert_eq!(args.voice, None);
    }

    #[test]
    fn test_voice_speed_out_of_range_is_rejected() {
        let result = Cli::try_parse_from(["davood", "config", "set", "--voice-speed", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["davood", "send", "hi", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
