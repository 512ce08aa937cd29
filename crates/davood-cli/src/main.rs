//! DavoodAI terminal chat client.
//!
//! Binary name: `davood`
//!
//! Parses CLI arguments, sets up tracing, opens the data directory, then
//! dispatches to the interactive chat or a one-shot command.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use davood_observe::tracing_setup::{
    TracingOptions, filter_for_verbosity, init_tracing, shutdown_tracing,
};

use cli::{Cli, Commands, ConfigCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(TracingOptions {
        filter: filter_for_verbosity(cli.verbose, cli.quiet).to_string(),
        json: cli.json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli
        .command
        .unwrap_or(Commands::Chat { no_splash: false });

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "davood", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.data_dir.as_deref()).await?;

    match command {
        Commands::Chat { no_splash } => {
            let show_splash = !no_splash && !cli.json && !cli.quiet;
            cli::chat::loop_runner::run_chat_loop(&state, show_splash).await?;
        }

        Commands::Send {
            message,
            no_context,
        } => {
            cli::send::send_message(&state, &message, no_context, cli.json, cli.quiet).await?;
        }

        Commands::Config { command } => match command {
            ConfigCommand::Show => cli::config::show_config(&state, cli.json).await?,
            ConfigCommand::Set(args) => {
                cli::config::set_config(&state, args, cli.json, cli.quiet).await?;
            }
        },

        Commands::Test => {
            cli::config::test_connection(&state, cli.json, cli.quiet).await?;
        }

        Commands::History { limit } => {
            cli::transcript::show_history(&state, limit, cli.json).await?;
        }

        Commands::Export { out } => {
            cli::transcript::export_chat(&state, out, cli.json, cli.quiet).await?;
        }

        Commands::Clear { all, force } => {
            cli::transcript::clear(&state, all, force, cli.json, cli.quiet).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
