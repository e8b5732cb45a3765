//! Holicard entry point.
//!
//! Binary name: `holicard`
//!
//! Parses CLI arguments, initializes tracing, the database and services,
//! then runs the Telegram bot, the terminal chat or an admin command.

mod cli;
mod serve;
mod state;

use clap::Parser;
use clap_complete::generate;

use holicard_observe::tracing_setup::{filter_for, init_tracing, shutdown_tracing};

use cli::{CacheCommand, Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(filter_for(cli.verbose, cli.quiet), cli.log_json, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "holicard", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Serve { skip_llm_check } => serve::serve(&state, skip_llm_check).await,
        Commands::Chat => cli::chat::run_chat(&state).await,
        Commands::Stats => cli::stats::stats(&state, cli.json).await,
        Commands::Check => cli::check::check(&state, cli.json).await,
        Commands::Cache { action } => match action {
            CacheCommand::List => cli::cache::list_cards(&state, cli.json).await,
            CacheCommand::Clear { force } => cli::cache::clear_cache(&state, force, cli.json).await,
        },
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    state.close().await;
    shutdown_tracing();
    result
}
