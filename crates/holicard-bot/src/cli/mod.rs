//! CLI command definitions for the `holicard` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod cache;
pub mod chat;
pub mod check;
pub mod stats;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Holiday traditions from around the world, as a Telegram bot.
#[derive(Parser)]
#[command(name = "holicard", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (long polling) until Ctrl+C.
    Serve {
        /// Start even if the text generator does not answer.
        #[arg(long)]
        skip_llm_check: bool,
    },

    /// Talk to the bot in this terminal.
    Chat,

    /// Show cache statistics.
    Stats,

    /// Send a tiny request to the text generator and report the result.
    Check,

    /// Inspect or clear the card cache.
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// List cached cards.
    #[command(alias = "ls")]
    List,

    /// Delete every cached card.
    Clear {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cache_clear_force() {
        let cli = Cli::parse_from(["holicard", "cache", "clear", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Cache {
                action: CacheCommand::Clear { force: true }
            }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["holicard", "stats", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_parse_serve_skip_llm_check() {
        let cli = Cli::parse_from(["holicard", "serve"]);
        assert!(matches!(
            cli.command,
            Commands::Serve {
                skip_llm_check: false
            }
        ));

        let cli = Cli::parse_from(["holicard", "serve", "--skip-llm-check"]);
        assert!(matches!(
            cli.command,
            Commands::Serve {
                skip_llm_check: true
            }
        ));
    }
}
