//! ScopeRAG CLI
//!
//! Main entry point for the scoperag command-line tool. Provides
//! role-scoped document Q&A over a local vector index.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, ResetCommand, StatsCommand};
use scoperag_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// ScopeRAG CLI - role-scoped document Q&A with local-first RAG
#[derive(Parser, Debug)]
#[command(name = "scoperag")]
#[command(about = "Role-scoped document Q&A with local-first RAG", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SCOPERAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SCOPERAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generator provider (ollama, mock)
    #[arg(short, long, global = true, env = "SCOPERAG_PROVIDER")]
    provider: Option<String>,

    /// Generator model identifier
    #[arg(short, long, global = true, env = "SCOPERAG_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover, chunk, embed, and index documents
    Ingest(IngestCommand),

    /// Ask a question as a role
    Ask(AskCommand),

    /// Show index statistics
    Stats(StatsCommand),

    /// Delete all indexed data
    Reset(ResetCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.ensure_state_dir()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Stats(_) => "stats",
        Commands::Reset(_) => "reset",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Reset(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
