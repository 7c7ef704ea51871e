//! ContextLoom CLI: the main entry point.
//!
//! Commands:
//! - `render`:          Render a state snapshot into a prompt document
//! - `export-training`: Convert stored episodes to JSONL training data
//! - `config`:          Print the default configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "contextloom",
    about = "ContextLoom: render agent state into a single prompt document",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.contextloom/config.toml)
    #[arg(short, long, global = true, env = "CONTEXTLOOM_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON state snapshot to stdout
    Render {
        /// Snapshot file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// ID of the context receiving working memory
        #[arg(short, long)]
        main_context: Option<String>,
    },

    /// Export episodes as prompt/completion training pairs
    ExportTraining {
        /// JSON array of episodes
        #[arg(short, long)]
        episodes: PathBuf,

        /// Output file (defaults to `training.path` from config)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the default configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize tracing
    let filter = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            snapshot,
            main_context,
        } => commands::render::run(&config, &snapshot, main_context)?,
        Commands::ExportTraining { episodes, out } => {
            commands::training::run(&config, &episodes, out)?
        }
        Commands::Config => commands::config_cmd::run()?,
    }

    Ok(())
}
