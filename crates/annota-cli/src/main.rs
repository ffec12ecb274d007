//! Annota command-line tool
//!
//! Runs the dispatch engine over the bundled demo classes and renders the
//! resulting reports as colored text or JSON.

mod commands;
mod demos;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::run::{Format, RunArgs};
use demos::Demo;

#[derive(Parser)]
#[command(name = "annota")]
#[command(about = "Metadata-driven dispatch over annotated elements", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch over the demo classes and report outcomes
    Run {
        /// Demo targets to dispatch over
        #[arg(long, value_enum, default_value_t = Demo::All)]
        demo: Demo,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Dispatch options file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Color output: auto, always, never
        #[arg(long, default_value = "auto")]
        color: String,
    },

    /// List built-in validation strategies
    Strategies {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ANNOTA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            demo,
            format,
            config,
            color,
        } => commands::run::execute(RunArgs {
            demo,
            format,
            config,
            color,
        }),

        Commands::Strategies { format } => commands::strategies::execute(format),
    }
}
