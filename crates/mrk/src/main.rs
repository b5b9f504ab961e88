//! mrk CLI - Slack mrkdwn to restricted HTML.
//!
//! Provides commands for:
//! - `transform`: Convert a single mrkdwn text
//! - `messages`: Render Slack message JSON with authors, times and attachments

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{MessagesArgs, TransformArgs};
use output::Output;

/// mrk - Slack mrkdwn to restricted HTML.
#[derive(Parser)]
#[command(name = "mrk", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert mrkdwn text to HTML.
    Transform(TransformArgs),
    /// Render Slack messages to HTML fragments as JSON.
    Messages(MessagesArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Transform(args) => args.common.verbose,
        Commands::Messages(args) => args.common.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Transform(args) => args.execute(),
        Commands::Messages(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
