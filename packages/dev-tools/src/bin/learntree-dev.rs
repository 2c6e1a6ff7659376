//! Development CLI Binary
//!
//! Runs one tree workflow operation and prints the result as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Start a tree (needs GROQ_API_KEY)
//! cargo run --bin learntree-dev -- create-tree --user alice --name Rust "The Rust language"
//!
//! # Grow it
//! cargo run --bin learntree-dev -- add-node --user alice --parent 1 "What is ownership?"
//!
//! # Inspect it
//! cargo run --bin learntree-dev -- layout --tree-id 1
//! ```
//!
//! # Environment Variables
//!
//! - `LEARNTREE_DB`: Database file (default: ~/.learntree/database/learntree.db)
//! - `GROQ_API_KEY`, `LEARNTREE_MODEL`, `LEARNTREE_API_BASE`, `LEARNTREE_TIMEOUT_SECS`: Generation settings
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")
//!
//! Workflow failures are printed to stderr as an error payload and exit with status 1.

use std::process::ExitCode;

use clap::Parser;
use learntree_dev_tools::{build_service, execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = build_service(&cli).await?;

    match execute(&service, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!("Command failed with status {}", e.status());
            eprintln!("{}", serde_json::to_string_pretty(&e.to_payload())?);
            Ok(ExitCode::FAILURE)
        }
    }
}
