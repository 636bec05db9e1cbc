//! CLI entry point - the composition root.
//!
//! Parses arguments, installs logging and signal handling, then runs the
//! bridge until SIGINT or SIGTERM.

use clap::Parser;
use jackbridge_axum::start_server;
use jackbridge_cli::{Cli, cancel_on_signal, init_logging};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.server_config();
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    start_server(config, shutdown).await
}
