//! Clipshelf - clipboard history for rofi
//!
//! Stores clips piped in with `--store`; otherwise runs as a rofi script.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipshelf::cli::{Cli, CliHandler, LauncherEnv};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout belongs to rofi, so logs go to stderr
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clipshelf={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Clipshelf v{}", clipshelf::VERSION);

    let env = LauncherEnv::from_env();
    let command = cli.command(&env);

    let mut handler = CliHandler::new(cli.config);
    handler
        .handle_command(command, &mut std::io::stdout())
        .await?;

    Ok(())
}
