mod cli;
mod config;
mod error;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kwlbridge_core::Bridge;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("kwlbridge: {err}");
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let file = config::load(cli.config.as_deref())?;
    let bridge_config = config::resolve(&cli, file)?;

    let host = bridge_config.host.clone();
    let handle = Bridge::start(bridge_config)?;
    info!(host = %host, "bridge running, press ctrl-c to stop");

    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
    handle.stop().await;
    Ok(())
}
