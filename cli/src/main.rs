//! routeprobe CLI binary
//!
//! Runs the smoke suite once against the configured backend and prints the
//! report. Exits non-zero only when the run could not start.

#![allow(unused_crate_dependencies)]

use clap::Parser;
use cli::Cli;
use routeprobe_core::utils::init_tracing;
use routeprobe_core::HttpTransport;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli).await {
        error!("routeprobe failed: {}", e);
        eprintln!("Error [{}]: {}", e.code(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> cli::Result<()> {
    let config = cli.resolve()?;
    let transport = HttpTransport::new()?;
    let mut stdout = std::io::stdout().lock();
    cli::run(config, transport, &mut stdout).await?;
    Ok(())
}
