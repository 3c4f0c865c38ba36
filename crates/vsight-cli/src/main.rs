//! `vsight` command-line tool.

mod cli;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // rustls 0.23 needs a process-wide crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    vsight_core::logging::init_tracing("vsight=warn");

    cli::run(cli::Cli::parse()).await
}
