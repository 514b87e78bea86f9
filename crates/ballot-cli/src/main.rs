//! Ballot CLI - command-line client for a ballot node.

pub mod commands;
pub mod config;
pub mod output;
pub mod rpc_client;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();

    if let Err(e) = commands::execute(cli.command, cli.rpc).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
