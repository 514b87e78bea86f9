use ballot_node::{config, telemetry, BallotNode};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "ballot-node")]
#[command(about = "Ballot Node - delegated voting ledger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Config file path
    #[arg(short, long, value_name = "FILE", env = "BALLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// RPC HTTP port
    #[arg(long)]
    rpc_port: Option<u16>,

    /// Proposal names (comma-separated), used when the command log is fresh
    #[arg(long)]
    proposals: Option<String>,

    /// Keep the ledger in memory only
    #[arg(long)]
    in_memory: bool,

    /// Log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log as JSON
    #[arg(long)]
    json_logs: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    dump_config: Option<PathBuf>,
}

fn apply_overrides(config: &mut config::NodeConfig, args: &Args) -> anyhow::Result<()> {
    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(port) = args.rpc_port {
        config.rpc.http_addr = format!("0.0.0.0:{}", port).parse()?;
    }
    if let Some(proposals) = &args.proposals {
        config.ledger.proposals = proposals
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if args.in_memory {
        config.storage.enabled = false;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::NodeConfig::from_file(path)?,
        None => config::NodeConfig::default(),
    };
    apply_overrides(&mut config, &args)?;
    config.validate()?;

    if let Some(path) = &args.dump_config {
        config.to_file(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    telemetry::init_from_config(&config.logging)?;

    match &args.config {
        Some(path) => info!("Loaded configuration from: {:?}", path),
        None => info!("Using default configuration"),
    }
    info!("Configuration:");
    info!("  Name: {}", config.name);
    info!("  Proposals: {:?}", config.ledger.proposals);
    info!("  Late delegation: {:?}", config.ledger.late_delegation);
    info!("  Storage: {} ({:?})", config.storage.enabled, config.storage.data_dir);
    info!("  RPC: {} ({})", config.rpc.enabled, config.rpc.http_addr);

    let mut node = BallotNode::new(config)?;

    if let Err(e) = node.start().await {
        error!("Failed to start node: {}", e);
        return Err(e);
    }

    if let Err(e) = node.run().await {
        error!("Node error: {}", e);
        return Err(e);
    }

    info!("Ballot node shutdown complete");
    Ok(())
}
