//! CLI command implementations.

use ballot_types::{ProposalIndex, VoterId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::str::FromStr;

use crate::config::CliConfig;
use crate::output::*;
use crate::rpc_client::RpcClient;

/// Main CLI.
#[derive(Parser)]
#[command(name = "ballot")]
#[command(about = "Ballot CLI - delegated voting from the command line")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// RPC endpoint URL
    #[arg(short, long, global = true, env = "BALLOT_RPC")]
    pub rpc: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Register a voter with weight 1
    Register {
        /// Voter id (0x hex or voter1... bech32)
        id: String,
        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Hand your vote to another voter
    Delegate {
        /// Voter receiving the delegation
        to: String,
        /// Calling voter (defaults to `default_voter` from config)
        #[arg(short, long)]
        from: Option<String>,
    },
    /// Vote for a proposal by index
    Vote {
        /// Proposal index
        proposal: ProposalIndex,
        /// Calling voter (defaults to `default_voter` from config)
        #[arg(short, long)]
        from: Option<String>,
    },
    /// List all voters in registration order
    Voters,
    /// Show a single voter
    Voter {
        id: String,
    },
    /// Show the proposal tally
    Proposals,
    /// Show the winning proposal
    Winner,
    /// Check the node is reachable
    Health,
    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Config commands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set { key: String, value: String },
    /// Get config value
    Get { key: String },
    /// Reset to defaults
    Reset,
}

fn parse_voter(s: &str) -> anyhow::Result<VoterId> {
    VoterId::from_str(s.trim()).map_err(|e| anyhow::anyhow!("Invalid voter id '{}': {}", s, e))
}

/// Pick the caller: explicit flag first, then the configured default.
pub fn resolve_caller(from: Option<&str>, config: &CliConfig) -> anyhow::Result<VoterId> {
    match from.or(config.default_voter.as_deref()) {
        Some(id) => parse_voter(id),
        None => anyhow::bail!("No caller given; pass --from or run `ballot config set default_voter <id>`"),
    }
}

/// Execute a command.
pub async fn execute(cmd: Commands, rpc: Option<String>) -> anyhow::Result<()> {
    let config = CliConfig::load()?;
    let rpc_url = rpc.unwrap_or_else(|| config.rpc_url.clone());
    let client = RpcClient::new(rpc_url);

    match cmd {
        Commands::Register { id, name } => {
            let id = parse_voter(&id)?;
            client.register(&id, &name).await?;
            print_success(&format!("Registered {}", id));
        }
        Commands::Delegate { to, from } => {
            let caller = resolve_caller(from.as_deref(), &config)?;
            let target = parse_voter(&to)?;
            client.delegate(&caller, &target).await?;
            print_success(&format!("{} delegated to {}", caller, target));
        }
        Commands::Vote { proposal, from } => {
            let caller = resolve_caller(from.as_deref(), &config)?;
            client.vote(&caller, proposal).await?;
            print_success(&format!("{} voted for proposal #{}", caller, proposal));
        }
        Commands::Voters => {
            let voters = client.get_all_voters().await?;
            if voters.is_empty() {
                print_info("No voters registered");
            } else {
                println!("{}", voters_table(&voters));
            }
        }
        Commands::Voter { id } => {
            let id = parse_voter(&id)?;
            match client.get_voter(&id).await? {
                Some(voter) => print_voter(&voter),
                None => print_info(&format!("{} is not registered", id)),
            }
        }
        Commands::Proposals => {
            let proposals = client.proposals().await?;
            let winner = client.winning_proposal().await?;
            println!("{}", proposals_table(&proposals, Some(winner)));
        }
        Commands::Winner => {
            let index = client.winning_proposal().await?;
            let name = client.winner_name().await?;
            println!("Winner: {} {}", format!("#{}", index).bright_green(), name.bold());
        }
        Commands::Health => {
            let health = client.health().await?;
            print_success(&format!(
                "{} is {}: {} voters, {} proposals",
                client.url(),
                health.status,
                health.voters,
                health.proposals
            ));
        }
        Commands::Config(cmd) => execute_config(cmd, config)?,
    }

    Ok(())
}

fn execute_config(cmd: ConfigCommands, mut config: CliConfig) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommands::Set { key, value } => {
            if key == "default_voter" && !value.is_empty() {
                parse_voter(&value)?;
            }
            config.set(&key, &value)?;
            config.save()?;
            print_success(&format!("{} updated", key));
        }
        ConfigCommands::Get { key } => {
            println!("{}", config.get(&key)?);
        }
        ConfigCommands::Reset => {
            CliConfig::default().save()?;
            print_success("Configuration reset");
        }
    }
    Ok(())
}
