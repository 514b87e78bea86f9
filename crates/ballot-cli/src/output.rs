//! Output formatting utilities.

use ballot_types::{ProposalIndex, ProposalView, VoterView};
use colored::Colorize;
use tabled::{Table, Tabled};

/// Shorten a voter id for table columns.
pub fn format_id_short(id: &str) -> String {
    if id.len() > 12 {
        format!("{}...{}", &id[..10], &id[id.len() - 8..])
    } else {
        id.to_string()
    }
}

/// Describe where a voter's weight went.
pub fn voter_status(voter: &VoterView) -> String {
    match (voter.voted_proposal, &voter.delegate) {
        (Some(p), _) => format!("voted #{}", p),
        (None, Some(to)) => format!("delegated to {}", format_id_short(&to.to_string())),
        (None, None) => "undecided".to_string(),
    }
}

/// Print success message.
pub fn print_success(msg: &str) {
    println!("{}", format!("✓ {}", msg).green());
}

/// Print error message.
pub fn print_error(msg: &str) {
    eprintln!("{}", format!("✗ {}", msg).red());
}

/// Print info message.
pub fn print_info(msg: &str) {
    println!("{}", format!("ℹ {}", msg).blue());
}

#[derive(Tabled)]
struct VoterRow {
    #[tabled(rename = "Voter")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Weight")]
    weight: u64,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn voters_table(voters: &[VoterView]) -> String {
    let rows: Vec<VoterRow> = voters
        .iter()
        .map(|v| VoterRow {
            id: format_id_short(&v.id.to_string()),
            name: v.name.clone(),
            weight: v.weight,
            status: voter_status(v),
        })
        .collect();
    Table::new(rows).to_string()
}

#[derive(Tabled)]
struct ProposalRow {
    #[tabled(rename = "#")]
    index: ProposalIndex,
    #[tabled(rename = "Proposal")]
    name: String,
    #[tabled(rename = "Votes")]
    votes: u64,
    #[tabled(rename = "Note")]
    marker: String,
}

/// Proposal tally, with the current winner marked.
pub fn proposals_table(proposals: &[ProposalView], winner: Option<ProposalIndex>) -> String {
    let rows: Vec<ProposalRow> = proposals
        .iter()
        .map(|p| ProposalRow {
            index: p.index,
            name: p.name.clone(),
            votes: p.vote_count,
            marker: if Some(p.index) == winner { "winner".to_string() } else { String::new() },
        })
        .collect();
    Table::new(rows).to_string()
}

pub fn print_voter(voter: &VoterView) {
    println!("{}", "Voter".bold());
    println!("{}", "=".repeat(50));
    println!("Id:      {}", voter.id.to_string().bright_cyan());
    println!("Name:    {}", voter.name);
    println!("Weight:  {}", voter.weight.to_string().bright_yellow());
    println!("Status:  {}", voter_status(voter));
}
