use crate::engine::Election;
use colored::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived totals for one candidate after a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub id: String,
    pub name: String,
    pub column: usize,
    pub ratio: Decimal,
    pub elected: bool,
    pub vote_count: Decimal,
    pub vote_value: Decimal,
    pub first_place_votes: Decimal,
    pub transferred_votes: Decimal,
    pub orphan_votes: Decimal,
    pub orphan_vote_value: Decimal,
    pub stacks: usize,
}

pub fn candidate_summaries(election: &Election) -> Vec<CandidateSummary> {
    election
        .candidates()
        .iter()
        .map(|c| CandidateSummary {
            id: c.id().to_string(),
            name: c.name().to_string(),
            column: c.column(),
            ratio: c.ratio(),
            elected: c.is_elected(),
            vote_count: c.vote_count(),
            vote_value: c.vote_value(),
            first_place_votes: c.first_place_votes(),
            transferred_votes: c.transferred_votes(),
            orphan_votes: c.orphan_votes(),
            orphan_vote_value: c.orphan_vote_value(),
            stacks: c.stacks().count(),
        })
        .collect()
}

pub fn print_summaries(summaries: &[CandidateSummary]) {
    println!(
        "\n{}",
        "👥 Candidate Transfer Summary".bright_cyan().bold()
    );
    println!("{}", "=".repeat(78).bright_cyan());
    println!(
        "{:<6} {:<28} {:>10} {:>10} {:>10} {:>10}",
        "Id", "Name", "Votes", "First", "Moved", "Orphan"
    );
    println!("{}", "-".repeat(78).bright_cyan());

    for s in summaries {
        let id = if s.elected {
            s.id.bright_green().bold()
        } else {
            s.id.normal()
        };
        println!(
            "{:<6} {:<28} {:>10} {:>10} {:>10} {:>10}",
            id,
            s.name,
            s.vote_count.round_dp(2),
            s.first_place_votes.round_dp(2),
            s.transferred_votes.round_dp(2),
            s.orphan_votes.round_dp(2)
        );
    }
    println!();
}
