use super::{load, CommandResult};
use colored::*;
use serde::Serialize;
use std::path::Path;
use stv_transfers::config::ReplayConfig;
use stv_transfers::database::metrics::MetricsCollector;
use stv_transfers::replay::ReplaySummary;
use stv_transfers::reports::{candidate_summaries, print_summaries, CandidateSummary};
use stv_transfers::util::write_serialized;

#[derive(Serialize)]
struct InfoReport<'a> {
    summary: &'a ReplaySummary,
    candidates: Vec<CandidateSummary>,
}

pub fn info(report: &Path, json: Option<&Path>, config: &ReplayConfig) -> CommandResult {
    let mut metrics = MetricsCollector::new();
    let replayed = load(report, config, &mut metrics)?;
    let candidates = candidate_summaries(&replayed.election);

    match json {
        Some(path) => {
            write_serialized(
                path,
                &InfoReport {
                    summary: &replayed.summary,
                    candidates,
                },
            )?;
            println!(
                "💾 Wrote candidate summary: {}",
                path.display().to_string().bright_green()
            );
        }
        None => print_summaries(&candidates),
    }

    metrics.print_summary();
    Ok(())
}
