use super::{load, CommandResult};
use colored::*;
use std::path::Path;
use stv_transfers::config::ReplayConfig;
use stv_transfers::database::metrics::{MetricsCollector, ReplayStage};
use stv_transfers::reports::write_common_candidates;

pub fn overlap(report: &Path, output: &Path, config: &ReplayConfig) -> CommandResult {
    let mut metrics = MetricsCollector::new();
    let replayed = load(report, config, &mut metrics)?;

    metrics.start_stage(ReplayStage::Report);
    let rows = write_common_candidates(output, &replayed.election, config.overlap_threshold)?;
    metrics.end_stage(ReplayStage::Report, Some(rows.len() as u64));

    println!(
        "💾 Wrote {} candidate pairs above {} common votes: {}",
        rows.len().to_string().bright_yellow(),
        config.overlap_threshold,
        output.display().to_string().bright_green()
    );

    metrics.print_summary();
    Ok(())
}
