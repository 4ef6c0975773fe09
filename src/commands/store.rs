use super::{load, CommandResult};
use colored::*;
use std::path::Path;
use stv_transfers::config::ReplayConfig;
use stv_transfers::database::metrics::{MetricsCollector, ReplayStage};
use stv_transfers::database::{ReportsDatabase, RunRecord};
use stv_transfers::reports::candidate_summaries;

pub async fn store(report: &Path, database_path: &Path, config: &ReplayConfig) -> CommandResult {
    let mut metrics = MetricsCollector::new();
    let replayed = load(report, config, &mut metrics)?;

    metrics.start_stage(ReplayStage::Report);
    let candidates = candidate_summaries(&replayed.election);
    let overlaps = replayed.election.overlaps(config.overlap_threshold);
    metrics.end_stage(ReplayStage::Report, Some(overlaps.len() as u64));

    let database_url = format!("sqlite:{}", database_path.display());
    let db = ReportsDatabase::new(&database_url).await?;
    println!(
        "✅ Database initialized: {}",
        database_path.display().to_string().bright_green()
    );

    metrics.start_stage(ReplayStage::Store);
    let run_id = db
        .store_run(&RunRecord {
            source: &replayed.source,
            summary: &replayed.summary,
            candidates: &candidates,
            overlaps: &overlaps,
            metrics: metrics.metrics(),
        })
        .await?;
    metrics.end_stage(ReplayStage::Store, Some(overlaps.len() as u64));

    println!(
        "🎉 Stored run {} for {} ({} candidates, {} pairs)",
        run_id.to_string().bright_green().bold(),
        replayed.source.name.bright_cyan(),
        candidates.len().to_string().bright_yellow(),
        overlaps.len().to_string().bright_yellow()
    );
    println!("   Source hash: {}", replayed.source.hash.bright_white());

    metrics.print_summary();
    Ok(())
}
