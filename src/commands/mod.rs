mod info;
mod overlap;
mod show;
mod store;

pub use info::info;
pub use overlap::overlap;
pub use show::show;
pub use store::store;

use colored::*;
use std::error::Error;
use std::path::Path;
use stv_transfers::config::ReplayConfig;
use stv_transfers::database::metrics::{MetricsCollector, ReplayStage};
use stv_transfers::database::SourceInfo;
use stv_transfers::engine::Election;
use stv_transfers::formats;
use stv_transfers::replay::{replay, ReplaySummary};
use stv_transfers::util::digest;

pub type CommandResult<T = ()> = Result<T, Box<dyn Error>>;

/// A count report replayed to the end.
pub struct Replayed {
    pub source: SourceInfo,
    pub election: Election,
    pub summary: ReplaySummary,
}

/// Parse and replay a report, timing both stages.
pub fn load(
    report: &Path,
    config: &ReplayConfig,
    metrics: &mut MetricsCollector,
) -> CommandResult<Replayed> {
    println!(
        "🚀 Replaying {} ({})",
        report.display().to_string().bright_cyan(),
        config.data_format.bright_cyan()
    );

    metrics.start_stage(ReplayStage::Parse);
    let parsed = formats::read_report(report, &config.data_format)?;
    metrics.end_stage(ReplayStage::Parse, Some(parsed.events.len() as u64));
    println!(
        "📋 Parsed {} events",
        parsed.events.len().to_string().bright_yellow()
    );

    metrics.start_stage(ReplayStage::Replay);
    let (election, summary) = replay(&parsed.events, config)?;
    metrics.end_stage(ReplayStage::Replay, Some(parsed.events.len() as u64));
    println!(
        "✅ Replayed {} candidates, {} transfers, {} elected",
        summary.candidates.to_string().bright_green(),
        summary.transfers.to_string().bright_green(),
        summary.elected.to_string().bright_green()
    );
    report_checksum(&summary, config.checksum_tolerance);

    let source = SourceInfo {
        name: report
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| report.display().to_string()),
        hash: digest(&parsed.bytes),
        data_format: config.data_format.clone(),
    };

    Ok(Replayed {
        source,
        election,
        summary,
    })
}

fn report_checksum(summary: &ReplaySummary, tolerance: f64) {
    if summary.is_reconciled(tolerance) {
        println!(
            "🧮 Checksum {} ({} votes transferred)",
            format!("{:.6}", summary.checksum).bright_green(),
            summary.total_transferred
        );
    } else {
        eprintln!(
            "⚠️  Checksum {} exceeds tolerance {} ({} votes transferred)",
            format!("{:.6}", summary.checksum).bright_red().bold(),
            tolerance,
            summary.total_transferred
        );
    }
}
