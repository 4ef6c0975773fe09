use super::CommandResult;
use colored::*;
use std::path::Path;
use stv_transfers::database::ReportsDatabase;
use stv_transfers::reports::print_summaries;

const TOP_PAIRS: usize = 10;

/// Print a stored run, looked up by the SHA-1 of its source report.
pub async fn show(database_path: &Path, source_hash: &str) -> CommandResult {
    let database_url = format!("sqlite:{}", database_path.display());
    let db = ReportsDatabase::new(&database_url).await?;

    let run = match db.get_run_by_hash(source_hash).await? {
        Some(run) => run,
        None => {
            return Err(format!(
                "No run stored for {} in {}",
                source_hash,
                database_path.display()
            )
            .into())
        }
    };

    println!(
        "📂 Run {} from {} ({}), stored {}",
        run.id.to_string().bright_green().bold(),
        run.source_name.bright_cyan(),
        run.data_format,
        run.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "   {} candidates, {} transfers, {} votes transferred, checksum {:.6}",
        run.candidate_count.to_string().bright_yellow(),
        run.transfer_count.to_string().bright_yellow(),
        run.total_transferred.bright_yellow(),
        run.checksum
    );

    print_summaries(&db.get_candidate_stats(run.id).await?);

    let mut overlaps = db.get_overlaps(run.id).await?;
    overlaps.sort_by(|a, b| b.common_votes.total_cmp(&a.common_votes));
    println!(
        "\n{} ({} pairs)",
        "🤝 Most shared votes".bright_cyan().bold(),
        overlaps.len()
    );
    for row in overlaps.iter().take(TOP_PAIRS) {
        println!(
            "  {} / {}: {:.2}",
            row.name_a.bright_white(),
            row.name_b.bright_white(),
            row.common_votes
        );
    }

    println!(
        "\n⏱️  {} stage timings recorded",
        db.count_metrics(run.id).await?
    );
    Ok(())
}
