use crate::database::{DatabaseError, Result};
/// Reports database schema
use sqlx::SqlitePool;

pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // One row per replayed count report
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS replay_runs (
            id INTEGER PRIMARY KEY,
            source_name TEXT NOT NULL,
            source_hash TEXT UNIQUE NOT NULL,
            data_format TEXT NOT NULL,
            candidate_count INTEGER NOT NULL,
            transfer_count INTEGER NOT NULL,
            total_transferred TEXT NOT NULL,
            checksum REAL NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Decimal totals are stored as text to keep them exact
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidate_stats (
            id INTEGER PRIMARY KEY,
            run_id INTEGER NOT NULL,
            candidate_id TEXT NOT NULL,
            name TEXT NOT NULL,
            column_index INTEGER NOT NULL,
            ratio TEXT NOT NULL,
            elected BOOLEAN NOT NULL,
            vote_count TEXT NOT NULL,
            vote_value TEXT NOT NULL,
            first_place_votes TEXT NOT NULL,
            transferred_votes TEXT NOT NULL,
            orphan_votes TEXT NOT NULL,
            orphan_vote_value TEXT NOT NULL,
            stacks INTEGER NOT NULL,
            FOREIGN KEY (run_id) REFERENCES replay_runs(id),
            UNIQUE(run_id, candidate_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidate_overlaps (
            id INTEGER PRIMARY KEY,
            run_id INTEGER NOT NULL,
            candidate_a TEXT NOT NULL,
            name_a TEXT NOT NULL,
            candidate_b TEXT NOT NULL,
            name_b TEXT NOT NULL,
            common_votes REAL NOT NULL,
            share_of_a REAL NOT NULL,
            share_of_b REAL NOT NULL,
            FOREIGN KEY (run_id) REFERENCES replay_runs(id),
            UNIQUE(run_id, candidate_a, candidate_b)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS processing_metrics (
            id INTEGER PRIMARY KEY,
            run_id INTEGER NOT NULL,
            stage TEXT NOT NULL,
            duration_ms INTEGER NOT NULL,
            events_processed INTEGER,
            created_at TIMESTAMP NOT NULL,
            FOREIGN KEY (run_id) REFERENCES replay_runs(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_candidate_stats_run ON candidate_stats(run_id)",
        "CREATE INDEX IF NOT EXISTS idx_candidate_overlaps_run ON candidate_overlaps(run_id)",
        "CREATE INDEX IF NOT EXISTS idx_processing_metrics_run ON processing_metrics(run_id)",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    Ok(())
}

/// Verify database schema integrity
pub async fn verify_schema(pool: &SqlitePool) -> Result<()> {
    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(pool)
            .await?;

    let expected_tables = vec![
        "candidate_overlaps",
        "candidate_stats",
        "processing_metrics",
        "replay_runs",
    ];

    for expected in &expected_tables {
        if !tables.iter().any(|name| name == expected) {
            return Err(DatabaseError::Integrity(format!(
                "Missing table: {}",
                expected
            )));
        }
    }

    Ok(())
}
