pub mod metrics;
pub mod schema;

use crate::database::metrics::StageMetrics;
use crate::engine::OverlapRow;
use crate::reports::CandidateSummary;
use crate::replay::ReplaySummary;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Data integrity error: {0}")]
    Integrity(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// The count report a run was replayed from.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: String,
    pub hash: String,
    pub data_format: String,
}

/// Everything a replay produced, ready to be stored.
pub struct RunRecord<'a> {
    pub source: &'a SourceInfo,
    pub summary: &'a ReplaySummary,
    pub candidates: &'a [CandidateSummary],
    pub overlaps: &'a [OverlapRow],
    pub metrics: &'a [StageMetrics],
}

#[derive(Debug, sqlx::FromRow)]
pub struct RunInfo {
    pub id: i64,
    pub source_name: String,
    pub source_hash: String,
    pub data_format: String,
    pub candidate_count: i64,
    pub transfer_count: i64,
    pub total_transferred: String,
    pub checksum: f64,
    pub created_at: DateTime<Utc>,
}

/// SQLite database holding replay results
#[derive(Clone)]
pub struct ReportsDatabase {
    pool: SqlitePool,
}

impl ReportsDatabase {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Single connection so that `sqlite::memory:` is one database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        schema::create_schema(&pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        Ok(Self { pool })
    }

    pub async fn create_in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store a run, replacing any earlier run of the same source.
    pub async fn store_run(&self, record: &RunRecord<'_>) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<i64> =
            sqlx::query_scalar("SELECT id FROM replay_runs WHERE source_hash = ?")
                .bind(&record.source.hash)
                .fetch_optional(&mut *tx)
                .await?;

        if let Some(run_id) = previous {
            for table in &["candidate_stats", "candidate_overlaps", "processing_metrics"] {
                sqlx::query(&format!("DELETE FROM {} WHERE run_id = ?", table))
                    .bind(run_id)
                    .execute(&mut *tx)
                    .await?;
            }
            sqlx::query("DELETE FROM replay_runs WHERE id = ?")
                .bind(run_id)
                .execute(&mut *tx)
                .await?;
        }

        let run_id = sqlx::query(
            r#"
            INSERT INTO replay_runs
            (source_name, source_hash, data_format, candidate_count, transfer_count, total_transferred, checksum, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.source.name)
        .bind(&record.source.hash)
        .bind(&record.source.data_format)
        .bind(record.summary.candidates as i64)
        .bind(record.summary.transfers as i64)
        .bind(record.summary.total_transferred.to_string())
        .bind(record.summary.checksum)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for c in record.candidates {
            sqlx::query(
                r#"
                INSERT INTO candidate_stats
                (run_id, candidate_id, name, column_index, ratio, elected, vote_count, vote_value,
                 first_place_votes, transferred_votes, orphan_votes, orphan_vote_value, stacks)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(run_id)
            .bind(&c.id)
            .bind(&c.name)
            .bind(c.column as i64)
            .bind(c.ratio.to_string())
            .bind(c.elected)
            .bind(c.vote_count.to_string())
            .bind(c.vote_value.to_string())
            .bind(c.first_place_votes.to_string())
            .bind(c.transferred_votes.to_string())
            .bind(c.orphan_votes.to_string())
            .bind(c.orphan_vote_value.to_string())
            .bind(c.stacks as i64)
            .execute(&mut *tx)
            .await?;
        }

        for row in record.overlaps {
            sqlx::query(
                r#"
                INSERT INTO candidate_overlaps
                (run_id, candidate_a, name_a, candidate_b, name_b, common_votes, share_of_a, share_of_b)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(run_id)
            .bind(&row.candidate_a)
            .bind(&row.name_a)
            .bind(&row.candidate_b)
            .bind(&row.name_b)
            .bind(row.common_votes)
            .bind(row.share_of_a)
            .bind(row.share_of_b)
            .execute(&mut *tx)
            .await?;
        }

        for metric in record.metrics {
            sqlx::query(
                r#"
                INSERT INTO processing_metrics (run_id, stage, duration_ms, events_processed, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(run_id)
            .bind(metric.stage.to_string())
            .bind(metric.duration_ms as i64)
            .bind(metric.events_processed.map(|e| e as i64))
            .bind(metric.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(run_id)
    }

    pub async fn get_run_by_hash(&self, source_hash: &str) -> Result<Option<RunInfo>> {
        let run = sqlx::query_as::<_, RunInfo>(
            r#"
            SELECT id, source_name, source_hash, data_format, candidate_count, transfer_count,
                   total_transferred, checksum, created_at
            FROM replay_runs
            WHERE source_hash = ?
            "#,
        )
        .bind(source_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(run)
    }

    /// Overlap rows of a run, ordered by candidate ids.
    pub async fn get_overlaps(&self, run_id: i64) -> Result<Vec<OverlapRow>> {
        let rows = sqlx::query(
            r#"
            SELECT candidate_a, name_a, candidate_b, name_b, common_votes, share_of_a, share_of_b
            FROM candidate_overlaps
            WHERE run_id = ?
            ORDER BY candidate_a, candidate_b
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<OverlapRow> {
                Ok(OverlapRow {
                    candidate_a: row.try_get("candidate_a")?,
                    name_a: row.try_get("name_a")?,
                    candidate_b: row.try_get("candidate_b")?,
                    name_b: row.try_get("name_b")?,
                    common_votes: row.try_get("common_votes")?,
                    share_of_a: row.try_get("share_of_a")?,
                    share_of_b: row.try_get("share_of_b")?,
                })
            })
            .collect()
    }

    /// Candidate statistics of a run, in column order.
    pub async fn get_candidate_stats(&self, run_id: i64) -> Result<Vec<CandidateSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT candidate_id, name, column_index, ratio, elected, vote_count, vote_value,
                   first_place_votes, transferred_votes, orphan_votes, orphan_vote_value, stacks
            FROM candidate_stats
            WHERE run_id = ?
            ORDER BY column_index
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<CandidateSummary> {
                Ok(CandidateSummary {
                    id: row.try_get("candidate_id")?,
                    name: row.try_get("name")?,
                    column: row.try_get::<i64, _>("column_index")? as usize,
                    ratio: decimal_column(row, "ratio")?,
                    elected: row.try_get("elected")?,
                    vote_count: decimal_column(row, "vote_count")?,
                    vote_value: decimal_column(row, "vote_value")?,
                    first_place_votes: decimal_column(row, "first_place_votes")?,
                    transferred_votes: decimal_column(row, "transferred_votes")?,
                    orphan_votes: decimal_column(row, "orphan_votes")?,
                    orphan_vote_value: decimal_column(row, "orphan_vote_value")?,
                    stacks: row.try_get::<i64, _>("stacks")? as usize,
                })
            })
            .collect()
    }

    pub async fn count_metrics(&self, run_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM processing_metrics WHERE run_id = ?")
            .bind(run_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|_| {
        DatabaseError::Integrity(format!("Column {} holds non-decimal {:?}", column, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::metrics::ReplayStage;
    use rust_decimal_macros::dec;

    fn source(hash: &str) -> SourceInfo {
        SourceInfo {
            name: "stv.txt".to_string(),
            hash: hash.to_string(),
            data_format: "is_stv".to_string(),
        }
    }

    fn summary() -> ReplaySummary {
        ReplaySummary {
            candidates: 2,
            transfers: 1,
            elected: 0,
            total_transferred: dec!(400),
            checksum: 0.0,
            duration_ms: 3,
        }
    }

    fn candidates() -> Vec<CandidateSummary> {
        vec![CandidateSummary {
            id: "1001".into(),
            name: "Anna".into(),
            column: 0,
            ratio: dec!(1),
            elected: false,
            vote_count: dec!(1000.00000),
            vote_value: dec!(1000.00000),
            first_place_votes: dec!(1000.00000),
            transferred_votes: dec!(400),
            orphan_votes: dec!(600.00000),
            orphan_vote_value: dec!(600.00000),
            stacks: 1,
        }]
    }

    fn overlaps() -> Vec<OverlapRow> {
        vec![OverlapRow {
            candidate_a: "1001".into(),
            name_a: "Anna".into(),
            candidate_b: "1002".into(),
            name_b: "Bjarni".into(),
            common_votes: 400.0,
            share_of_a: 0.4,
            share_of_b: 1.0,
        }]
    }

    #[tokio::test]
    async fn schema_is_created() {
        let db = ReportsDatabase::create_in_memory().await.unwrap();
        schema::verify_schema(db.pool()).await.unwrap();
    }

    #[tokio::test]
    async fn stores_and_reads_back_a_run() {
        let db = ReportsDatabase::create_in_memory().await.unwrap();
        let source = source("abc");
        let summary = summary();
        let candidates = candidates();
        let overlaps = overlaps();
        let metrics = vec![StageMetrics {
            stage: ReplayStage::Replay,
            duration_ms: 3,
            events_processed: Some(3),
            timestamp: Utc::now(),
        }];

        let run_id = db
            .store_run(&RunRecord {
                source: &source,
                summary: &summary,
                candidates: &candidates,
                overlaps: &overlaps,
                metrics: &metrics,
            })
            .await
            .unwrap();

        let run = db.get_run_by_hash("abc").await.unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.candidate_count, 2);
        assert_eq!(run.total_transferred, "400");

        assert_eq!(db.get_overlaps(run_id).await.unwrap(), overlaps);
        assert_eq!(db.get_candidate_stats(run_id).await.unwrap(), candidates);
        assert_eq!(db.count_metrics(run_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn storing_same_source_replaces_run() {
        let db = ReportsDatabase::create_in_memory().await.unwrap();
        let source = source("same");
        let summary = summary();
        let candidates = candidates();
        let overlaps = overlaps();
        let record = RunRecord {
            source: &source,
            summary: &summary,
            candidates: &candidates,
            overlaps: &overlaps,
            metrics: &[],
        };

        db.store_run(&record).await.unwrap();
        let second = db.store_run(&record).await.unwrap();

        let run = db.get_run_by_hash("same").await.unwrap().unwrap();
        assert_eq!(run.id, second);
        assert_eq!(db.get_overlaps(second).await.unwrap().len(), 1);

        let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM replay_runs")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(runs, 1);
    }
}
