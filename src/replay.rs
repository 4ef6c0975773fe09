use crate::config::ReplayConfig;
use crate::engine::{Election, ElectionError, ReplayEvent};
use colored::*;
use instant::Instant;
use rust_decimal::Decimal;
use serde::Serialize;
use std::convert::TryFrom;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Event {position} ({event:?}) failed: {source}")]
    Election {
        position: usize,
        event: ReplayEvent,
        source: ElectionError,
    },
}

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    pub candidates: usize,
    pub transfers: usize,
    pub elected: usize,
    pub total_transferred: Decimal,
    pub checksum: f64,
    pub duration_ms: u64,
}

impl ReplaySummary {
    pub fn is_reconciled(&self, tolerance: f64) -> bool {
        self.checksum.abs() <= tolerance
    }
}

/// Apply `events` in order to a fresh election. Stops at the first event the
/// election rejects; nothing after it is applied.
pub fn replay(events: &[ReplayEvent], config: &ReplayConfig) -> Result<(Election, ReplaySummary)> {
    let start = Instant::now();
    let capacity = config.candidate_capacity.unwrap_or_else(|| {
        events
            .iter()
            .filter(|event| matches!(event, ReplayEvent::DeclareCandidate { .. }))
            .count()
    });

    let mut election = Election::with_precision(capacity, config.weight_precision);
    let mut summary = ReplaySummary::default();
    let mut current_source: Option<&str> = None;

    for (i, event) in events.iter().enumerate() {
        if config.progress {
            if let ReplayEvent::Transfer { source, .. } = event {
                if current_source != Some(source.as_str()) {
                    current_source = Some(source.as_str());
                    println!("  🔁 Processing {}", source.bright_cyan());
                }
            }
        }

        election
            .apply(event)
            .map_err(|source| ReplayError::Election {
                position: i + 1,
                event: event.clone(),
                source,
            })?;

        match event {
            ReplayEvent::DeclareCandidate { .. } => summary.candidates += 1,
            ReplayEvent::Transfer { .. } => summary.transfers += 1,
            ReplayEvent::DeclareElected { .. } => summary.elected += 1,
        }
    }

    summary.total_transferred = election.transfers();
    summary.checksum = election.checksum();
    summary.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    Ok((election, summary))
}
