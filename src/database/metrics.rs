/// Stage timing for a replay run
use chrono::{DateTime, Utc};
use instant::Instant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::TryFrom;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageMetrics {
    pub stage: ReplayStage,
    pub duration_ms: u64,
    pub events_processed: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplayStage {
    Parse,
    Replay,
    Report,
    Store,
}

impl std::fmt::Display for ReplayStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayStage::Parse => write!(f, "parse"),
            ReplayStage::Replay => write!(f, "replay"),
            ReplayStage::Report => write!(f, "report"),
            ReplayStage::Store => write!(f, "store"),
        }
    }
}

impl std::str::FromStr for ReplayStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parse" => Ok(ReplayStage::Parse),
            "replay" => Ok(ReplayStage::Replay),
            "report" => Ok(ReplayStage::Report),
            "store" => Ok(ReplayStage::Store),
            other => Err(format!("unknown stage: {}", other)),
        }
    }
}

#[derive(Default)]
pub struct MetricsCollector {
    stage_timers: HashMap<ReplayStage, Instant>,
    recorded: Vec<StageMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing a stage
    pub fn start_stage(&mut self, stage: ReplayStage) {
        self.stage_timers.insert(stage, Instant::now());
    }

    /// End timing a stage and record it
    pub fn end_stage(&mut self, stage: ReplayStage, events_processed: Option<u64>) -> StageMetrics {
        let duration = self
            .stage_timers
            .remove(&stage)
            .map(|start| u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);

        let metrics = StageMetrics {
            stage,
            duration_ms: duration,
            events_processed,
            timestamp: Utc::now(),
        };
        self.recorded.push(metrics.clone());
        metrics
    }

    pub fn metrics(&self) -> &[StageMetrics] {
        &self.recorded
    }

    /// Print performance summary
    pub fn print_summary(&self) {
        use colored::*;

        println!("\n{}", "📊 Replay Performance Summary".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_cyan());

        let mut total_duration = 0u64;

        for metric in &self.recorded {
            total_duration += metric.duration_ms;

            let stage_color = match metric.stage {
                ReplayStage::Parse => "yellow",
                ReplayStage::Replay => "blue",
                ReplayStage::Report => "magenta",
                ReplayStage::Store => "green",
            };

            println!(
                "{}: {} ms{}",
                format!("{:?}", metric.stage).color(stage_color),
                metric.duration_ms.to_string().bright_white(),
                if let Some(events) = metric.events_processed {
                    format!(" ({} events)", events.to_string().bright_yellow())
                } else {
                    String::new()
                }
            );
        }

        println!("{}", "-".repeat(50).bright_cyan());
        println!(
            "{}: {} ms",
            "Total Duration".bright_white().bold(),
            total_duration.to_string().bright_green().bold()
        );
        println!();
    }
}
