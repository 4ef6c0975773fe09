mod commands;

use crate::commands::{info, overlap, show, store};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use stv_transfers::config::{ConfigError, ReplayConfig};

#[derive(Parser)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ReplayOpts {
    /// JSON replay configuration
    #[clap(long)]
    config: Option<PathBuf>,
    /// Report data format (e.g., "is_stv")
    #[clap(long)]
    format: Option<String>,
    /// Decimal places transfer weights are truncated to
    #[clap(long)]
    precision: Option<u32>,
    /// Length of the prior-candidate vectors
    #[clap(long)]
    capacity: Option<usize>,
    /// Only report common votes above this count
    #[clap(long)]
    threshold: Option<f64>,
    /// Don't print progress for each source candidate
    #[clap(long)]
    quiet: bool,
}

impl ReplayOpts {
    fn resolve(&self) -> Result<ReplayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ReplayConfig::from_file(path)?,
            None => ReplayConfig::default(),
        };

        if let Some(format) = &self.format {
            config.data_format = format.clone();
        }
        if let Some(precision) = self.precision {
            config.weight_precision = precision;
        }
        if let Some(capacity) = self.capacity {
            config.candidate_capacity = Some(capacity);
        }
        if let Some(threshold) = self.threshold {
            config.overlap_threshold = threshold;
        }
        if self.quiet {
            config.progress = false;
        }

        Ok(config)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Replay a count report and summarize every candidate.
    Info {
        /// Count report
        report: PathBuf,
        /// Write the summary as JSON instead of printing a table
        #[clap(long)]
        json: Option<PathBuf>,
        #[clap(flatten)]
        replay: ReplayOpts,
    },
    /// Replay a count report and write shared votes per candidate pair.
    Overlap {
        /// Count report
        report: PathBuf,
        /// Semicolon-separated output file
        output: PathBuf,
        #[clap(flatten)]
        replay: ReplayOpts,
    },
    /// Replay a count report into a SQLite reports database.
    Store {
        /// Count report
        report: PathBuf,
        /// SQLite database path
        database_path: PathBuf,
        #[clap(flatten)]
        replay: ReplayOpts,
    },
    /// Print a run stored in a reports database.
    Show {
        /// SQLite database path
        database_path: PathBuf,
        /// SHA-1 of the stored count report
        source_hash: String,
    },
}

#[tokio::main]
async fn main() {
    let opts = Opts::parse();

    let result = match opts.command {
        Command::Info {
            report,
            json,
            replay,
        } => match replay.resolve() {
            Ok(config) => info(&report, json.as_deref(), &config),
            Err(e) => Err(e.into()),
        },
        Command::Overlap {
            report,
            output,
            replay,
        } => match replay.resolve() {
            Ok(config) => overlap(&report, &output, &config),
            Err(e) => Err(e.into()),
        },
        Command::Store {
            report,
            database_path,
            replay,
        } => match replay.resolve() {
            Ok(config) => store(&report, &database_path, &config).await,
            Err(e) => Err(e.into()),
        },
        Command::Show {
            database_path,
            source_hash,
        } => show(&database_path, &source_hash).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Replay failed: {}", e);
        std::process::exit(1);
    }
}
