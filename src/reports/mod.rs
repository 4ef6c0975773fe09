pub mod overlap;
pub mod summary;

pub use overlap::write_common_candidates;
pub use summary::{candidate_summaries, print_summaries, CandidateSummary};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
