//! Estimates which candidates' ballots flowed into which others in a Single
//! Transferable Vote count, using only the aggregate transfers a count report
//! publishes.
//!
//! A report is parsed into [`engine::ReplayEvent`]s, replayed in order
//! against an [`engine::Election`], and the finished election is then queried
//! for candidate totals, pairwise overlaps and the reconciliation checksum.

pub mod config;
pub mod database;
pub mod engine;
pub mod formats;
pub mod model;
pub mod replay;
pub mod reports;
pub mod util;
