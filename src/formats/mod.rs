pub mod is_stv;

use crate::engine::ReplayEvent;
use crate::util::{decode_text, read_source};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown data format: {0}")]
    UnknownFormat(String),
    #[error("Line {line}: invalid number {value:?}")]
    InvalidNumber { line: usize, value: String },
    #[error("Line {line}: transfer to {destination} before any source candidate")]
    TransferWithoutSource { line: usize, destination: String },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// A count report read into memory, with the bytes kept for hashing.
pub struct SourceReport {
    pub bytes: Vec<u8>,
    pub events: Vec<ReplayEvent>,
}

pub fn parse_events(data_format: &str, text: &str) -> Result<Vec<ReplayEvent>> {
    match data_format {
        "is_stv" => is_stv::parse_report(text),
        _ => Err(ParseError::UnknownFormat(data_format.to_string())),
    }
}

pub fn read_report(path: &Path, data_format: &str) -> Result<SourceReport> {
    let bytes = read_source(path)?;
    let text = decode_text(bytes.clone());
    let events = parse_events(data_format, &text)?;

    Ok(SourceReport { bytes, events })
}
