//! Icelandic STV count reports ("Úthlutun" printouts).
//!
//! The report lists every candidate with its first-preference count, then
//! walks through the count: each block of transfers starts with a
//! `Flutt frá` line naming the candidate giving up ballots and continues
//! with one `Flutt til` line per receiving candidate. An elected candidate is
//! announced with `KJÖRI`, followed either by its surplus ratio or by the
//! end of the allocation.

use super::{ParseError, Result};
use crate::engine::ReplayEvent;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;

lazy_static! {
    static ref ELECTED_RX: Regex = Regex::new(r"^(?P<candidate>\d{4}) (?P<name>.*) KJÖRI").unwrap();
    static ref CANDIDATE_RX: Regex =
        Regex::new(r"^(?P<candidate>\d{4}) (?P<name>.*) (?P<count>\d+\.\d{5})").unwrap();
    static ref SOURCE_RX: Regex = Regex::new(
        r"^Flutt frá (?P<candidate>\d{4}) .* (?P<count>\d+(?:\.\d+)?) x (?P<weight>\d+\.\d{5})"
    )
    .unwrap();
    static ref TARGET_RX: Regex = Regex::new(
        r"^Flutt til (?P<candidate>\d{4}) .* (?P<count>\d+(?:\.\d+)?) x (?P<weight>\d+\.\d{5}) = (?P<value>\d+\.\d{5})"
    )
    .unwrap();
    static ref RATIO_RX: Regex =
        Regex::new(r"^Umframhlutfall frambjóðanda (?P<ratio>\d+(?:\.\d+)?)").unwrap();
    static ref DONE_RX: Regex = Regex::new(r"Úthlutun lokið").unwrap();
}

fn decimal(caps: &Captures, group: &str, line: usize) -> Result<Decimal> {
    let value = &caps[group];
    Decimal::from_str(value).map_err(|_| ParseError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

/// Turn report text into replay events, in report order. Lines that match
/// no known shape are skipped.
pub fn parse_report(text: &str) -> Result<Vec<ReplayEvent>> {
    let mut events = Vec::new();
    let mut declared = HashSet::new();
    let mut source: Option<String> = None;
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

    while let Some((line_no, line)) = lines.next() {
        // Checked before candidate lines, which also start with an id.
        if let Some(caps) = ELECTED_RX.captures(line) {
            let candidate = caps["candidate"].to_string();
            source = Some(candidate.clone());

            for (line_no, line) in lines.by_ref() {
                if let Some(caps) = RATIO_RX.captures(line) {
                    events.push(ReplayEvent::DeclareElected {
                        candidate,
                        ratio: decimal(&caps, "ratio", line_no)?,
                    });
                    break;
                }
                if DONE_RX.is_match(line) {
                    break;
                }
            }
            continue;
        }

        if let Some(caps) = CANDIDATE_RX.captures(line) {
            let id = caps["candidate"].to_string();
            // Later tallies repeat the candidate listing.
            if declared.insert(id.clone()) {
                events.push(ReplayEvent::DeclareCandidate {
                    id,
                    name: caps["name"].trim().to_string(),
                    vote_count: decimal(&caps, "count", line_no)?,
                });
            }
            continue;
        }

        if let Some(caps) = SOURCE_RX.captures(line) {
            source = Some(caps["candidate"].to_string());
            continue;
        }

        if let Some(caps) = TARGET_RX.captures(line) {
            let destination = caps["candidate"].to_string();
            let source = match &source {
                Some(source) => source.clone(),
                None => {
                    return Err(ParseError::TransferWithoutSource {
                        line: line_no,
                        destination,
                    })
                }
            };

            events.push(ReplayEvent::Transfer {
                source,
                destination,
                weight: decimal(&caps, "weight", line_no)?,
                vote_count: decimal(&caps, "count", line_no)?,
            });
        }
    }

    Ok(events)
}
