use super::ReportResult;
use crate::engine::{Election, OverlapRow};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One semicolon-separated line per row:
/// `idA;nameA;idB;nameB;common;common/votesA;common/votesB`.
pub fn write_rows<W: Write>(out: &mut W, rows: &[OverlapRow]) -> ReportResult<()> {
    for row in rows {
        writeln!(
            out,
            "{};{};{};{};{};{};{}",
            row.candidate_a,
            row.name_a,
            row.candidate_b,
            row.name_b,
            row.common_votes,
            row.share_of_a,
            row.share_of_b
        )?;
    }
    Ok(())
}

/// Write every candidate pair sharing more than `threshold` ballots to
/// `path`, returning the rows written.
pub fn write_common_candidates(
    path: &Path,
    election: &Election,
    threshold: f64,
) -> ReportResult<Vec<OverlapRow>> {
    let rows = election.overlaps(threshold);
    let mut out = BufWriter::new(File::create(path)?);
    write_rows(&mut out, &rows)?;
    out.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_lines() {
        let rows = vec![OverlapRow {
            candidate_a: "1001".into(),
            name_a: "Anna".into(),
            candidate_b: "1002".into(),
            name_b: "Bjarni".into(),
            common_votes: 400.0,
            share_of_a: 0.4,
            share_of_b: 0.5,
        }];
        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1001;Anna;1002;Bjarni;400;0.4;0.5\n");
    }
}
