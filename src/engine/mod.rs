pub mod events;
pub mod overlap;

pub use events::ReplayEvent;
pub use overlap::OverlapRow;

use crate::model::weight::DEFAULT_PRECISION;
use crate::model::{Candidate, Stack, TransferEntry, Weight};
use crate::util::to_f64;
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum ElectionError {
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),
    #[error("Candidate {0} declared twice")]
    DuplicateCandidate(String),
    #[error("Cannot declare candidate {id}: all {capacity} columns are in use")]
    CapacityExceeded { id: String, capacity: usize },
    #[error("Candidate {candidate} holds no votes at weight {weight}")]
    UnmatchedWeight { candidate: String, weight: Weight },
    #[error("Stacks of candidate {candidate} matching weight {weight} hold no votes")]
    ZeroSourceMass { candidate: String, weight: Weight },
    #[error(
        "Stack {weight} of candidate {candidate} would forward {transferred} of {vote_count} votes"
    )]
    NegativeOrphan {
        candidate: String,
        weight: Weight,
        vote_count: Decimal,
        transferred: Decimal,
    },
    #[error("Negative vote count {vote_count} transferred from {candidate}")]
    NegativeVoteCount {
        candidate: String,
        vote_count: Decimal,
    },
    #[error("Surplus ratio of candidate {0} was already set")]
    RatioAlreadySet(String),
    #[error("Surplus ratio {ratio} of candidate {candidate} is not positive")]
    InvalidRatio { candidate: String, ratio: Decimal },
}

pub type Result<T> = std::result::Result<T, ElectionError>;

/// Largest amount a proportional split may overshoot a stack by before the
/// transfer counts as forwarding votes the stack never held.
pub const SPLIT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 12);

/// Replays the transfers of one count and estimates, for every candidate,
/// which other candidates its ballots passed through.
///
/// Candidates get a column in declaration order; the column is also their
/// position in `candidates`, so column indices are always `0..n`.
#[derive(Debug, Clone)]
pub struct Election {
    candidates: Vec<Candidate>,
    columns: HashMap<String, usize>,
    max_candidates: usize,
    precision: u32,
    /// Total votes transferred, to reconcile against the prior-candidate mass.
    transfers: Decimal,
}

impl Election {
    pub fn new(max_candidates: usize) -> Self {
        Election::with_precision(max_candidates, DEFAULT_PRECISION)
    }

    pub fn with_precision(max_candidates: usize, precision: u32) -> Self {
        Election {
            candidates: Vec::with_capacity(max_candidates),
            columns: HashMap::with_capacity(max_candidates),
            max_candidates,
            precision,
            transfers: Decimal::ZERO,
        }
    }

    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn transfers(&self) -> Decimal {
        self.transfers
    }

    /// Candidates in declaration (column) order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: &str) -> Option<&Candidate> {
        self.columns.get(id).map(|&column| &self.candidates[column])
    }

    pub fn column(&self, id: &str) -> Option<usize> {
        self.columns.get(id).copied()
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.column(id)
            .ok_or_else(|| ElectionError::UnknownCandidate(id.to_string()))
    }

    /// Register a candidate under the next free column.
    pub fn add_candidate(&mut self, id: &str, name: &str, vote_count: Decimal) -> Result<usize> {
        if self.columns.contains_key(id) {
            return Err(ElectionError::DuplicateCandidate(id.to_string()));
        }
        let column = self.candidates.len();
        if column >= self.max_candidates {
            return Err(ElectionError::CapacityExceeded {
                id: id.to_string(),
                capacity: self.max_candidates,
            });
        }
        if vote_count.is_sign_negative() && !vote_count.is_zero() {
            return Err(ElectionError::NegativeVoteCount {
                candidate: id.to_string(),
                vote_count,
            });
        }

        self.candidates.push(Candidate::new(
            id.to_string(),
            name.to_string(),
            column,
            self.max_candidates,
            self.precision,
            vote_count,
        ));
        self.columns.insert(id.to_string(), column);
        Ok(column)
    }

    /// Set the surplus ratio of a candidate that was just elected.
    pub fn set_ratio(&mut self, id: &str, ratio: Decimal) -> Result<()> {
        let index = self.index_of(id)?;
        let candidate = &mut self.candidates[index];

        if candidate.is_elected() {
            return Err(ElectionError::RatioAlreadySet(id.to_string()));
        }
        if ratio <= Decimal::ZERO {
            return Err(ElectionError::InvalidRatio {
                candidate: id.to_string(),
                ratio,
            });
        }

        candidate.set_ratio(ratio);
        Ok(())
    }

    /// Move `vote_count` ballots at `weight` from `source_id` to `dest_id`.
    ///
    /// Every source stack matching the weight gives up its proportional share
    /// of the ballots, and hands the same share of its prior-candidate
    /// estimate on to the destination stack. The source itself is then added
    /// to the destination's priors for the full `vote_count`.
    pub fn transfer_votes(
        &mut self,
        source_id: &str,
        dest_id: &str,
        weight: Decimal,
        vote_count: Decimal,
    ) -> Result<()> {
        let weight = Weight::new(weight, self.precision);
        let source_index = self.index_of(source_id)?;
        let dest_index = self.index_of(dest_id)?;

        if vote_count.is_sign_negative() && !vote_count.is_zero() {
            return Err(ElectionError::NegativeVoteCount {
                candidate: source_id.to_string(),
                vote_count,
            });
        }

        let source = &self.candidates[source_index];
        let source_stacks = source.stacks_by_weight(weight);
        if source_stacks.is_empty() {
            return Err(ElectionError::UnmatchedWeight {
                candidate: source_id.to_string(),
                weight,
            });
        }

        let total_source_votes: Decimal = source_stacks
            .iter()
            .map(|(_, stack)| stack.vote_count())
            .sum();
        if total_source_votes <= Decimal::ZERO {
            return Err(ElectionError::ZeroSourceMass {
                candidate: source_id.to_string(),
                weight,
            });
        }

        // All shares are checked before any stack changes; a failed transfer
        // leaves the election untouched.
        let live: Vec<(Weight, &Stack)> = source_stacks
            .into_iter()
            .filter(|(_, stack)| !stack.vote_count().is_zero())
            .collect();

        // vote_count x (stack votes / total), multiplied first to stay exact.
        // The last stack takes the remainder so the shares sum to vote_count.
        let mut shares = Vec::with_capacity(live.len());
        let mut assigned = Decimal::ZERO;
        for (position, (_, stack)) in live.iter().enumerate() {
            let share = if position + 1 == live.len() {
                vote_count - assigned
            } else {
                vote_count * stack.vote_count() / total_source_votes
            };
            assigned += share;
            shares.push(share);
        }

        // Division rounds at 28 digits, so a stack being drained can be asked
        // for a hair more than it still holds. That excess goes to stacks with
        // room left; anything above SPLIT_TOLERANCE is a real over-transfer.
        let mut excess = Decimal::ZERO;
        for (share, (stack_weight, stack)) in shares.iter_mut().zip(&live) {
            let overshoot = *share - stack.orphan_votes();
            if overshoot > SPLIT_TOLERANCE {
                return Err(ElectionError::NegativeOrphan {
                    candidate: source_id.to_string(),
                    weight: *stack_weight,
                    vote_count: stack.vote_count(),
                    transferred: stack.transferred_votes() + *share,
                });
            }
            if overshoot > Decimal::ZERO {
                *share = stack.orphan_votes();
                excess += overshoot;
            } else if share.is_sign_negative() {
                excess += *share;
                *share = Decimal::ZERO;
            }
        }
        for (share, (_, stack)) in shares.iter_mut().zip(&live) {
            if excess <= Decimal::ZERO {
                break;
            }
            let room = stack.orphan_votes() - *share;
            if room > Decimal::ZERO {
                let moved = room.min(excess);
                *share += moved;
                excess -= moved;
            }
        }

        let mut forwarded = Vec::with_capacity(live.len());
        let mut inherited = vec![0.0; self.max_candidates];
        for (share, (stack_weight, stack)) in shares.into_iter().zip(live) {
            let share = share.min(stack.orphan_votes());
            let scale = to_f64(share / stack.vote_count());
            for (total, prior) in inherited.iter_mut().zip(stack.prior_candidates()) {
                *total += prior * scale;
            }
            forwarded.push((stack_weight, share));
        }

        let source = &mut self.candidates[source_index];
        for (stack_weight, share) in forwarded {
            if let Some(stack) = source.stack_mut(stack_weight) {
                stack.record_forwarded(share);
            }
        }

        let dest = &mut self.candidates[dest_index];
        let dest_stack = dest.create_stack(weight);
        dest_stack.absorb_priors(&inherited);
        dest_stack.add_prior(source_index, to_f64(vote_count));
        dest_stack.add_votes(vote_count);
        dest.record(TransferEntry::new(
            Some(source_id.to_string()),
            weight,
            vote_count,
        ));

        self.transfers += vote_count;
        Ok(())
    }

    pub fn apply(&mut self, event: &ReplayEvent) -> Result<()> {
        match event {
            ReplayEvent::DeclareCandidate {
                id,
                name,
                vote_count,
            } => self.add_candidate(id, name, *vote_count).map(|_| ()),
            ReplayEvent::Transfer {
                source,
                destination,
                weight,
                vote_count,
            } => self.transfer_votes(source, destination, *weight, *vote_count),
            ReplayEvent::DeclareElected { candidate, ratio } => self.set_ratio(candidate, *ratio),
        }
    }

    /// Estimated ballots listing both candidates, whichever came first.
    pub fn common_votes(&self, party_a: &str, party_b: &str) -> Result<f64> {
        let a = &self.candidates[self.index_of(party_a)?];
        let b = &self.candidates[self.index_of(party_b)?];
        Ok(a.prior_candidates()[b.column()] + b.prior_candidates()[a.column()])
    }

    /// Total votes transferred minus the prior-candidate mass left on
    /// ballots that stopped in each stack. Should be zero.
    pub fn checksum(&self) -> f64 {
        let attributed: f64 = self
            .candidates
            .iter()
            .flat_map(|candidate| candidate.stacks())
            .filter_map(|(_, stack)| {
                stack
                    .orphan_fraction()
                    .map(|fraction| stack.prior_candidates().iter().sum::<f64>() * fraction)
            })
            .sum();

        to_f64(self.transfers) - attributed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn w(value: Decimal) -> Weight {
        Weight::new(value, 5)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn three_candidates() -> Election {
        let mut election = Election::new(3);
        election.add_candidate("1001", "Anna", dec!(1000)).unwrap();
        election.add_candidate("1002", "Bjarni", dec!(300)).unwrap();
        election.add_candidate("1003", "Gunna", dec!(0)).unwrap();
        election
    }

    #[test]
    fn single_transfer_reconciles() {
        let mut election = three_candidates();
        election
            .transfer_votes("1001", "1002", dec!(1.00000), dec!(400))
            .unwrap();

        let a = election.candidate("1001").unwrap().stack(Weight::ONE).unwrap();
        assert_eq!(a.vote_count(), dec!(1000));
        assert_eq!(a.transferred_votes(), dec!(400));
        assert_eq!(a.orphan_votes(), dec!(600));

        let b = election.candidate("1002").unwrap();
        assert_eq!(b.stack(Weight::ONE).unwrap().vote_count(), dec!(700));
        assert!(close(b.prior_candidates()[0], 400.0));

        assert_eq!(election.transfers(), dec!(400));
        assert!(close(election.checksum(), 0.0));
    }

    #[test]
    fn priors_follow_forwarded_share() {
        let mut election = three_candidates();
        election
            .transfer_votes("1001", "1002", dec!(1), dec!(300))
            .unwrap();
        // Bjarni's unit stack now holds 600 ballots, 300 of which came via Anna.
        election
            .transfer_votes("1002", "1003", dec!(1), dec!(200))
            .unwrap();

        let gunna = election.candidate("1003").unwrap().prior_candidates();
        assert!(close(gunna[0], 100.0));
        assert!(close(gunna[1], 200.0));
        assert!(close(gunna[2], 0.0));

        assert!(close(election.common_votes("1001", "1003").unwrap(), 100.0));
        assert!(close(election.checksum(), 0.0));
    }

    #[test]
    fn rescaled_transfer_splits_across_colliding_stacks() {
        let mut election = three_candidates();
        election
            .transfer_votes("1002", "1001", dec!(1), dec!(100))
            .unwrap();
        election.add_candidate_stack_for_test("1003", dec!(1.00002), dec!(30));
        election.add_candidate_stack_for_test("1003", dec!(1.00003), dec!(10));
        election.set_ratio("1003", dec!(0.5)).unwrap();

        election
            .transfer_votes("1003", "1002", dec!(0.50001), dec!(20))
            .unwrap();

        let gunna = election.candidate("1003").unwrap();
        assert_eq!(gunna.stack(w(dec!(1.00002))).unwrap().transferred_votes(), dec!(15));
        assert_eq!(gunna.stack(w(dec!(1.00003))).unwrap().transferred_votes(), dec!(5));

        let bjarni = election.candidate("1002").unwrap();
        let stack = bjarni.stack(w(dec!(0.50001))).unwrap();
        assert_eq!(stack.vote_count(), dec!(20));
        assert!(close(stack.prior_candidates()[2], 20.0));
    }

    fn drained_by_chunks(first: Decimal, second: Decimal) -> Election {
        let mut election = three_candidates();
        election.add_candidate_stack_for_test("1003", dec!(1.00002), first);
        election.add_candidate_stack_for_test("1003", dec!(1.00003), second);
        election.set_ratio("1003", dec!(0.5)).unwrap();

        let chunks = [
            dec!(7),
            dec!(13),
            dec!(1),
            dec!(29),
            dec!(3.5),
            dec!(11.25),
            dec!(40),
            dec!(0.75),
        ];
        let mut remaining = first + second;
        for chunk in chunks.iter().cycle() {
            if remaining.is_zero() {
                break;
            }
            let step = (*chunk).min(remaining);
            election
                .transfer_votes("1003", "1002", dec!(0.50001), step)
                .unwrap();
            remaining -= step;

            for (weight, stack) in election.candidate("1003").unwrap().stacks() {
                assert!(
                    !stack.orphan_votes().is_sign_negative() || stack.orphan_votes().is_zero(),
                    "stack {} went negative: {}",
                    weight,
                    stack.orphan_votes()
                );
            }
        }
        election
    }

    #[test]
    fn colliding_stacks_drain_in_uneven_chunks() {
        let pairs = [
            (dec!(3265), dec!(584)),
            (dec!(1358), dec!(17)),
            (dec!(2), dec!(999)),
        ];
        for (first, second) in pairs.iter() {
            let election = drained_by_chunks(*first, *second);
            let gunna = election.candidate("1003").unwrap();

            assert!(gunna.orphan_votes() < SPLIT_TOLERANCE);
            assert_eq!(gunna.transferred_votes().round_dp(9), *first + *second);
            assert_eq!(election.transfers(), *first + *second);
        }
    }

    #[test]
    fn drained_stacks_reject_further_transfers() {
        let mut election = drained_by_chunks(dec!(3265), dec!(584));
        let before = election.transfers();

        let err = election
            .transfer_votes("1003", "1002", dec!(0.50001), dec!(1))
            .unwrap_err();
        assert!(matches!(err, ElectionError::NegativeOrphan { .. }));
        assert_eq!(election.transfers(), before);
    }

    #[test]
    fn unknown_candidates_are_fatal() {
        let mut election = three_candidates();
        assert!(matches!(
            election.transfer_votes("9999", "1002", dec!(1), dec!(1)),
            Err(ElectionError::UnknownCandidate(id)) if id == "9999"
        ));
        assert!(matches!(
            election.transfer_votes("1001", "9999", dec!(1), dec!(1)),
            Err(ElectionError::UnknownCandidate(_))
        ));
        assert!(matches!(
            election.set_ratio("9999", dec!(0.5)),
            Err(ElectionError::UnknownCandidate(_))
        ));
    }

    #[test]
    fn unmatched_weight_is_fatal() {
        let mut election = three_candidates();
        let err = election
            .transfer_votes("1001", "1002", dec!(0.5), dec!(10))
            .unwrap_err();
        assert!(matches!(err, ElectionError::UnmatchedWeight { .. }));
        assert_eq!(election.transfers(), Decimal::ZERO);
        assert!(election.candidate("1002").unwrap().stack(w(dec!(0.5))).is_none());
    }

    #[test]
    fn empty_source_stack_is_fatal() {
        let mut election = three_candidates();
        election.add_candidate_stack_for_test("1003", dec!(0.5), dec!(0));
        assert!(matches!(
            election.transfer_votes("1003", "1001", dec!(0.5), dec!(1)),
            Err(ElectionError::ZeroSourceMass { .. })
        ));
    }

    #[test]
    fn over_transfer_is_fatal_and_leaves_state_untouched() {
        let mut election = three_candidates();
        election
            .transfer_votes("1002", "1003", dec!(1), dec!(250))
            .unwrap();
        let err = election
            .transfer_votes("1002", "1003", dec!(1), dec!(100))
            .unwrap_err();
        assert!(matches!(err, ElectionError::NegativeOrphan { .. }));

        let bjarni = election.candidate("1002").unwrap();
        assert_eq!(bjarni.transferred_votes(), dec!(250));
        assert_eq!(election.candidate("1003").unwrap().vote_count(), dec!(250));
        assert_eq!(election.transfers(), dec!(250));
    }

    #[test]
    fn columns_are_assigned_once() {
        let mut election = three_candidates();
        let columns: Vec<usize> = ["1001", "1002", "1003"]
            .iter()
            .map(|id| election.column(id).unwrap())
            .collect();
        assert_eq!(columns, vec![0, 1, 2]);

        assert!(matches!(
            election.add_candidate("1002", "Bjarni", dec!(1)),
            Err(ElectionError::DuplicateCandidate(_))
        ));
        assert!(matches!(
            election.add_candidate("1004", "Siggi", dec!(1)),
            Err(ElectionError::CapacityExceeded { capacity: 3, .. })
        ));
        assert_eq!(election.column("1002"), Some(1));
    }

    #[test]
    fn ratio_is_set_once() {
        let mut election = three_candidates();
        election.set_ratio("1001", dec!(0.25)).unwrap();
        assert!(election.candidate("1001").unwrap().is_elected());
        assert!(matches!(
            election.set_ratio("1001", dec!(0.5)),
            Err(ElectionError::RatioAlreadySet(_))
        ));
        assert_eq!(election.candidate("1001").unwrap().ratio(), dec!(0.25));
        assert!(matches!(
            election.set_ratio("1002", dec!(0)),
            Err(ElectionError::InvalidRatio { .. })
        ));
    }

    #[test]
    fn common_votes_are_symmetric() {
        let mut election = three_candidates();
        election
            .transfer_votes("1001", "1002", dec!(1), dec!(120))
            .unwrap();
        election
            .transfer_votes("1002", "1003", dec!(1), dec!(42))
            .unwrap();
        election
            .transfer_votes("1003", "1001", dec!(1), dec!(7))
            .unwrap();

        let ids = ["1001", "1002", "1003"];
        for a in &ids {
            for b in &ids {
                let ab = election.common_votes(a, b).unwrap();
                let ba = election.common_votes(b, a).unwrap();
                assert!(close(ab, ba), "{} {}", a, b);
            }
        }
    }

    #[test]
    fn transfer_total_tracks_every_transfer() {
        let mut election = three_candidates();
        let moves = [
            ("1001", "1002", dec!(1), dec!(10)),
            ("1001", "1003", dec!(1), dec!(15.5)),
            ("1002", "1003", dec!(1), dec!(0)),
            ("1003", "1002", dec!(1), dec!(3.25)),
        ];
        let mut expected = Decimal::ZERO;
        for (source, dest, weight, votes) in moves.iter() {
            election.transfer_votes(source, dest, *weight, *votes).unwrap();
            expected += *votes;
            assert_eq!(election.transfers(), expected);
        }
        for candidate in election.candidates() {
            for (_, stack) in candidate.stacks() {
                assert!(stack.orphan_votes() >= Decimal::ZERO);
            }
        }
    }

    impl Election {
        fn add_candidate_stack_for_test(&mut self, id: &str, weight: Decimal, votes: Decimal) {
            let weight = Weight::new(weight, self.precision);
            let index = self.columns[id];
            let candidate = &mut self.candidates[index];
            candidate.create_stack(weight).add_votes(votes);
            candidate.record(TransferEntry::new(None, weight, votes));
        }
    }
}
