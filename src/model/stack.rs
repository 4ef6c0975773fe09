use crate::util::to_f64;
use rust_decimal::Decimal;

/// All ballots a candidate holds at one weight, together with an estimate of
/// which candidates those ballots passed through before arriving here.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    vote_count: Decimal,
    transferred_votes: Decimal,
    /// Estimated ballots in this stack that previously counted for the
    /// candidate at each column.
    prior_candidates: Vec<f64>,
}

impl Stack {
    pub fn new(max_candidates: usize) -> Self {
        Stack {
            vote_count: Decimal::ZERO,
            transferred_votes: Decimal::ZERO,
            prior_candidates: vec![0.0; max_candidates],
        }
    }

    /// A stack of first-preference votes: no priors, only a count.
    pub fn seeded(max_candidates: usize, vote_count: Decimal) -> Self {
        Stack {
            vote_count,
            ..Stack::new(max_candidates)
        }
    }

    pub fn vote_count(&self) -> Decimal {
        self.vote_count
    }

    pub fn transferred_votes(&self) -> Decimal {
        self.transferred_votes
    }

    pub fn prior_candidates(&self) -> &[f64] {
        &self.prior_candidates
    }

    /// Votes that reached this stack and were never passed on.
    pub fn orphan_votes(&self) -> Decimal {
        self.vote_count - self.transferred_votes
    }

    /// Share of the stack that stopped here, or `None` for an empty stack.
    pub fn orphan_fraction(&self) -> Option<f64> {
        if self.vote_count.is_zero() {
            None
        } else {
            Some(to_f64(self.orphan_votes() / self.vote_count))
        }
    }

    pub(crate) fn add_votes(&mut self, vote_count: Decimal) {
        self.vote_count += vote_count;
    }

    pub(crate) fn record_forwarded(&mut self, votes: Decimal) {
        self.transferred_votes += votes;
    }

    pub(crate) fn add_prior(&mut self, column: usize, votes: f64) {
        self.prior_candidates[column] += votes;
    }

    pub(crate) fn absorb_priors(&mut self, priors: &[f64]) {
        for (total, prior) in self.prior_candidates.iter_mut().zip(priors) {
            *total += prior;
        }
    }
}
