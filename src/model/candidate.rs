use super::ledger::TransferEntry;
use super::stack::Stack;
use super::weight::Weight;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// A candidate in the count, with every stack of ballots it received and the
/// ledger of transfers that built those stacks.
#[derive(Debug, Clone)]
pub struct Candidate {
    id: String,
    name: String,
    column: usize,
    max_candidates: usize,
    precision: u32,
    /// Surplus ratio, 1 until the candidate is declared elected.
    ratio: Decimal,
    elected: bool,
    votes: Vec<TransferEntry>,
    stacks: BTreeMap<Weight, Stack>,
}

impl Candidate {
    pub fn new(
        id: String,
        name: String,
        column: usize,
        max_candidates: usize,
        precision: u32,
        vote_count: Decimal,
    ) -> Candidate {
        let mut candidate = Candidate {
            id,
            name,
            column,
            max_candidates,
            precision,
            ratio: Decimal::ONE,
            elected: false,
            votes: Vec::new(),
            stacks: BTreeMap::new(),
        };

        if !vote_count.is_zero() {
            candidate
                .stacks
                .insert(Weight::ONE, Stack::seeded(max_candidates, vote_count));
            candidate
                .votes
                .push(TransferEntry::first_preference(vote_count));
        }

        candidate
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of this candidate in every prior-candidates vector.
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn ratio(&self) -> Decimal {
        self.ratio
    }

    pub fn is_elected(&self) -> bool {
        self.elected
    }

    pub fn ledger(&self) -> &[TransferEntry] {
        &self.votes
    }

    pub fn stacks(&self) -> impl Iterator<Item = (Weight, &Stack)> {
        self.stacks.iter().map(|(weight, stack)| (*weight, stack))
    }

    pub fn stack(&self, weight: Weight) -> Option<&Stack> {
        self.stacks.get(&weight)
    }

    /// Get the stack for `weight`, creating an empty one if needed.
    pub fn create_stack(&mut self, weight: Weight) -> &mut Stack {
        let max_candidates = self.max_candidates;
        self.stacks
            .entry(weight)
            .or_insert_with(|| Stack::new(max_candidates))
    }

    /// Stacks that a transfer at `weight` out of this candidate draws from.
    ///
    /// Before election this is the single stack keyed by `weight`. Once a
    /// surplus ratio is set, outgoing weights are `old weight x ratio`
    /// truncated, and several old stacks can land on the same new weight, so
    /// every stack whose rescaled key matches is returned.
    pub fn stacks_by_weight(&self, weight: Weight) -> Vec<(Weight, &Stack)> {
        if self.ratio == Decimal::ONE {
            return self
                .stacks
                .get(&weight)
                .map(|stack| vec![(weight, stack)])
                .unwrap_or_default();
        }

        self.stacks
            .iter()
            .filter(|(old_weight, _)| old_weight.rescaled(self.ratio, self.precision) == weight)
            .map(|(old_weight, stack)| (*old_weight, stack))
            .collect()
    }

    pub(crate) fn stack_mut(&mut self, weight: Weight) -> Option<&mut Stack> {
        self.stacks.get_mut(&weight)
    }

    pub(crate) fn set_ratio(&mut self, ratio: Decimal) {
        self.ratio = ratio;
        self.elected = true;
    }

    pub(crate) fn record(&mut self, entry: TransferEntry) {
        self.votes.push(entry);
    }

    pub fn vote_count(&self) -> Decimal {
        self.votes.iter().map(TransferEntry::vote_count).sum()
    }

    pub fn vote_value(&self) -> Decimal {
        self.votes.iter().map(TransferEntry::value).sum()
    }

    pub fn transferred_votes(&self) -> Decimal {
        self.stacks.values().map(Stack::transferred_votes).sum()
    }

    /// How many ballots ended here and could not be transferred.
    pub fn orphan_votes(&self) -> Decimal {
        self.stacks.values().map(Stack::orphan_votes).sum()
    }

    pub fn orphan_vote_value(&self) -> Decimal {
        self.stacks
            .iter()
            .map(|(weight, stack)| stack.orphan_votes() * weight.value())
            .sum()
    }

    pub fn first_place_votes(&self) -> Decimal {
        self.votes
            .iter()
            .filter(|entry| entry.source().is_none())
            .map(TransferEntry::vote_count)
            .sum()
    }

    pub fn prior_candidates(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.max_candidates];
        for stack in self.stacks.values() {
            for (total, prior) in totals.iter_mut().zip(stack.prior_candidates()) {
                *total += prior;
            }
        }
        totals
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Candidate {} ({} => {})>",
            self.name,
            self.vote_count().trunc(),
            self.vote_value().trunc()
        )
    }
}
