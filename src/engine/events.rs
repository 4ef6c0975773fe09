use rust_decimal::Decimal;
use serde::Serialize;

/// What a count report says happened, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReplayEvent {
    DeclareCandidate {
        id: String,
        name: String,
        vote_count: Decimal,
    },
    Transfer {
        source: String,
        destination: String,
        weight: Decimal,
        vote_count: Decimal,
    },
    DeclareElected {
        candidate: String,
        ratio: Decimal,
    },
}
