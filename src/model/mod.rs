pub mod candidate;
pub mod ledger;
pub mod stack;
pub mod weight;

pub use candidate::Candidate;
pub use ledger::TransferEntry;
pub use stack::Stack;
pub use weight::Weight;
