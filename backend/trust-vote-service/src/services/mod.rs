pub mod ledger;

pub use ledger::{CastOutcome, PendingVote, VoteLedger, VoteRequest};
