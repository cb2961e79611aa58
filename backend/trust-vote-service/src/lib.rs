pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod seed;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use domain::{Confirmation, ContentItem, UntrustReason, VoteKind, VoteTally};
pub use error::{Result, VoteError};
pub use services::{CastOutcome, PendingVote, VoteLedger, VoteRequest};
