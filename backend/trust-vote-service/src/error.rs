/// Error types for the trust vote ledger
use thiserror::Error;
use uuid::Uuid;

use crate::domain::VoteKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("Vote already cast: item {item_id} holds a {active} vote, remove it before casting a new one")]
    VoteConflict { item_id: String, active: VoteKind },

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Item already in feed: {0}")]
    DuplicateItem(String),

    #[error("Pending vote not found: {0}")]
    PendingNotFound(Uuid),

    #[error("Vote request is stale: item {item_id} changed before confirmation")]
    StaleRequest { item_id: String },

    #[error("Confirmation does not match a {kind} vote")]
    ConfirmationMismatch { kind: VoteKind },

    #[error("Voting closed for item {item_id}")]
    VotingClosed { item_id: String },

    #[error("Vote count overflow: item {item_id} cannot take another {kind} vote")]
    CountOverflow { item_id: String, kind: VoteKind },

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
}

impl VoteError {
    /// Conditions the UI resolves by re-prompting the user
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            VoteError::VoteConflict { .. }
                | VoteError::StaleRequest { .. }
                | VoteError::ConfirmationMismatch { .. }
                | VoteError::VotingClosed { .. }
        )
    }
}

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, VoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_active_vote() {
        let err = VoteError::VoteConflict {
            item_id: "1".to_string(),
            active: VoteKind::Untrust,
        };
        let msg = err.to_string();
        assert!(msg.contains("untrust vote"));
        assert!(msg.contains("remove it"));
        assert!(err.is_user_recoverable());
    }

    #[test]
    fn test_lookup_errors_are_not_recoverable() {
        assert!(!VoteError::ItemNotFound("9".to_string()).is_user_recoverable());
        assert!(!VoteError::PendingNotFound(Uuid::nil()).is_user_recoverable());
    }
}
