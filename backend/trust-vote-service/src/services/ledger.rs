use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Confirmation, ContentItem, Prompt, VoteKind, VoteRecord, VoteTally};
use crate::error::{Result, VoteError};

/// Vote awaiting the user's answer to a confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingVote {
    pub token: Uuid,
    pub item_id: String,
    pub kind: VoteKind,
    pub prompt: Prompt,
    pub requested_at: DateTime<Utc>,
}

/// First phase of a vote
#[derive(Debug, Clone, PartialEq)]
pub enum VoteRequest {
    /// Same kind re-requested: vote withdrawn immediately
    Retracted(VoteTally),
    /// New vote: present `prompt` and answer with `confirm_vote` or `cancel_vote`
    Pending(PendingVote),
}

/// Result of the one-shot `cast_vote`
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    Applied(VoteTally),
    Retracted(VoteTally),
    /// A new vote needs an answer first; nothing was mutated
    ConfirmationRequired(Prompt),
}

/// In-memory trust vote ledger for the current user's feed
///
/// Items are kept in feed order. Every mutation goes through
/// `request_vote` / `confirm_vote`, which enforce one active vote per item:
/// - no vote + request: pending until confirmed (trust) or flagged (untrust)
/// - same kind re-requested: retracted, no confirmation
/// - opposite kind requested: `VoteError::VoteConflict`, nothing changes
#[derive(Debug, Clone)]
pub struct VoteLedger {
    voter: String,
    items: Vec<ContentItem>,
    pending: HashMap<Uuid, PendingVote>,
}

impl VoteLedger {
    pub fn new(voter: impl Into<String>) -> Self {
        Self {
            voter: voter.into(),
            items: Vec::new(),
            pending: HashMap::new(),
        }
    }

    /// Build a ledger from a feed, rejecting duplicate ids
    pub fn with_items(voter: impl Into<String>, items: Vec<ContentItem>) -> Result<Self> {
        let mut ledger = Self::new(voter);
        for item in items {
            ledger.insert_item(item)?;
        }
        Ok(ledger)
    }

    pub fn voter(&self) -> &str {
        &self.voter
    }

    /// Add an item entering the feed
    pub fn insert_item(&mut self, item: ContentItem) -> Result<()> {
        if self.position(item.id()).is_some() {
            return Err(VoteError::DuplicateItem(item.id().to_string()));
        }
        debug!(item_id = %item.id(), "Item added to feed");
        self.items.push(item);
        Ok(())
    }

    /// Drop an item leaving the feed along with any vote pending on it
    pub fn remove_item(&mut self, item_id: &str) -> Result<ContentItem> {
        let pos = self
            .position(item_id)
            .ok_or_else(|| VoteError::ItemNotFound(item_id.to_string()))?;
        self.pending.retain(|_, p| p.item_id != item_id);
        debug!(item_id = %item_id, "Item removed from feed");
        Ok(self.items.remove(pos))
    }

    pub fn item(&self, item_id: &str) -> Result<&ContentItem> {
        self.items
            .iter()
            .find(|i| i.id() == item_id)
            .ok_or_else(|| VoteError::ItemNotFound(item_id.to_string()))
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn tally(&self, item_id: &str) -> Result<VoteTally> {
        Ok(self.item(item_id)?.tally())
    }

    pub fn trust_percentage(&self, item_id: &str) -> Result<f64> {
        Ok(self.item(item_id)?.trust_percentage())
    }

    pub fn history(&self, item_id: &str) -> Result<&[VoteRecord]> {
        Ok(self.item(item_id)?.history())
    }

    pub fn pending(&self, token: Uuid) -> Option<&PendingVote> {
        self.pending.get(&token)
    }

    /// Stop accepting new votes on an item; existing votes can still be retracted
    pub fn close_voting(&mut self, item_id: &str) -> Result<()> {
        let item = self.item_mut(item_id)?;
        item.voting.close();
        info!(item_id = %item_id, "Voting closed");
        Ok(())
    }

    /// Phase one of a vote.
    ///
    /// Retractions are applied immediately. New votes are parked under a token
    /// until `confirm_vote`; no counts change before then.
    pub fn request_vote(&mut self, item_id: &str, kind: VoteKind) -> Result<VoteRequest> {
        self.request_vote_at(item_id, kind, Utc::now())
    }

    pub fn request_vote_at(
        &mut self,
        item_id: &str,
        kind: VoteKind,
        now: DateTime<Utc>,
    ) -> Result<VoteRequest> {
        let voter = self.voter.clone();
        let item = self.item_mut(item_id)?;

        match item.current_user_vote() {
            Some(active) if active == kind => {
                item.retract(kind, &voter);
                let tally = item.tally();
                info!(
                    item_id = %item_id,
                    kind = %kind,
                    trust = tally.trust_count,
                    untrust = tally.untrust_count,
                    "Vote retracted"
                );
                // A retraction invalidates anything still waiting on this item
                self.pending.retain(|_, p| p.item_id != item_id);
                Ok(VoteRequest::Retracted(tally))
            }
            Some(active) => {
                debug!(item_id = %item_id, active = %active, requested = %kind, "Vote conflict");
                Err(VoteError::VoteConflict {
                    item_id: item_id.to_string(),
                    active,
                })
            }
            None => {
                if !item.voting.accepts_votes_at(now) {
                    return Err(VoteError::VotingClosed {
                        item_id: item_id.to_string(),
                    });
                }
                // Asking twice for the same dialog hands back the open token
                if let Some(open) = self
                    .pending
                    .values()
                    .find(|p| p.item_id == item_id && p.kind == kind)
                {
                    return Ok(VoteRequest::Pending(open.clone()));
                }
                let pending = PendingVote {
                    token: Uuid::new_v4(),
                    item_id: item_id.to_string(),
                    kind,
                    prompt: Prompt::for_kind(kind),
                    requested_at: now,
                };
                debug!(item_id = %item_id, kind = %kind, token = %pending.token, "Vote awaiting confirmation");
                self.pending.insert(pending.token, pending.clone());
                Ok(VoteRequest::Pending(pending))
            }
        }
    }

    /// Phase two: apply a pending vote with the user's answer
    pub fn confirm_vote(&mut self, token: Uuid, confirmation: Confirmation) -> Result<VoteTally> {
        self.confirm_vote_at(token, confirmation, Utc::now())
    }

    pub fn confirm_vote_at(
        &mut self,
        token: Uuid,
        confirmation: Confirmation,
        now: DateTime<Utc>,
    ) -> Result<VoteTally> {
        let pending = self
            .pending
            .get(&token)
            .cloned()
            .ok_or(VoteError::PendingNotFound(token))?;

        if !confirmation.satisfies(pending.kind) {
            // Token stays valid so the dialog can be answered again
            return Err(VoteError::ConfirmationMismatch { kind: pending.kind });
        }
        self.pending.remove(&token);

        let voter = self.voter.clone();
        let item = self.item_mut(&pending.item_id)?;

        if let Some(active) = item.current_user_vote() {
            debug!(item_id = %pending.item_id, active = %active, "Pending vote superseded");
            return Err(VoteError::StaleRequest {
                item_id: pending.item_id,
            });
        }
        if !item.voting.accepts_votes_at(now) {
            return Err(VoteError::VotingClosed {
                item_id: pending.item_id,
            });
        }

        item.apply(VoteRecord {
            voter,
            kind: pending.kind,
            reason: confirmation.reason(),
            comment: None,
            voter_credibility: None,
            cast_at: now,
        })?;
        let tally = item.tally();

        info!(
            item_id = %pending.item_id,
            kind = %pending.kind,
            reason = confirmation.reason().map(|r| r.as_str()).unwrap_or("-"),
            trust = tally.trust_count,
            untrust = tally.untrust_count,
            "Vote recorded"
        );

        Ok(tally)
    }

    /// User dismissed the dialog; returns whether a pending vote was dropped
    pub fn cancel_vote(&mut self, token: Uuid) -> bool {
        match self.pending.remove(&token) {
            Some(pending) => {
                debug!(item_id = %pending.item_id, kind = %pending.kind, "Vote dismissed");
                true
            }
            None => false,
        }
    }

    /// One-shot vote: both phases in a single call.
    ///
    /// A new vote without `confirmation` leaves the ledger untouched and
    /// reports the prompt the UI must show.
    pub fn cast_vote(
        &mut self,
        item_id: &str,
        kind: VoteKind,
        confirmation: Option<Confirmation>,
    ) -> Result<CastOutcome> {
        // A dialog opened through `request_vote` must survive a one-shot call
        let dialog_open = self
            .pending
            .values()
            .any(|p| p.item_id == item_id && p.kind == kind);

        match self.request_vote(item_id, kind)? {
            VoteRequest::Retracted(tally) => Ok(CastOutcome::Retracted(tally)),
            VoteRequest::Pending(pending) => match confirmation {
                Some(confirmation) => {
                    let result = self.confirm_vote(pending.token, confirmation);
                    if result.is_err() && !dialog_open {
                        self.pending.remove(&pending.token);
                    }
                    result.map(CastOutcome::Applied)
                }
                None => {
                    if !dialog_open {
                        self.pending.remove(&pending.token);
                    }
                    Ok(CastOutcome::ConfirmationRequired(pending.prompt))
                }
            },
        }
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id() == item_id)
    }

    fn item_mut(&mut self, item_id: &str) -> Result<&mut ContentItem> {
        self.items
            .iter_mut()
            .find(|i| i.id() == item_id)
            .ok_or_else(|| VoteError::ItemNotFound(item_id.to_string()))
    }
}
