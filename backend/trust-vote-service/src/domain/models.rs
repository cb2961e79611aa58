use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VoteError};

// ============================================================================
// Vote kinds
// ============================================================================

/// Credibility vote a user can hold on a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Trust,
    Untrust,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Trust => "trust",
            VoteKind::Untrust => "untrust",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a user must pick before an untrust vote is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UntrustReason {
    MisleadingInformation,
    ScamFraud,
    ManipulatedMedia,
}

impl UntrustReason {
    /// All reasons in the order they are offered to the user
    pub const ALL: [UntrustReason; 3] = [
        UntrustReason::MisleadingInformation,
        UntrustReason::ScamFraud,
        UntrustReason::ManipulatedMedia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UntrustReason::MisleadingInformation => "misleading_information",
            UntrustReason::ScamFraud => "scam_fraud",
            UntrustReason::ManipulatedMedia => "manipulated_media",
        }
    }

    /// Label shown in the flag dialog
    pub fn label(&self) -> &'static str {
        match self {
            UntrustReason::MisleadingInformation => "Misleading Information",
            UntrustReason::ScamFraud => "Scam/Fraud",
            UntrustReason::ManipulatedMedia => "Manipulated Media",
        }
    }

    /// Pick a reason by its 1-based menu position
    pub fn from_choice(choice: usize) -> Option<Self> {
        choice
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx).copied())
    }
}

impl fmt::Display for UntrustReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User answer to the dialog shown before a new vote is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confirmation {
    /// "I verify this content is true and accurate"
    Verified,
    /// Content flagged with the selected reason
    Flagged(UntrustReason),
}

impl Confirmation {
    /// Whether this answer is the one required for `kind`
    pub fn satisfies(&self, kind: VoteKind) -> bool {
        matches!(
            (self, kind),
            (Confirmation::Verified, VoteKind::Trust)
                | (Confirmation::Flagged(_), VoteKind::Untrust)
        )
    }

    pub fn reason(&self) -> Option<UntrustReason> {
        match self {
            Confirmation::Verified => None,
            Confirmation::Flagged(reason) => Some(*reason),
        }
    }
}

/// Dialog the UI has to present before a new vote can be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub title: &'static str,
    pub message: &'static str,
    /// Reasons to choose from; empty for a plain verify/cancel dialog
    pub reasons: Vec<UntrustReason>,
}

impl Prompt {
    pub fn for_kind(kind: VoteKind) -> Self {
        match kind {
            VoteKind::Trust => Self {
                title: "Verify Content",
                message: "I verify this content is true and accurate",
                reasons: Vec::new(),
            },
            VoteKind::Untrust => Self {
                title: "Flag Content",
                message: "Please select a reason for flagging this content:",
                reasons: UntrustReason::ALL.to_vec(),
            },
        }
    }
}

// ============================================================================
// Voting window
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingStatus {
    Active,
    Closed,
}

/// Period during which new votes are accepted on an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingWindow {
    pub ends_at: Option<DateTime<Utc>>,
    pub status: VotingStatus,
}

impl VotingWindow {
    /// Window with no deadline
    pub fn open() -> Self {
        Self {
            ends_at: None,
            status: VotingStatus::Active,
        }
    }

    pub fn until(ends_at: DateTime<Utc>) -> Self {
        Self {
            ends_at: Some(ends_at),
            status: VotingStatus::Active,
        }
    }

    pub fn accepts_votes_at(&self, now: DateTime<Utc>) -> bool {
        self.status == VotingStatus::Active && self.ends_at.map_or(true, |end| now < end)
    }

    pub fn close(&mut self) {
        self.status = VotingStatus::Closed;
    }
}

impl Default for VotingWindow {
    fn default() -> Self {
        Self::open()
    }
}

// ============================================================================
// Content items
// ============================================================================

/// Entry in an item's voting history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: String,
    pub kind: VoteKind,
    pub reason: Option<UntrustReason>,
    /// Free-text note left with the vote
    #[serde(default)]
    pub comment: Option<String>,
    /// Voter's credibility score (0-100) at the time of the vote
    #[serde(default)]
    pub voter_credibility: Option<u8>,
    pub cast_at: DateTime<Utc>,
}

/// Content item as seen by the vote ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    id: String,
    trust_count: u64,
    untrust_count: u64,
    current_user_vote: Option<VoteKind>,
    pub voting: VotingWindow,
    history: Vec<VoteRecord>,
}

impl ContentItem {
    /// New item entering the feed with preset counts and no user vote
    pub fn new(id: impl Into<String>, trust_count: u64, untrust_count: u64) -> Self {
        Self {
            id: id.into(),
            trust_count,
            untrust_count,
            current_user_vote: None,
            voting: VotingWindow::open(),
            history: Vec::new(),
        }
    }

    pub fn with_voting_window(mut self, voting: VotingWindow) -> Self {
        self.voting = voting;
        self
    }

    /// Restore an item where the user already holds `vote`.
    ///
    /// The matching count must already include the user's unit.
    pub fn with_user_vote(mut self, vote: VoteKind) -> Result<Self> {
        if self.count(vote) == 0 {
            return Err(VoteError::InvalidSeed(format!(
                "item {} has a {} vote but a zero {} count",
                self.id, vote, vote
            )));
        }
        self.current_user_vote = Some(vote);
        Ok(self)
    }

    /// Votes other users cast before the item entered the feed.
    ///
    /// Counts are aggregates and already include these votes.
    pub fn with_history(mut self, history: Vec<VoteRecord>) -> Result<Self> {
        for kind in [VoteKind::Trust, VoteKind::Untrust] {
            let recorded = history.iter().filter(|r| r.kind == kind).count() as u64;
            if recorded > self.count(kind) {
                return Err(VoteError::InvalidSeed(format!(
                    "item {} lists {} {} votes in its history but counts {}",
                    self.id,
                    recorded,
                    kind,
                    self.count(kind)
                )));
            }
        }
        self.history = history;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn trust_count(&self) -> u64 {
        self.trust_count
    }

    pub fn untrust_count(&self) -> u64 {
        self.untrust_count
    }

    pub fn current_user_vote(&self) -> Option<VoteKind> {
        self.current_user_vote
    }

    pub fn history(&self) -> &[VoteRecord] {
        &self.history
    }

    pub fn count(&self, kind: VoteKind) -> u64 {
        match kind {
            VoteKind::Trust => self.trust_count,
            VoteKind::Untrust => self.untrust_count,
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.trust_count.saturating_add(self.untrust_count)
    }

    pub fn trust_percentage(&self) -> f64 {
        trust_percentage(self.trust_count, self.untrust_count)
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally {
            item_id: self.id.clone(),
            trust_count: self.trust_count,
            untrust_count: self.untrust_count,
            current_user_vote: self.current_user_vote,
        }
    }

    /// Record the user's vote. Callers must have checked the item holds no vote.
    ///
    /// Nothing changes when the matching count is already at its maximum.
    pub(crate) fn apply(&mut self, record: VoteRecord) -> Result<()> {
        debug_assert!(self.current_user_vote.is_none());
        let count = match record.kind {
            VoteKind::Trust => &mut self.trust_count,
            VoteKind::Untrust => &mut self.untrust_count,
        };
        *count = count.checked_add(1).ok_or_else(|| VoteError::CountOverflow {
            item_id: self.id.clone(),
            kind: record.kind,
        })?;
        self.current_user_vote = Some(record.kind);
        self.history.push(record);
        Ok(())
    }

    /// Withdraw the user's active vote of `kind`
    pub(crate) fn retract(&mut self, kind: VoteKind, voter: &str) {
        debug_assert_eq!(self.current_user_vote, Some(kind));
        match kind {
            VoteKind::Trust => self.trust_count = self.trust_count.saturating_sub(1),
            VoteKind::Untrust => self.untrust_count = self.untrust_count.saturating_sub(1),
        }
        self.current_user_vote = None;
        if let Some(pos) = self
            .history
            .iter()
            .rposition(|r| r.voter == voter && r.kind == kind)
        {
            self.history.remove(pos);
        }
    }
}

/// Snapshot returned to the UI after every vote operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub item_id: String,
    pub trust_count: u64,
    pub untrust_count: u64,
    pub current_user_vote: Option<VoteKind>,
}

impl VoteTally {
    pub fn trust_percentage(&self) -> f64 {
        trust_percentage(self.trust_count, self.untrust_count)
    }

    pub fn trust_level(&self) -> TrustLevel {
        TrustLevel::from_score(self.trust_percentage().round() as u8)
    }
}

/// Share of trust votes in percent, 0 when nobody has voted
pub fn trust_percentage(trust_count: u64, untrust_count: u64) -> f64 {
    if trust_count == 0 && untrust_count == 0 {
        return 0.0;
    }
    let trust = trust_count as f64;
    (trust / (trust + untrust_count as f64)) * 100.0
}

/// Badge bucket for a 0-100 credibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    Low,
    Medium,
    High,
}

impl TrustLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => TrustLevel::High,
            50..=79 => TrustLevel::Medium,
            _ => TrustLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrustLevel::Low => "low",
            TrustLevel::Medium => "medium",
            TrustLevel::High => "high",
        }
    }
}
