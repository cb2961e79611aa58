//! Feed seeding: the built-in demo feed and JSON seed files.
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::{ContentItem, VoteKind, VoteRecord, VotingWindow};

/// One feed entry in a seed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedItem {
    pub id: String,
    #[serde(default)]
    pub trust: u64,
    #[serde(default)]
    pub untrust: u64,
    /// Voting deadline; items without one get the configured window
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Vote the current user already holds on this item
    #[serde(default)]
    pub user_vote: Option<VoteKind>,
    /// Votes already cast by other users; included in `trust` / `untrust`
    #[serde(default)]
    pub history: Vec<VoteRecord>,
}

impl SeedItem {
    pub fn into_item(self, default_ends_at: DateTime<Utc>) -> Result<ContentItem> {
        let window = VotingWindow::until(self.ends_at.unwrap_or(default_ends_at));
        let item = ContentItem::new(self.id, self.trust, self.untrust)
            .with_voting_window(window)
            .with_history(self.history)?;
        match self.user_vote {
            Some(vote) => Ok(item.with_user_vote(vote)?),
            None => Ok(item),
        }
    }
}

/// Counts of the five posts shown on the home feed
pub fn default_seed() -> Vec<SeedItem> {
    [("1", 120, 30), ("2", 30, 85), ("3", 95, 15), ("4", 150, 20), ("5", 180, 12)]
        .into_iter()
        .map(|(id, trust, untrust)| SeedItem {
            id: id.to_string(),
            trust,
            untrust,
            ends_at: None,
            user_vote: None,
            history: Vec::new(),
        })
        .map(|mut item| {
            if item.id == "1" {
                item.history = featured_post_history();
            }
            item
        })
        .collect()
}

/// Votes shown on the featured post's detail screen
fn featured_post_history() -> Vec<VoteRecord> {
    // 2024-04-09T11:00:00Z
    let first_vote = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_712_660_400);
    vec![
        VoteRecord {
            voter: "alice_web3".to_string(),
            kind: VoteKind::Trust,
            reason: None,
            comment: None,
            voter_credibility: Some(78),
            cast_at: first_vote,
        },
        VoteRecord {
            voter: "bob_crypto".to_string(),
            kind: VoteKind::Untrust,
            reason: None,
            comment: Some("Need official SEC document links for verification".to_string()),
            voter_credibility: Some(82),
            cast_at: first_vote + Duration::hours(1),
        },
    ]
}

/// Built-in feed with every item open for `window` from `now`
pub fn default_feed(now: DateTime<Utc>, window: Duration) -> Result<Vec<ContentItem>> {
    build_feed(default_seed(), window_end(now, window)?)
}

/// Read a JSON array of `SeedItem`s
pub fn load_feed(path: &Path, now: DateTime<Utc>, window: Duration) -> Result<Vec<ContentItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed seed {}", path.display()))?;
    let seed: Vec<SeedItem> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse feed seed {}", path.display()))?;
    build_feed(seed, window_end(now, window)?)
}

fn window_end(now: DateTime<Utc>, window: Duration) -> Result<DateTime<Utc>> {
    now.checked_add_signed(window)
        .with_context(|| {
            format!(
                "Voting window of {}s runs past the supported date range",
                window.num_seconds()
            )
        })
}

fn build_feed(seed: Vec<SeedItem>, default_ends_at: DateTime<Utc>) -> Result<Vec<ContentItem>> {
    seed.into_iter()
        .map(|s| s.into_item(default_ends_at))
        .collect()
}
