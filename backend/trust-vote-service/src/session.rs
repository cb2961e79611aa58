//! Line-oriented front end for the ledger.
//!
//! Each command is handled to completion before the next one is read, and
//! at most one confirmation dialog is open at a time.
use thiserror::Error;

use crate::domain::{Confirmation, ContentItem, UntrustReason, VoteKind, VoteTally};
use crate::error::VoteError;
use crate::services::{PendingVote, VoteLedger, VoteRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Show(String),
    Vote(String, VoteKind),
    Verify,
    Reason(usize),
    Cancel,
    History(String),
    Close(String),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().map(str::to_string);

        let needs_id = |usage: &'static str| arg.clone().ok_or(CommandError::Usage(usage));

        match verb.as_str() {
            "list" | "ls" => Ok(Command::List),
            "show" => Ok(Command::Show(needs_id("show <id>")?)),
            "trust" => Ok(Command::Vote(needs_id("trust <id>")?, VoteKind::Trust)),
            "untrust" => Ok(Command::Vote(needs_id("untrust <id>")?, VoteKind::Untrust)),
            "verify" => Ok(Command::Verify),
            "reason" => arg
                .as_deref()
                .and_then(|a| a.parse().ok())
                .map(Command::Reason)
                .ok_or(CommandError::Usage("reason <1|2|3>")),
            "cancel" => Ok(Command::Cancel),
            "history" => Ok(Command::History(needs_id("history <id>")?)),
            "close" => Ok(Command::Close(needs_id("close <id>")?)),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Text to show the user after a command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn push(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }
}

pub struct Session {
    ledger: VoteLedger,
    dialog: Option<PendingVote>,
}

impl Session {
    pub fn new(ledger: VoteLedger) -> Self {
        Self {
            ledger,
            dialog: None,
        }
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn has_open_dialog(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::default();
        }
        match Command::parse(line) {
            Ok(command) => self.handle(command),
            Err(e) => Reply::line(e.to_string()),
        }
    }

    pub fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::List => {
                let mut reply = Reply::default();
                for item in self.ledger.items() {
                    reply.push(render_item(item));
                }
                if reply.lines.is_empty() {
                    reply.push("Feed is empty");
                }
                reply
            }
            Command::Show(id) => match self.ledger.item(&id) {
                Ok(item) => Reply::line(render_item(item)),
                Err(e) => Reply::line(e.to_string()),
            },
            Command::Vote(id, kind) => self.vote(&id, kind),
            Command::Verify => self.answer(Confirmation::Verified),
            Command::Reason(choice) => match UntrustReason::from_choice(choice) {
                Some(reason) => self.answer(Confirmation::Flagged(reason)),
                None => Reply::line("Pick a reason between 1 and 3"),
            },
            Command::Cancel => match self.dialog.take() {
                Some(pending) => {
                    self.ledger.cancel_vote(pending.token);
                    Reply::line("Cancelled")
                }
                None => Reply::line("Nothing to cancel"),
            },
            Command::History(id) => match self.ledger.history(&id) {
                Ok([]) => Reply::line(format!("No votes recorded on {}", id)),
                Ok(records) => {
                    let mut reply = Reply::default();
                    for r in records {
                        let verdict = match r.kind {
                            VoteKind::Trust => "Trusted",
                            VoteKind::Untrust => "Untrusted",
                        };
                        let mut line = format!("{} {} {}", r.cast_at.to_rfc3339(), r.voter, verdict);
                        if let Some(reason) = r.reason {
                            line.push_str(&format!(" ({})", reason));
                        }
                        if let Some(score) = r.voter_credibility {
                            line.push_str(&format!(" credibility {}", score));
                        }
                        if let Some(comment) = &r.comment {
                            line.push_str(&format!(": \"{}\"", comment));
                        }
                        reply.push(line);
                    }
                    reply
                }
                Err(e) => Reply::line(e.to_string()),
            },
            Command::Close(id) => match self.ledger.close_voting(&id) {
                Ok(()) => Reply::line(format!("Voting closed on {}", id)),
                Err(e) => Reply::line(e.to_string()),
            },
            Command::Help => {
                let mut reply = Reply::default();
                for usage in [
                    "list                 show the feed",
                    "show <id>            show one item",
                    "trust <id>           trust an item (again to retract)",
                    "untrust <id>         flag an item (again to retract)",
                    "verify               confirm a pending trust vote",
                    "reason <1|2|3>       pick the reason for a pending untrust vote",
                    "cancel               dismiss the open dialog",
                    "history <id>         voting history of an item",
                    "close <id>           stop accepting new votes on an item",
                    "quit",
                ] {
                    reply.push(usage);
                }
                reply
            }
            Command::Quit => Reply {
                lines: Vec::new(),
                quit: true,
            },
        }
    }

    fn vote(&mut self, id: &str, kind: VoteKind) -> Reply {
        if self.dialog.is_some() {
            return Reply::line("Answer or cancel the open dialog first");
        }
        match self.ledger.request_vote(id, kind) {
            Ok(VoteRequest::Retracted(tally)) => {
                Reply::line(format!("Vote removed. {}", render_tally(&tally)))
            }
            Ok(VoteRequest::Pending(pending)) => {
                let mut reply = Reply::line(pending.prompt.title);
                reply.push(pending.prompt.message);
                if pending.prompt.reasons.is_empty() {
                    reply.push("  verify | cancel");
                } else {
                    for (idx, reason) in pending.prompt.reasons.iter().enumerate() {
                        reply.push(format!("  reason {}: {}", idx + 1, reason));
                    }
                    reply.push("  cancel");
                }
                self.dialog = Some(pending);
                reply
            }
            Err(VoteError::VoteConflict { .. }) => {
                let mut reply = Reply::line("Vote Already Cast");
                reply.push("Please remove your existing vote before casting a new one");
                reply
            }
            Err(e) => Reply::line(e.to_string()),
        }
    }

    fn answer(&mut self, confirmation: Confirmation) -> Reply {
        let Some(pending) = self.dialog.take() else {
            return Reply::line("No vote is waiting for confirmation");
        };
        match self.ledger.confirm_vote(pending.token, confirmation) {
            Ok(tally) => Reply::line(format!("Vote recorded. {}", render_tally(&tally))),
            Err(e @ VoteError::ConfirmationMismatch { .. }) => {
                // Wrong answer for this dialog; keep it open
                self.dialog = Some(pending);
                Reply::line(e.to_string())
            }
            Err(e) => Reply::line(e.to_string()),
        }
    }
}

fn render_tally(tally: &VoteTally) -> String {
    let vote = match tally.current_user_vote {
        Some(kind) => kind.as_str(),
        None => "none",
    };
    format!(
        "[{}] trust {} / untrust {} ({:.0}% trusted, {}), your vote: {}",
        tally.item_id,
        tally.trust_count,
        tally.untrust_count,
        tally.trust_percentage(),
        tally.trust_level().as_str(),
        vote
    )
}

fn render_item(item: &ContentItem) -> String {
    let mut line = render_tally(&item.tally());
    if !item.voting.accepts_votes_at(chrono::Utc::now()) {
        line.push_str(" [voting closed]");
    }
    line
}
