use anyhow::{Context, Result};
use chrono::Utc;
use std::io::{self, BufRead, Write};
use tracing::info;

use trust_vote_service::{config::Config, logging, seed, session::Session, VoteLedger};

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    logging::init_tracing(config.app.log_format);

    info!(
        env = %config.app.env,
        voter = %config.voting.voter_handle,
        "Starting trust vote session"
    );

    let now = Utc::now();
    let window = config.voting.voting_window()?;
    let feed = match &config.voting.feed_seed_path {
        Some(path) => seed::load_feed(path, now, window)?,
        None => seed::default_feed(now, window)?,
    };
    info!(items = feed.len(), "Feed loaded");

    let ledger = VoteLedger::with_items(config.voting.voter_handle.clone(), feed)
        .context("Failed to build vote ledger")?;
    let mut session = Session::new(ledger);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Type 'help' for commands")?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        let reply = session.handle_line(&line);
        for out in &reply.lines {
            writeln!(stdout, "{}", out)?;
        }
        stdout.flush()?;
        if reply.quit {
            break;
        }
    }

    info!("Session ended");
    Ok(())
}
