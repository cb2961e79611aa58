/// Configuration management for the trust vote session
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Voting settings
    pub voting: VotingConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Log output format
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Voting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingConfig {
    /// Handle recorded in the voting history for the current user
    pub voter_handle: String,
    /// How long seeded items accept new votes
    #[serde(default = "default_voting_window_secs")]
    pub voting_window_secs: i64,
    /// JSON feed seed; the built-in feed is used when unset
    pub feed_seed_path: Option<PathBuf>,
}

impl VotingConfig {
    /// Voting window as a duration that can be added to the current time
    pub fn voting_window(&self) -> Result<Duration> {
        if self.voting_window_secs <= 0 {
            bail!("VOTING_WINDOW_SECS must be positive");
        }
        let window = Duration::try_seconds(self.voting_window_secs)
            .with_context(|| format!("VOTING_WINDOW_SECS out of range: {}", self.voting_window_secs))?;
        Utc::now()
            .checked_add_signed(window)
            .with_context(|| format!("VOTING_WINDOW_SECS out of range: {}", self.voting_window_secs))?;
        Ok(window)
    }
}

// Default values
fn default_voting_window_secs() -> i64 {
    86400
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let log_format = match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_lowercase()
            .as_str()
        {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        };

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            log_format,
        };

        let voting_window_secs = match std::env::var("VOTING_WINDOW_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("VOTING_WINDOW_SECS is not a number: {}", raw))?,
            Err(_) => default_voting_window_secs(),
        };

        let voting = VotingConfig {
            voter_handle: std::env::var("VOTER_HANDLE").unwrap_or_else(|_| "me".to_string()),
            voting_window_secs,
            feed_seed_path: std::env::var("FEED_SEED_PATH").ok().map(PathBuf::from),
        };
        voting.voting_window()?;

        Ok(Config { app, voting })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "APP_ENV",
            "LOG_FORMAT",
            "VOTER_HANDLE",
            "VOTING_WINDOW_SECS",
            "FEED_SEED_PATH",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_default_values() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.log_format, LogFormat::Pretty);
        assert_eq!(config.voting.voter_handle, "me");
        assert_eq!(config.voting.voting_window_secs, 86400);
        assert_eq!(config.voting.voting_window().unwrap(), Duration::hours(24));
        assert!(config.voting.feed_seed_path.is_none());
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("LOG_FORMAT", "JSON");
        std::env::set_var("VOTER_HANDLE", "alice_web3");
        std::env::set_var("VOTING_WINDOW_SECS", "3600");
        std::env::set_var("FEED_SEED_PATH", "/tmp/feed.json");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.app.log_format, LogFormat::Json);
        assert_eq!(config.voting.voter_handle, "alice_web3");
        assert_eq!(config.voting.voting_window_secs, 3600);
        assert_eq!(
            config.voting.feed_seed_path,
            Some(PathBuf::from("/tmp/feed.json"))
        );
    }

    #[test]
    #[serial]
    fn test_invalid_values_rejected() {
        clear_env();
        std::env::set_var("VOTING_WINDOW_SECS", "soon");
        assert!(Config::from_env().is_err());

        std::env::set_var("VOTING_WINDOW_SECS", "0");
        assert!(Config::from_env().is_err());

        // Beyond what a duration can hold
        std::env::set_var("VOTING_WINDOW_SECS", i64::MAX.to_string());
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("out of range"));

        // A valid duration that still runs past the last representable date
        std::env::set_var("VOTING_WINDOW_SECS", (i64::MAX / 1000).to_string());
        assert!(Config::from_env().is_err());

        clear_env();
        std::env::set_var("LOG_FORMAT", "xml");
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
