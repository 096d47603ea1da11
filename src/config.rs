//! Configuration for the Nazir engine.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Channel/bot settings consumed by notifier implementations.
///
/// The engine itself never interprets these values; they ride along in the
/// team document so the external notifier knows where to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    pub bot_token: String,
    pub channel_id: String,
}

/// Tunable engine behavior.
///
/// Loaded from a JSON settings file when present, otherwise defaulted.
///
/// # Example settings.json
///
/// ```json
/// {
///   "sweepIntervalSecs": 30,
///   "replyPollIntervalSecs": 3,
///   "refreshIntervalSecs": 5,
///   "initialReputation": 50
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Seconds between overdue sweeps (an immediate pass runs on start).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Seconds between inbound-reply polls.
    #[serde(default = "default_reply_poll_interval")]
    pub reply_poll_interval_secs: u64,

    /// Seconds between team-data cache refreshes.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Reputation score seeded for a newly registered member. Consumed
    /// by the onboarding layer when it constructs a [`crate::model::Member`];
    /// the engine itself never re-seeds scores.
    #[serde(default = "default_initial_reputation")]
    pub initial_reputation: i64,
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_reply_poll_interval() -> u64 {
    3
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_initial_reputation() -> i64 {
    50
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            reply_poll_interval_secs: default_reply_poll_interval(),
            refresh_interval_secs: default_refresh_interval(),
            initial_reputation: default_initial_reputation(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON settings file.
    ///
    /// A missing file yields the defaults; a present-but-invalid file is
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: EngineConfig = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any polling interval is zero.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval_secs == 0 {
            return Err(EngineError::config("sweepIntervalSecs must be non-zero"));
        }
        if self.reply_poll_interval_secs == 0 {
            return Err(EngineError::config("replyPollIntervalSecs must be non-zero"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(EngineError::config("refreshIntervalSecs must be non-zero"));
        }
        Ok(())
    }
}
