//! Relay configuration from the environment.
//!
//! The credential and both chat identifiers are required: a missing or
//! malformed value is a fatal startup condition, and the process must not
//! begin polling. Everything else has defaults.
//!
//! # Variables
//!
//! - `BOT_TOKEN` - Bot API access token (required)
//! - `RELAY_SOURCE_CHAT` - chat id watched for videos (required)
//! - `RELAY_TARGET_CHAT` - chat id videos are forwarded to (required)
//! - `RELAY_DEDUP_LOG` - path of the durable dedup log
//! - `RELAY_SEND_COOLDOWN_SECS` - pause after each successful send
//! - `RELAY_MAX_BACKOFF_SECS` - ceiling on accumulated rate-limit backoff

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::delivery::BackoffPolicy;
use crate::types::ChannelId;

/// Default path of the durable dedup log.
pub const DEFAULT_DEDUP_LOG: &str = "processed_videos.txt";

/// Errors that make startup impossible.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is present but does not parse.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Everything the relay needs to run.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bot API access token.
    pub bot_token: String,

    /// The chat watched for video content.
    pub source_channel: ChannelId,

    /// The chat videos are forwarded to.
    pub target_channel: ChannelId,

    /// Path of the durable dedup log.
    pub dedup_log: PathBuf,

    /// Pause after each successful send.
    pub send_cooldown: Duration,

    /// Ceiling on accumulated rate-limit backoff per delivery.
    pub max_backoff: Duration,
}

impl RelayConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Separated from [`from_env`](Self::from_env) so tests can exercise the
    /// parsing without mutating process-wide environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = BackoffPolicy::DEFAULT;

        Ok(RelayConfig {
            bot_token: required(&lookup, "BOT_TOKEN")?,
            source_channel: ChannelId(parse_required(&lookup, "RELAY_SOURCE_CHAT")?),
            target_channel: ChannelId(parse_required(&lookup, "RELAY_TARGET_CHAT")?),
            dedup_log: lookup("RELAY_DEDUP_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEDUP_LOG)),
            send_cooldown: duration_or(&lookup, "RELAY_SEND_COOLDOWN_SECS", defaults.send_cooldown)?,
            max_backoff: duration_or(&lookup, "RELAY_MAX_BACKOFF_SECS", defaults.max_elapsed)?,
        })
    }

    /// The backoff policy described by this configuration.
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.max_backoff, self.send_cooldown)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String> {
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn parse_required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<i64> {
    let value = required(lookup, var)?;
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

fn duration_or(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(_) => Err(ConfigError::Invalid { var, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("BOT_TOKEN", "123456:token"),
            ("RELAY_SOURCE_CHAT", "-1001"),
            ("RELAY_TARGET_CHAT", "-2002"),
        ]
    }

    #[test]
    fn minimal_environment_loads_with_defaults() {
        let config = RelayConfig::from_lookup(env(&minimal())).unwrap();

        assert_eq!(config.source_channel, ChannelId(-1001));
        assert_eq!(config.target_channel, ChannelId(-2002));
        assert_eq!(config.dedup_log, PathBuf::from(DEFAULT_DEDUP_LOG));
        assert_eq!(config.send_cooldown, Duration::from_secs(2));
        assert_eq!(config.max_backoff, Duration::from_secs(900));
    }

    #[test]
    fn missing_token_is_fatal() {
        let pairs = vec![("RELAY_SOURCE_CHAT", "-1001"), ("RELAY_TARGET_CHAT", "-2002")];
        let err = RelayConfig::from_lookup(env(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("BOT_TOKEN"));
    }

    #[test]
    fn empty_token_is_fatal() {
        let mut pairs = minimal();
        pairs[0] = ("BOT_TOKEN", "  ");
        let err = RelayConfig::from_lookup(env(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("BOT_TOKEN"));
    }

    #[test]
    fn malformed_chat_id_is_fatal() {
        let mut pairs = minimal();
        pairs[1] = ("RELAY_SOURCE_CHAT", "not-a-number");
        let err = RelayConfig::from_lookup(env(&pairs)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "RELAY_SOURCE_CHAT",
                value: "not-a-number".to_string(),
            }
        );
    }

    #[test]
    fn overrides_are_honored() {
        let mut pairs = minimal();
        pairs.push(("RELAY_DEDUP_LOG", "/var/lib/relay/seen.txt"));
        pairs.push(("RELAY_SEND_COOLDOWN_SECS", "5"));
        pairs.push(("RELAY_MAX_BACKOFF_SECS", "60"));

        let config = RelayConfig::from_lookup(env(&pairs)).unwrap();
        assert_eq!(config.dedup_log, PathBuf::from("/var/lib/relay/seen.txt"));
        assert_eq!(config.send_cooldown, Duration::from_secs(5));
        assert_eq!(config.max_backoff, Duration::from_secs(60));
        assert_eq!(config.backoff().max_elapsed, Duration::from_secs(60));
    }

    #[test]
    fn malformed_optional_duration_is_fatal() {
        let mut pairs = minimal();
        pairs.push(("RELAY_MAX_BACKOFF_SECS", "soon"));
        let err = RelayConfig::from_lookup(env(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "RELAY_MAX_BACKOFF_SECS",
                ..
            }
        ));
    }
}
