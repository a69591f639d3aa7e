//! Bot configuration file and Telegram API credentials.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder values shipped in the example configuration. Validation
/// rejects a config that still carries any of them.
const PLACEHOLDER_TOKEN: &str = "token-here";
const PLACEHOLDER_CHANNEL: &str = "channel-id";
const PLACEHOLDER_URL: &str = "https://example.com";

/// Errors that can occur while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Token not found! Please set your bot token under 'token' in the config file.")]
    MissingToken,

    #[error("Invalid poll rate! Please set a positive number of seconds for 'poll_rate'.")]
    InvalidPollRate,

    #[error("Invalid channel! Please set the status channel username under 'channel_id'.")]
    InvalidChannelId,

    #[error("No metric sources configured! Add at least one entry under 'sources'.")]
    NoSources,

    #[error("Invalid URL for source '{label}'! Please set a valid http(s) URL.")]
    InvalidUrl { label: String },

    #[error("Missing CSS selector for source '{label}'! Provide one to identify the count.")]
    MissingSelector { label: String },

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// One countable value to scrape: a page URL plus the selectors that
/// locate the number inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricSource {
    /// Display label used in the status message.
    #[serde(default = "default_source_label")]
    pub label: String,

    /// Page to fetch.
    pub url: String,

    /// CSS selector identifying the element(s) holding the count.
    pub css_selector: String,

    /// Elements matching this selector are removed from the selected set.
    #[serde(default)]
    pub negative_css_selector: Option<String>,

    /// When set, the count is read from descendants matching this selector
    /// instead of the selected elements themselves.
    #[serde(default)]
    pub sub_css_selector: Option<String>,
}

fn default_source_label() -> String {
    "Members".to_owned()
}

/// Per-field overrides for the status message. A set field replaces the
/// built-in default wholesale; an unset field leaves the default in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MessageStyle {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// Bot configuration, loaded once at startup from a JSON file.
///
/// Missing fields deserialize to the shipped placeholder defaults, which
/// [`BotConfig::validate`] then rejects by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Telegram bot token (secret).
    pub token: String,

    /// Seconds between poll cycles.
    pub poll_rate: u64,

    /// Username of the channel holding the status message.
    pub channel_id: String,

    /// Pages to scrape, at least one.
    pub sources: Vec<MetricSource>,

    /// Style overrides for the status message.
    pub message: MessageStyle,

    /// Minimum interval between message writes (flood protection).
    pub min_edit_interval_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: PLACEHOLDER_TOKEN.to_owned(),
            poll_rate: 90,
            channel_id: PLACEHOLDER_CHANNEL.to_owned(),
            sources: vec![MetricSource {
                label: default_source_label(),
                url: format!("{PLACEHOLDER_URL}/members"),
                css_selector: "#member-count".to_owned(),
                negative_css_selector: None,
                sub_css_selector: None,
            }],
            message: MessageStyle::default(),
            min_edit_interval_secs: 1,
        }
    }
}

impl BotConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ValidationError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration, reporting the first failing field.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.validate_all().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Runs every validation check and collects all failures.
    #[must_use]
    pub fn validate_all(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.token.is_empty() || self.token == PLACEHOLDER_TOKEN {
            errors.push(ValidationError::MissingToken);
        }

        if self.poll_rate == 0 {
            errors.push(ValidationError::InvalidPollRate);
        }

        if self.channel_id.is_empty() || self.channel_id == PLACEHOLDER_CHANNEL {
            errors.push(ValidationError::InvalidChannelId);
        }

        if self.sources.is_empty() {
            errors.push(ValidationError::NoSources);
        }

        for source in &self.sources {
            if !source.url.starts_with("http") || source.url.starts_with(PLACEHOLDER_URL) {
                errors.push(ValidationError::InvalidUrl {
                    label: source.label.clone(),
                });
            }

            if source.css_selector.is_empty() {
                errors.push(ValidationError::MissingSelector {
                    label: source.label.clone(),
                });
            }
        }

        errors
    }
}

/// Formats a poll rate in seconds as a human-readable string,
/// e.g. 90 becomes "1m 30s (90 seconds)".
#[must_use]
pub fn format_poll_rate(seconds: u64) -> String {
    let minutes = seconds / 60;
    let rest = seconds % 60;

    let mut text = String::new();
    if minutes > 0 {
        text.push_str(&format!("{minutes}m"));
    }
    if rest > 0 {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&format!("{rest}s"));
    }
    if minutes > 0 {
        text.push_str(&format!(" ({seconds} seconds)"));
    }

    text
}

/// Telegram API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Telegram API ID (obtain from <https://my.telegram.org>).
    pub api_id: i32,

    /// Telegram API hash (obtain from <https://my.telegram.org>).
    pub api_hash: String,

    /// Path to the session file.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("session.db")
}

impl TelegramConfig {
    /// Creates configuration from environment variables.
    ///
    /// Expects `TG_API_ID` and `TG_API_HASH` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_id: i32 = std::env::var("TG_API_ID")
            .map_err(|_| ConfigError::MissingEnvVar("TG_API_ID"))?
            .parse()
            .map_err(|_| ConfigError::InvalidApiId)?;

        let api_hash = std::env::var("TG_API_HASH")
            .map_err(|_| ConfigError::MissingEnvVar("TG_API_HASH"))?;

        let session_path =
            std::env::var("TG_SESSION_PATH").map_or_else(|_| default_session_path(), PathBuf::from);

        Ok(Self {
            api_id,
            api_hash,
            session_path,
        })
    }
}

/// Environment configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid API ID format (must be a positive integer)")]
    InvalidApiId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BotConfig {
        BotConfig {
            token: "123456:real-token".to_owned(),
            poll_rate: 90,
            channel_id: "@my_channel".to_owned(),
            sources: vec![MetricSource {
                label: "Members".to_owned(),
                url: "https://forum.test/stats".to_owned(),
                css_selector: "#member-count".to_owned(),
                negative_css_selector: None,
                sub_css_selector: None,
            }],
            message: MessageStyle::default(),
            min_edit_interval_secs: 1,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_default_config_is_rejected() {
        assert!(matches!(
            BotConfig::default().validate(),
            Err(ValidationError::MissingToken)
        ));
    }

    #[test]
    fn test_empty_json_deserializes_to_placeholders() {
        let config: BotConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.token, PLACEHOLDER_TOKEN);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingToken)
        ));
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let mut config = valid_config();
        config.token = PLACEHOLDER_TOKEN.to_owned();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingToken)
        ));
    }

    #[test]
    fn test_zero_poll_rate_rejected() {
        let mut config = valid_config();
        config.poll_rate = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPollRate)
        ));
    }

    #[test]
    fn test_placeholder_channel_rejected() {
        let mut config = valid_config();
        config.channel_id = PLACEHOLDER_CHANNEL.to_owned();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidChannelId)
        ));
    }

    #[test]
    fn test_no_sources_rejected() {
        let mut config = valid_config();
        config.sources.clear();
        assert!(matches!(config.validate(), Err(ValidationError::NoSources)));
    }

    #[test]
    fn test_placeholder_url_rejected() {
        let mut config = valid_config();
        config.sources[0].url = format!("{PLACEHOLDER_URL}/members");
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_empty_selector_rejected() {
        let mut config = valid_config();
        config.sources[0].css_selector = String::new();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingSelector { .. })
        ));
    }

    #[test]
    fn test_validate_all_collects_every_failure() {
        let errors = BotConfig::default().validate_all();
        // Placeholder token, channel and URL are all reported at once.
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_format_poll_rate_minutes_and_seconds() {
        assert_eq!(format_poll_rate(90), "1m 30s (90 seconds)");
    }

    #[test]
    fn test_format_poll_rate_seconds_only() {
        assert_eq!(format_poll_rate(45), "45s");
    }

    #[test]
    fn test_format_poll_rate_whole_minutes() {
        assert_eq!(format_poll_rate(120), "2m (120 seconds)");
        assert_eq!(format_poll_rate(60), "1m (60 seconds)");
    }

    #[test]
    fn test_source_label_defaults() {
        let json = r##"{"url": "https://forum.test/stats", "css_selector": "#count"}"##;
        let source: MetricSource = serde_json::from_str(json).unwrap();
        assert_eq!(source.label, "Members");
        assert!(source.negative_css_selector.is_none());
    }
}
