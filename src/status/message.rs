//! Status message payload and rendering.

use chrono::{DateTime, Utc};

use crate::config::{BotConfig, MetricSource};

/// Title used when the config does not override it.
pub const DEFAULT_TITLE: &str = "Online Players";

/// Shown in place of a count before the first successful fetch.
pub const UPDATING_PLACEHOLDER: &str = "Updating...";

/// The payload of the tracked channel message. Immutable once built;
/// constructed fresh on every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub title: String,
    pub url: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl StatusMessage {
    /// Builds the payload from the current counts, one per configured
    /// source, in source order.
    ///
    /// Defaults: the effective title, the first source's URL, and one
    /// description line per source. Config overrides replace a default
    /// field wholesale; an overridden description is used verbatim, so it
    /// no longer reflects live counts. Deterministic for a fixed `now`.
    #[must_use]
    pub fn build(config: &BotConfig, counts: &[Option<u64>], now: DateTime<Utc>) -> Self {
        let style = &config.message;

        let title = effective_title(config);
        let url = style
            .url
            .clone()
            .or_else(|| config.sources.first().map(|source| source.url.clone()))
            .unwrap_or_default();
        let description = style
            .description
            .clone()
            .unwrap_or_else(|| default_description(&config.sources, counts));

        Self {
            title,
            url,
            description,
            updated_at: now,
        }
    }

    /// Renders the payload to message text. The title is always the
    /// first line; the poll loop relies on that to recognize its own
    /// status message in the channel history.
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "{}\n{}\n\n{}\nUpdated {}",
            self.title,
            self.description,
            self.url,
            self.updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }
}

/// The title the status message will carry once built, with the config
/// override applied.
#[must_use]
pub fn effective_title(config: &BotConfig) -> String {
    config
        .message
        .title
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.to_owned())
}

fn default_description(sources: &[MetricSource], counts: &[Option<u64>]) -> String {
    sources
        .iter()
        .zip(counts)
        .map(|(source, count)| match count {
            Some(value) => format!("{}: {value}", source.label),
            None => format!("{}: {UPDATING_PLACEHOLDER}", source.label),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::config::{MessageStyle, MetricSource};

    fn config() -> BotConfig {
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

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_unset_value_shows_placeholder() {
        let status = StatusMessage::build(&config(), &[None], fixed_now());
        assert_eq!(status.description, "Members: Updating...");
    }

    #[test]
    fn test_zero_is_rendered_as_number() {
        let status = StatusMessage::build(&config(), &[Some(0)], fixed_now());
        assert_eq!(status.description, "Members: 0");
        assert!(!status.description.contains(UPDATING_PLACEHOLDER));
    }

    #[test]
    fn test_defaults_without_overrides() {
        let status = StatusMessage::build(&config(), &[Some(1234)], fixed_now());
        assert_eq!(status.title, DEFAULT_TITLE);
        assert_eq!(status.url, "https://forum.test/stats");
        assert_eq!(status.description, "Members: 1234");
    }

    #[test]
    fn test_one_line_per_source() {
        let mut config = config();
        let mut worlds = config.sources[0].clone();
        worlds.label = "Worlds".to_owned();
        config.sources.push(worlds);

        let status = StatusMessage::build(&config, &[Some(816), None], fixed_now());
        assert_eq!(status.description, "Members: 816\nWorlds: Updating...");
    }

    #[test]
    fn test_overrides_replace_fields_individually() {
        let mut config = config();
        config.message.title = Some("Server Status".to_owned());
        config.message.url = Some("https://forum.test".to_owned());

        let status = StatusMessage::build(&config, &[Some(5)], fixed_now());
        assert_eq!(status.title, "Server Status");
        assert_eq!(status.url, "https://forum.test");
        // The description was not overridden and keeps its default.
        assert_eq!(status.description, "Members: 5");
    }

    #[test]
    fn test_description_override_is_verbatim() {
        let mut config = config();
        config.message.description = Some("Join us!".to_owned());

        let status = StatusMessage::build(&config, &[Some(5)], fixed_now());
        assert_eq!(status.description, "Join us!");
    }

    #[test]
    fn test_build_is_deterministic() {
        let now = fixed_now();
        let first = StatusMessage::build(&config(), &[Some(42)], now);
        let second = StatusMessage::build(&config(), &[Some(42)], now);
        assert_eq!(first, second);
        assert_eq!(first.text(), second.text());
    }

    #[test]
    fn test_text_starts_with_title() {
        let status = StatusMessage::build(&config(), &[Some(42)], fixed_now());
        assert_eq!(status.text().lines().next(), Some(DEFAULT_TITLE));
    }

    #[test]
    fn test_text_carries_timestamp() {
        let status = StatusMessage::build(&config(), &[Some(42)], fixed_now());
        assert!(status.text().contains("Updated 2024-05-17 12:30:00 UTC"));
    }
}
