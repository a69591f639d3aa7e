//! Configuration module for the member count bot.
//!
//! Handles loading and validation of the bot configuration file
//! and of the Telegram API credentials taken from the environment.

mod settings;

pub use settings::{
    format_poll_rate, BotConfig, ConfigError, MessageStyle, MetricSource, TelegramConfig,
    ValidationError,
};

/// How many recent channel messages are inspected when looking for an
/// existing status message to adopt.
pub const MESSAGE_LOOKBACK: usize = 10;
