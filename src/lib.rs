//! Member Count Bot Library
//!
//! A Telegram bot that scrapes a member count from a web page and keeps
//! a single channel message updated with the latest value.
//!
//! This crate provides the core functionality for:
//! - Loading and validating the bot configuration
//! - Fetching pages and extracting counts via CSS selectors
//! - Building the status message payload
//! - Connecting to Telegram and driving the poll loop

pub mod bot;
pub mod config;
pub mod poller;
pub mod scrape;
pub mod status;
pub mod telegram;
