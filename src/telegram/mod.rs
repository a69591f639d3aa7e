//! Telegram client wrapper module.
//!
//! Provides the chat gateway contract used by the poll loop and its
//! grammers-backed implementation, including sign-in, channel
//! resolution, and write throttling.

mod client;
mod gateway;
mod rate_limiter;

pub use client::TelegramGateway;
pub use gateway::{ChannelMessage, ChatError, ChatGateway, MessageId};
pub use rate_limiter::EditThrottle;
