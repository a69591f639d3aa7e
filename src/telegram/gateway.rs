//! Chat gateway contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::status::StatusMessage;

/// Identifier of a message within the status channel.
pub type MessageId = i32;

/// Errors that can occur during chat operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Sign in failed: {0}")]
    SignInFailed(String),

    #[error("Could not find channel '{0}'. Make sure the bot is a member of it.")]
    ChannelNotFound(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("API invocation error: {0}")]
    Invocation(String),
}

/// A recent message in the status channel, as seen by the gateway.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: MessageId,
    /// Whether this message was authored by the signed-in account.
    pub from_self: bool,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Chat operations the poll loop depends on.
///
/// Implemented by [`super::TelegramGateway`]; tests substitute fakes.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Fetches up to `limit` of the newest messages in the status channel.
    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChannelMessage>, ChatError>;

    /// Sends a new status message, returning its id.
    async fn send_status(&self, status: &StatusMessage) -> Result<MessageId, ChatError>;

    /// Replaces the contents of an existing status message.
    async fn edit_status(&self, id: MessageId, status: &StatusMessage) -> Result<(), ChatError>;
}
