//! Telegram client wrapper for the status channel.

use std::sync::Arc;

use async_trait::async_trait;
use grammers_client::types::Chat;
use grammers_client::{sender, Client, InputMessage, InvocationError, SenderPool};
use grammers_session::storages::SqliteSession;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::gateway::{ChannelMessage, ChatError, ChatGateway, MessageId};
use super::rate_limiter::EditThrottle;
use crate::config::TelegramConfig;
use crate::status::StatusMessage;

impl From<InvocationError> for ChatError {
    fn from(err: InvocationError) -> Self {
        let text = err.to_string();
        if let Some(seconds) = extract_flood_wait_seconds(&text) {
            return Self::FloodWait(seconds);
        }
        Self::Invocation(text)
    }
}

/// Extracts flood wait seconds from an error message.
fn extract_flood_wait_seconds(err_msg: &str) -> Option<u32> {
    let patterns = ["FLOOD_WAIT_", "flood wait "];

    for pattern in patterns {
        if let Some(idx) = err_msg.to_lowercase().find(&pattern.to_lowercase()) {
            let start = idx + pattern.len();
            let num_str: String = err_msg[start..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(seconds) = num_str.parse() {
                return Some(seconds);
            }
        }
    }
    None
}

/// Gateway to the status channel, backed by a grammers client.
pub struct TelegramGateway {
    /// The underlying grammers client.
    client: Client,

    /// Handle to the sender pool for disconnection.
    handle: sender::SenderPoolHandle,

    /// The resolved status channel.
    chat: Chat,

    /// Display name of the signed-in account.
    account: String,

    /// Throttle over channel writes.
    throttle: EditThrottle,

    /// Background task running the sender pool.
    _pool_task: JoinHandle<()>,
}

impl TelegramGateway {
    /// Connects to Telegram, signs in with the bot token when the stored
    /// session is not yet authorized, and resolves the status channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection, sign-in, or channel resolution
    /// fails. Sign-in is not retried; the caller treats all of these as
    /// fatal.
    pub async fn connect(
        config: &TelegramConfig,
        token: &str,
        channel: &str,
        min_edit_interval_secs: u64,
    ) -> Result<Self, ChatError> {
        info!("Connecting to Telegram...");

        let session = Arc::new(
            SqliteSession::open(&config.session_path)
                .await
                .map_err(|e| ChatError::Session(e.to_string()))?,
        );

        let SenderPool {
            runner,
            updates: _updates,
            handle,
        } = SenderPool::new(Arc::clone(&session), config.api_id);

        let client = Client::new(handle.clone());

        // Spawn the sender pool runner
        let pool_task = tokio::spawn(async move {
            runner.run().await;
        });

        let is_authorized = client
            .is_authorized()
            .await
            .map_err(|e| ChatError::Connection(e.to_string()))?;

        if !is_authorized {
            info!("Session not authorized, signing in with bot token...");
            client
                .bot_sign_in(token)
                .await
                .map_err(|e| ChatError::SignInFailed(e.to_string()))?;
        }

        let me = client
            .get_me()
            .await
            .map_err(|e| ChatError::Connection(e.to_string()))?;
        let account = me
            .username()
            .map_or_else(|| me.full_name(), |username| format!("@{username}"));

        let username = channel.trim_start_matches('@');
        let chat = client
            .resolve_username(username)
            .await?
            .ok_or_else(|| ChatError::ChannelNotFound(channel.to_owned()))?;
        debug!("Resolved channel '{}' (id {})", chat.name(), chat.id());

        Ok(Self {
            client,
            handle: handle.thin,
            chat,
            account,
            throttle: EditThrottle::from_secs(min_edit_interval_secs),
            _pool_task: pool_task,
        })
    }

    /// Display name of the signed-in account.
    #[must_use]
    pub fn account_name(&self) -> &str {
        &self.account
    }

    /// Disconnects from Telegram.
    pub fn disconnect(&self) {
        info!("Disconnecting from Telegram...");
        self.handle.quit();
    }

    /// Maps an invocation error, feeding flood waits into the throttle.
    async fn write_error(&self, err: InvocationError) -> ChatError {
        let err = ChatError::from(err);
        if let ChatError::FloodWait(seconds) = &err {
            self.throttle.flood_penalty(*seconds).await;
        }
        err
    }
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChannelMessage>, ChatError> {
        let mut history = self.client.iter_messages(&self.chat).limit(limit);

        let mut messages = Vec::new();
        while let Some(message) = history.next().await? {
            messages.push(ChannelMessage {
                id: message.id(),
                from_self: message.outgoing(),
                text: message.text().to_owned(),
                sent_at: message.date(),
            });
        }
        Ok(messages)
    }

    async fn send_status(&self, status: &StatusMessage) -> Result<MessageId, ChatError> {
        self.throttle.acquire().await;

        match self
            .client
            .send_message(&self.chat, InputMessage::text(status.text()))
            .await
        {
            Ok(message) => Ok(message.id()),
            Err(err) => Err(self.write_error(err).await),
        }
    }

    async fn edit_status(&self, id: MessageId, status: &StatusMessage) -> Result<(), ChatError> {
        self.throttle.acquire().await;

        match self
            .client
            .edit_message(&self.chat, id, InputMessage::text(status.text()))
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => Err(self.write_error(err).await),
        }
    }
}

impl std::fmt::Debug for TelegramGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramGateway")
            .field("account", &self.account)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_flood_wait() {
        assert_eq!(extract_flood_wait_seconds("FLOOD_WAIT_120"), Some(120));
        assert_eq!(extract_flood_wait_seconds("flood wait 60 seconds"), Some(60));
        assert_eq!(extract_flood_wait_seconds("some other error"), None);
    }
}
