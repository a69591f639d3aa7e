//! Top-level bot wiring.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, RwLock};
use tracing::info;

use crate::config::{BotConfig, TelegramConfig};
use crate::poller::{PollState, Poller, PollerMessage};
use crate::scrape::HttpFetcher;
use crate::telegram::TelegramGateway;

/// The bot: configuration plus the chat gateway plus the poll loop.
#[derive(Debug)]
pub struct Bot {
    config: BotConfig,
    telegram: TelegramConfig,
}

impl Bot {
    /// Creates a bot from a validated configuration.
    #[must_use]
    pub fn new(config: BotConfig, telegram: TelegramConfig) -> Self {
        Self { config, telegram }
    }

    /// Logs in, starts the poll loop, and runs until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns an error when sign-in or channel resolution fails. Login
    /// is not retried.
    pub async fn run(self) -> Result<()> {
        let config = Arc::new(self.config);

        let gateway = TelegramGateway::connect(
            &self.telegram,
            &config.token,
            &config.channel_id,
            config.min_edit_interval_secs,
        )
        .await
        .context("Failed to log in to Telegram")?;

        info!("Bot is online, logged in as {}", gateway.account_name());

        let gateway = Arc::new(gateway);
        let fetcher = Arc::new(HttpFetcher::new());
        let state = Arc::new(RwLock::new(PollState::new(config.sources.len())));
        let poller = Poller::new(
            Arc::clone(&gateway),
            fetcher,
            Arc::clone(&config),
            Arc::clone(&state),
        );

        let (poller_tx, poller_rx) = mpsc::channel::<PollerMessage>(8);
        let poller_handle = tokio::spawn(async move {
            poller.run(poller_rx).await;
        });

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        info!("Received Ctrl+C, shutting down...");

        let _ = poller_tx.send(PollerMessage::Shutdown).await;
        let _ = poller_handle.await;
        gateway.disconnect();

        Ok(())
    }
}
