//! Poll loop runner.
//!
//! The loop follows a simple state machine:
//! 1. `AwaitingFirstMessage`: look for an existing status message in the
//!    channel history and adopt the newest one, or send a fresh message.
//! 2. `Polling`: on each tick, fetch every configured source and compare
//!    against the last known values. A failed fetch or an unchanged value
//!    skips the update for that source; any change triggers a single edit
//!    carrying all currently known values.
//! 3. `Stopped`: entered when a shutdown message arrives; no further
//!    ticks are scheduled. In-flight network calls are not aborted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::state::{PollPhase, PollState};
use crate::config::{format_poll_rate, BotConfig, MESSAGE_LOOKBACK};
use crate::scrape::CountFetcher;
use crate::status::{effective_title, StatusMessage};
use crate::telegram::{ChannelMessage, ChatGateway};

/// Messages that can be sent to the poll loop.
#[derive(Debug, Clone)]
pub enum PollerMessage {
    /// Stop the loop after the current cycle.
    Shutdown,
}

/// The poll loop: fetch, compare, update, reschedule.
pub struct Poller<G, F> {
    /// Gateway to the status channel.
    gateway: Arc<G>,

    /// Fetcher for the configured metric sources.
    fetcher: Arc<F>,

    /// Bot configuration.
    config: Arc<BotConfig>,

    /// Poll state.
    state: Arc<RwLock<PollState>>,
}

impl<G, F> Poller<G, F>
where
    G: ChatGateway,
    F: CountFetcher,
{
    /// Creates a new poll loop.
    #[must_use]
    pub fn new(
        gateway: Arc<G>,
        fetcher: Arc<F>,
        config: Arc<BotConfig>,
        state: Arc<RwLock<PollState>>,
    ) -> Self {
        Self {
            gateway,
            fetcher,
            config,
            state,
        }
    }

    /// Gets a reference to the poll state.
    #[must_use]
    pub fn state(&self) -> &Arc<RwLock<PollState>> {
        &self.state
    }

    /// Runs the poll loop until a shutdown message arrives.
    pub async fn run(&self, mut rx: mpsc::Receiver<PollerMessage>) {
        self.state.write().await.phase = PollPhase::AwaitingFirstMessage;
        self.adopt_or_send().await;
        self.state.write().await.phase = PollPhase::Polling;

        for source in &self.config.sources {
            info!(
                "Polling '{}' from '{}' every {}",
                source.label,
                source.url,
                format_poll_rate(self.config.poll_rate)
            );
        }

        let mut timer = interval(Duration::from_secs(self.config.poll_rate));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.tick().await;
                }
                msg = rx.recv() => {
                    match msg {
                        Some(PollerMessage::Shutdown) | None => {
                            info!("Poll loop shutting down");
                            break;
                        }
                    }
                }
            }
        }

        self.state.write().await.phase = PollPhase::Stopped;
    }

    /// Adopts the newest status message the bot previously sent to the
    /// channel, or sends a fresh one when none is found.
    ///
    /// Failures here are tolerated: the loop starts without a tracked
    /// message and sends one on the first change instead.
    async fn adopt_or_send(&self) {
        let title = effective_title(&self.config);

        match self.gateway.recent_messages(MESSAGE_LOOKBACK).await {
            Ok(messages) => {
                if let Some(previous) = newest_status_message(&messages, &title) {
                    info!(
                        "Adopting existing status message {} from {}",
                        previous.id, previous.sent_at
                    );
                    self.state.write().await.message_id = Some(previous.id);
                    return;
                }
                debug!(
                    "No status message found in the last {} channel messages",
                    MESSAGE_LOOKBACK
                );
            }
            Err(e) => warn!("Could not inspect channel history: {}", e),
        }

        let status = {
            let state = self.state.read().await;
            StatusMessage::build(&self.config, state.counts(), Utc::now())
        };

        match self.gateway.send_status(&status).await {
            Ok(id) => {
                info!("Sent new status message {}", id);
                self.state.write().await.message_id = Some(id);
            }
            Err(e) => error!("Failed to send initial status message: {}", e),
        }
    }

    /// Single poll cycle.
    async fn tick(&self) {
        debug!("Polling {} source(s)...", self.config.sources.len());

        let mut changed = false;
        for (index, source) in self.config.sources.iter().enumerate() {
            match self.fetcher.fetch(source).await {
                Ok(value) => {
                    debug!("Fetched {}: {}", source.label, value);
                    if self.state.write().await.record(index, value) {
                        changed = true;
                    }
                }
                Err(e) => warn!("Error fetching '{}': {}", source.label, e),
            }
        }

        if !changed {
            return;
        }

        let (counts, message_id) = {
            let state = self.state.read().await;
            (state.counts().to_vec(), state.message_id)
        };
        let status = StatusMessage::build(&self.config, &counts, Utc::now());

        match message_id {
            Some(id) => match self.gateway.edit_status(id, &status).await {
                Ok(()) => info!("Updated status message"),
                Err(e) => error!("Failed to edit status message {}: {}", id, e),
            },
            None => match self.gateway.send_status(&status).await {
                Ok(id) => {
                    info!("Sent new status message {}", id);
                    self.state.write().await.message_id = Some(id);
                }
                Err(e) => error!("Failed to send status message: {}", e),
            },
        }
    }
}

/// Picks the bot's own status message with the latest creation timestamp.
/// A status message is recognized by its first line: the effective title.
fn newest_status_message<'a>(
    messages: &'a [ChannelMessage],
    title: &str,
) -> Option<&'a ChannelMessage> {
    messages
        .iter()
        .filter(|message| message.from_self && message.text.lines().next() == Some(title))
        .max_by_key(|message| message.sent_at)
}

impl<G, F> std::fmt::Debug for Poller<G, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::config::{MessageStyle, MetricSource};
    use crate::scrape::FetchError;
    use crate::status::DEFAULT_TITLE;
    use crate::telegram::{ChatError, MessageId};

    fn test_config() -> BotConfig {
        BotConfig {
            token: "123456:real-token".to_owned(),
            poll_rate: 60,
            channel_id: "@my_channel".to_owned(),
            sources: vec![MetricSource {
                label: "Members".to_owned(),
                url: "https://forum.test/stats".to_owned(),
                css_selector: "#member-count".to_owned(),
                negative_css_selector: None,
                sub_css_selector: None,
            }],
            message: MessageStyle::default(),
            min_edit_interval_secs: 0,
        }
    }

    fn channel_message(id: MessageId, from_self: bool, text: &str, hour: u32) -> ChannelMessage {
        ChannelMessage {
            id,
            from_self,
            text: text.to_owned(),
            sent_at: Utc.with_ymd_and_hms(2024, 5, 17, hour, 0, 0).unwrap(),
        }
    }

    #[derive(Default)]
    struct FakeGateway {
        history: Vec<ChannelMessage>,
        fail_history: bool,
        sent: Mutex<Vec<StatusMessage>>,
        edited: Mutex<Vec<(MessageId, StatusMessage)>>,
    }

    impl FakeGateway {
        fn with_history(history: Vec<ChannelMessage>) -> Self {
            Self {
                history,
                ..Self::default()
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        fn edits(&self) -> Vec<(MessageId, StatusMessage)> {
            self.edited.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatGateway for FakeGateway {
        async fn recent_messages(&self, limit: usize) -> Result<Vec<ChannelMessage>, ChatError> {
            if self.fail_history {
                return Err(ChatError::Connection("offline".to_owned()));
            }
            Ok(self.history.iter().take(limit).cloned().collect())
        }

        async fn send_status(&self, status: &StatusMessage) -> Result<MessageId, ChatError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push(status.clone());
            Ok(100 + MessageId::try_from(sent.len()).unwrap())
        }

        async fn edit_status(&self, id: MessageId, status: &StatusMessage) -> Result<(), ChatError> {
            self.edited.lock().unwrap().push((id, status.clone()));
            Ok(())
        }
    }

    struct FakeFetcher {
        script: Mutex<VecDeque<Result<u64, FetchError>>>,
    }

    impl FakeFetcher {
        fn with_script(script: Vec<Result<u64, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl CountFetcher for FakeFetcher {
        async fn fetch(&self, _source: &MetricSource) -> Result<u64, FetchError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::NotNumeric(String::new())))
        }
    }

    fn poller(
        gateway: Arc<FakeGateway>,
        fetcher: Arc<FakeFetcher>,
        config: BotConfig,
    ) -> Poller<FakeGateway, FakeFetcher> {
        let state = Arc::new(RwLock::new(PollState::new(config.sources.len())));
        Poller::new(gateway, fetcher, Arc::new(config), state)
    }

    #[tokio::test]
    async fn test_adopts_newest_status_message() {
        let older = channel_message(1, true, "Online Players\nMembers: 5", 8);
        let newer = channel_message(2, true, "Online Players\nMembers: 6", 9);
        // Oldest listed first to prove selection goes by timestamp, not order.
        let gateway = Arc::new(FakeGateway::with_history(vec![older, newer]));
        let fetcher = Arc::new(FakeFetcher::with_script(vec![]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());

        poller.adopt_or_send().await;

        assert_eq!(poller.state().read().await.message_id, Some(2));
        assert_eq!(gateway.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_ignores_foreign_and_unrelated_messages() {
        let foreign = channel_message(1, false, "Online Players\nMembers: 5", 8);
        let unrelated = channel_message(2, true, "hello everyone", 9);
        let gateway = Arc::new(FakeGateway::with_history(vec![foreign, unrelated]));
        let fetcher = Arc::new(FakeFetcher::with_script(vec![]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());

        poller.adopt_or_send().await;

        assert_eq!(gateway.sent_count(), 1);
        assert_eq!(poller.state().read().await.message_id, Some(101));
    }

    #[tokio::test]
    async fn test_matches_overridden_title() {
        let mut config = test_config();
        config.message.title = Some("Server Status".to_owned());
        let default_titled = channel_message(1, true, "Online Players\nMembers: 5", 8);
        let custom_titled = channel_message(2, true, "Server Status\nMembers: 5", 7);
        let gateway = Arc::new(FakeGateway::with_history(vec![default_titled, custom_titled]));
        let fetcher = Arc::new(FakeFetcher::with_script(vec![]));
        let poller = poller(Arc::clone(&gateway), fetcher, config);

        poller.adopt_or_send().await;

        assert_eq!(poller.state().read().await.message_id, Some(2));
    }

    #[tokio::test]
    async fn test_sends_new_message_when_history_unavailable() {
        let gateway = Arc::new(FakeGateway {
            fail_history: true,
            ..FakeGateway::default()
        });
        let fetcher = Arc::new(FakeFetcher::with_script(vec![]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());

        poller.adopt_or_send().await;

        assert_eq!(gateway.sent_count(), 1);
        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent[0].description, "Members: Updating...");
    }

    #[tokio::test]
    async fn test_repeated_value_edits_once() {
        let gateway = Arc::new(FakeGateway::default());
        let fetcher = Arc::new(FakeFetcher::with_script(vec![Ok(42), Ok(42)]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());
        poller.state().write().await.message_id = Some(1);

        poller.tick().await;
        poller.tick().await;

        let edits = gateway.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0, 1);
        assert_eq!(edits[0].1.description, "Members: 42");
    }

    #[tokio::test]
    async fn test_changed_value_edits_each_time() {
        let gateway = Arc::new(FakeGateway::default());
        let fetcher = Arc::new(FakeFetcher::with_script(vec![Ok(1), Ok(2)]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());
        poller.state().write().await.message_id = Some(1);

        poller.tick().await;
        poller.tick().await;

        let edits = gateway.edits();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[1].1.description, "Members: 2");
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_update() {
        let gateway = Arc::new(FakeGateway::default());
        let fetcher = Arc::new(FakeFetcher::with_script(vec![Err(FetchError::NotNumeric(
            "n/a".to_owned(),
        ))]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());
        poller.state().write().await.message_id = Some(1);

        poller.tick().await;

        assert!(gateway.edits().is_empty());
        assert_eq!(gateway.sent_count(), 0);
        assert_eq!(poller.state().read().await.counts(), &[None]);
    }

    #[tokio::test]
    async fn test_zero_count_is_an_update() {
        let gateway = Arc::new(FakeGateway::default());
        let fetcher = Arc::new(FakeFetcher::with_script(vec![Ok(0)]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());
        poller.state().write().await.message_id = Some(1);

        poller.tick().await;

        let edits = gateway.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].1.description, "Members: 0");
        assert_eq!(poller.state().read().await.counts(), &[Some(0)]);
    }

    #[tokio::test]
    async fn test_sends_when_no_message_is_tracked() {
        let gateway = Arc::new(FakeGateway::default());
        let fetcher = Arc::new(FakeFetcher::with_script(vec![Ok(7)]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());

        poller.tick().await;

        assert_eq!(gateway.sent_count(), 1);
        assert_eq!(poller.state().read().await.message_id, Some(101));
    }

    #[tokio::test]
    async fn test_partial_change_updates_all_known_values() {
        let mut config = test_config();
        let mut worlds = config.sources[0].clone();
        worlds.label = "Worlds".to_owned();
        config.sources.push(worlds);

        let gateway = Arc::new(FakeGateway::default());
        // First source fails, second succeeds: still a single edit.
        let fetcher = Arc::new(FakeFetcher::with_script(vec![
            Err(FetchError::NotNumeric("n/a".to_owned())),
            Ok(12),
        ]));
        let poller = poller(Arc::clone(&gateway), fetcher, config);
        poller.state().write().await.message_id = Some(1);

        poller.tick().await;

        let edits = gateway.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].1.description, "Members: Updating...\nWorlds: 12");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_the_loop() {
        let gateway = Arc::new(FakeGateway::default());
        let fetcher = Arc::new(FakeFetcher::with_script(vec![]));
        let poller = poller(Arc::clone(&gateway), fetcher, test_config());

        let (tx, rx) = mpsc::channel(8);
        tx.send(PollerMessage::Shutdown).await.unwrap();
        poller.run(rx).await;

        assert_eq!(poller.state().read().await.phase, PollPhase::Stopped);
    }

    #[test]
    fn test_newest_status_message_prefers_latest_timestamp() {
        let older = channel_message(1, true, "Online Players\nMembers: 5", 8);
        let newer = channel_message(2, true, "Online Players\nMembers: 6", 9);
        let messages = vec![newer.clone(), older];

        let found = newest_status_message(&messages, DEFAULT_TITLE).unwrap();
        assert_eq!(found.id, newer.id);
    }

    #[test]
    fn test_newest_status_message_none_for_empty_history() {
        assert!(newest_status_message(&[], DEFAULT_TITLE).is_none());
    }
}
