//! Write throttle for the status channel.
//!
//! Enforces a minimum interval between message sends and edits, and
//! pushes the next allowed write further out when Telegram answers
//! with a flood wait.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Throttle over the channel's message writes.
#[derive(Debug)]
pub struct EditThrottle {
    /// Minimum duration between writes.
    min_interval: Duration,

    /// Earliest moment the next write may happen.
    next_allowed: Mutex<Option<Instant>>,
}

impl EditThrottle {
    /// Creates a throttle with the given minimum interval in seconds.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self {
            min_interval: Duration::from_secs(secs),
            next_allowed: Mutex::new(None),
        }
    }

    /// Waits until a write is allowed, then reserves the next slot.
    ///
    /// Returns the duration waited (zero when no wait was needed).
    pub async fn acquire(&self) -> Duration {
        let mut next = self.next_allowed.lock().await;

        let mut waited = Duration::ZERO;
        if let Some(at) = *next {
            let now = Instant::now();
            if at > now {
                waited = at - now;
                debug!("Throttling channel write for {:?}", waited);
                tokio::time::sleep(waited).await;
            }
        }

        *next = Some(Instant::now() + self.min_interval);
        waited
    }

    /// Applies a flood wait reported by Telegram: no write happens for at
    /// least `seconds` from now.
    pub async fn flood_penalty(&self, seconds: u32) {
        warn!("Received flood wait from Telegram: {} seconds", seconds);

        let mut next = self.next_allowed.lock().await;
        let candidate = Instant::now() + Duration::from_secs(u64::from(seconds));
        if next.is_none_or(|at| at < candidate) {
            *next = Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_write_is_immediate() {
        let throttle = EditThrottle::from_secs(60);
        assert_eq!(throttle.acquire().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_second_write_waits_out_the_interval() {
        let throttle = EditThrottle::from_secs(0);
        throttle.acquire().await;
        // Zero interval never throttles.
        assert_eq!(throttle.acquire().await, Duration::ZERO);

        let throttle = EditThrottle {
            min_interval: Duration::from_millis(50),
            next_allowed: Mutex::new(None),
        };
        throttle.acquire().await;
        assert!(throttle.acquire().await >= Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flood_penalty_postpones_writes() {
        let throttle = EditThrottle::from_secs(1);
        throttle.acquire().await;
        throttle.flood_penalty(30).await;

        let before = Instant::now();
        throttle.acquire().await;
        assert!(Instant::now() - before >= Duration::from_secs(30));
    }
}
