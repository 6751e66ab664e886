//! Reliable delivery of rendered submissions to the notification groups.
//!
//! The [`Channel`] trait is the only outbound seam: the Telegram transport
//! implements it for production and tests substitute scripted stubs. The
//! [`ReliableDispatcher`] wraps a channel with rate-limit handling: a
//! `RetryAfter` hint suspends the caller for the hint plus padding, then the
//! same message is sent again to the same chat.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::{ChannelsConfig, DispatchConfig};
use crate::flow::Role;

/// Telegram chat id of a notification group.
pub type ChannelId = i64;

/// Failure reported by a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The channel asked the caller to wait before sending again.
    #[error("rate limited, retry after {}s", .retry_after.as_secs())]
    RateLimited {
        /// Suggested wait before the next attempt.
        retry_after: Duration,
    },
    /// Any other failure; not retried.
    #[error("delivery failed: {0}")]
    Failed(String),
}

/// Terminal failure of [`ReliableDispatcher::send`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The channel rejected the message for a reason other than rate limiting.
    #[error("delivery to {channel} failed: {reason}")]
    Delivery {
        /// Target chat.
        channel: ChannelId,
        /// Error text reported by the channel.
        reason: String,
    },
    /// Every allowed attempt was rate limited.
    #[error("delivery to {channel} still rate limited after {attempts} attempts")]
    RetriesExhausted {
        /// Target chat.
        channel: ChannelId,
        /// Attempts made, including the first.
        attempts: u32,
    },
}

/// Outbound notification sink.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Make one attempt to post `text` to `channel`.
    async fn deliver(&self, channel: ChannelId, text: &str) -> Result<(), DeliveryError>;
}

/// How rate-limited deliveries are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Added on top of every rate-limit hint.
    pub padding: Duration,
    /// Attempt cap including the first attempt; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

impl RetryPolicy {
    /// Build the policy from the `[dispatch]` config section.
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            padding: Duration::from_secs(config.retry_padding_secs),
            max_attempts: (config.max_attempts > 0).then_some(config.max_attempts),
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Passenger and driver target chats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destinations {
    /// Chat receiving passenger submissions.
    pub passenger: ChannelId,
    /// Chat receiving driver submissions.
    pub driver: ChannelId,
}

impl Destinations {
    /// Resolve destinations, collapsing to one chat when only one is set.
    ///
    /// # Errors
    ///
    /// Returns an error when neither chat id is configured.
    pub fn from_config(config: &ChannelsConfig) -> anyhow::Result<Self> {
        match (config.passenger, config.driver) {
            (Some(passenger), Some(driver)) => Ok(Self { passenger, driver }),
            (Some(single), None) | (None, Some(single)) => Ok(Self {
                passenger: single,
                driver: single,
            }),
            (None, None) => Err(anyhow::anyhow!("no notification channel configured")),
        }
    }

    /// Chat that receives submissions from `role`.
    pub fn for_role(&self, role: Role) -> ChannelId {
        match role {
            Role::Passenger => self.passenger,
            Role::Driver => self.driver,
        }
    }
}

/// Sends messages through a [`Channel`], waiting out rate limits.
#[derive(Clone)]
pub struct ReliableDispatcher {
    channel: Arc<dyn Channel>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for ReliableDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReliableDispatcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ReliableDispatcher {
    /// Wrap `channel` with `policy`.
    pub fn new(channel: Arc<dyn Channel>, policy: RetryPolicy) -> Self {
        Self { channel, policy }
    }

    /// Deliver `text` to `channel`, retrying while rate limited.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Delivery`] on the first non-rate-limit
    /// failure, or [`DispatchError::RetriesExhausted`] once the attempt cap
    /// is reached.
    pub async fn send(&self, channel: ChannelId, text: &str) -> Result<(), DispatchError> {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            match self.channel.deliver(channel, text).await {
                Ok(()) => {
                    debug!(channel, attempts, "message delivered");
                    return Ok(());
                }
                Err(DeliveryError::RateLimited { retry_after }) => {
                    if self.policy.exhausted(attempts) {
                        warn!(channel, attempts, "giving up after repeated rate limits");
                        return Err(DispatchError::RetriesExhausted { channel, attempts });
                    }
                    let wait = retry_after.saturating_add(self.policy.padding);
                    warn!(
                        channel,
                        attempts,
                        wait_secs = wait.as_secs(),
                        "rate limited, waiting before retry"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(DeliveryError::Failed(reason)) => {
                    error!(channel, attempts, %reason, "delivery failed");
                    return Err(DispatchError::Delivery { channel, reason });
                }
            }
        }
    }
}
