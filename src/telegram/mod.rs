//! Telegram transport: bot dispatcher for user conversations and the
//! outbound [`Channel`] used to post submissions to group chats.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::RequestError;
use tracing::{debug, info, warn};

use crate::dispatch::{Channel, ChannelId, DeliveryError};
use crate::relay::{InboundMessage, Relay};

pub mod ui;

// ---------------------------------------------------------------------------
// Outbound channel
// ---------------------------------------------------------------------------

/// Posts submissions to group chats through the Bot API.
#[derive(Clone)]
pub struct TelegramChannel {
    bot: Bot,
}

impl std::fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel").finish_non_exhaustive()
    }
}

impl TelegramChannel {
    /// Wrap a bot handle.
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Map a Bot API error to a delivery error. Only `RetryAfter` is retryable.
pub fn classify_error(error: RequestError) -> DeliveryError {
    match error {
        RequestError::RetryAfter(seconds) => DeliveryError::RateLimited {
            retry_after: seconds.duration(),
        },
        other => DeliveryError::Failed(other.to_string()),
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn deliver(&self, channel: ChannelId, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(ChatId(channel), text)
            .await
            .map(|_| ())
            .map_err(classify_error)
    }
}

// ---------------------------------------------------------------------------
// Shared state for handler injection
// ---------------------------------------------------------------------------

/// Shared dependencies injected into teloxide handlers via `dptree::deps!`.
#[derive(Clone)]
struct SharedState {
    relay: Arc<Relay>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the bot dispatcher until Ctrl+C.
///
/// Teloxide delivers updates from one chat in order and different chats
/// concurrently; the relay's per-user lock covers the rest.
pub async fn run_telegram(bot: Bot, relay: Arc<Relay>) -> anyhow::Result<()> {
    let shared = SharedState { relay };

    let handler = Update::filter_message().endpoint(handle_message);

    info!("telegram dispatcher starting");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![shared])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

// ---------------------------------------------------------------------------
// Message handler
// ---------------------------------------------------------------------------

/// Handle one incoming private text message.
async fn handle_message(bot: Bot, msg: Message, state: SharedState) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }

    let Some(ref user) = msg.from else {
        return Ok(());
    };

    // teloxide uses u64 for user IDs; sessions are keyed by i64.
    let Ok(user_id) = i64::try_from(user.id.0) else {
        warn!(user_id = user.id.0, "user id out of range, ignoring");
        return Ok(());
    };

    let Some(text) = msg.text() else {
        debug!(user_id, "non-text message, ignoring");
        return Ok(());
    };

    debug!(user_id, "telegram message received");

    let inbound = InboundMessage {
        user_id,
        display_name: Some(user.first_name.clone()),
        text: text.to_owned(),
    };
    let reply = state.relay.handle(&inbound).await;

    let mut request = bot.send_message(msg.chat.id, reply.text);
    if let Some(markup) = ui::reply_markup(&reply.menu) {
        request = request.reply_markup(markup);
    }
    if let Err(e) = request.await {
        warn!(user_id, error = %e, "failed to send reply");
    }

    Ok(())
}
