//! Update routing
//!
//! Maps inbound Telegram messages to the start, news and question handlers.
//! Commands the bot does not know get no reply.

use crate::bot::handlers::{self, BotContext, Command};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::error;

/// An inbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Chat the message came from
    pub chat_id: i64,
    /// Message text
    pub text: String,
    /// Whether the text is a bot command
    pub is_command: bool,
}

impl ChatEvent {
    /// Create an event from raw text
    #[must_use]
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        let text = text.into();
        let is_command = text.starts_with('/');
        Self {
            chat_id,
            text,
            is_command,
        }
    }

    /// Returns `None` for messages without text (photos, stickers, ...)
    #[must_use]
    pub fn from_message(msg: &Message) -> Option<Self> {
        msg.text().map(|text| Self::new(msg.chat.id.0, text))
    }
}

/// Builds the update handler tree
#[must_use]
pub fn schema() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .filter_map(|msg: Message| ChatEvent::from_message(&msg))
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|event: ChatEvent| !event.is_command).endpoint(handle_text))
}

async fn handle_command(
    bot: Bot,
    event: ChatEvent,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_command(&bot, &ctx, event.chat_id, &cmd).await {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text(
    bot: Bot,
    event: ChatEvent,
    ctx: Arc<BotContext>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_text(&bot, &ctx, event.chat_id, &event.text).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}
