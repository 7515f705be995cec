use crate::bot::messaging::MessageSender;
use crate::llm::AiResponder;
use crate::news::{NewsDigest, NewsFetcher};
use anyhow::Result;
use std::sync::Arc;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

/// Greeting sent on `/start`
pub const WELCOME_TEXT: &str =
    "👋 欢迎使用新闻机器人！\n发送 /news 获取今日新闻\n直接提问 AI 获取新闻解析！";

/// Reply sent when a news or AI request fails
pub const FAILURE_TEXT: &str = "❌ 请求失败，请稍后再试";

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// Today's headlines
    #[command(description = "Get today's news.")]
    News,
}

/// Reply for an on-demand digest
#[must_use]
pub fn format_news_reply(digest: &NewsDigest) -> String {
    format!("📰 今日德国新闻：\n\n{digest}")
}

/// Reply for an AI answer
#[must_use]
pub fn format_ai_reply(answer: &str) -> String {
    format!("🤖 AI 解答：\n{answer}")
}

/// Shared services used by every handler
pub struct BotContext {
    /// Headline digests
    pub news: Arc<NewsFetcher>,
    /// Question answering
    pub responder: Arc<AiResponder>,
}

impl BotContext {
    /// Bundle the services
    #[must_use]
    pub fn new(news: Arc<NewsFetcher>, responder: Arc<AiResponder>) -> Self {
        Self { news, responder }
    }

    /// Builds the reply text for a recognised command.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching the digest fails.
    pub async fn reply_to_command(&self, cmd: &Command) -> Result<String> {
        match cmd {
            Command::Start => Ok(WELCOME_TEXT.to_string()),
            Command::News => {
                let digest = self.news.fetch_digest().await?;
                Ok(format_news_reply(&digest))
            }
        }
    }

    /// Builds the reply text for a free-text question.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion request fails.
    pub async fn reply_to_text(&self, text: &str) -> Result<String> {
        let answer = self.responder.answer_question(text).await?;
        Ok(format_ai_reply(&answer))
    }
}

/// Sends `reply` if it was produced, otherwise logs the failure and sends
/// the generic failure text.
async fn deliver(sender: &dyn MessageSender, chat_id: i64, reply: Result<String>) -> Result<()> {
    match reply {
        Ok(text) => sender.send_text(chat_id, &text).await,
        Err(e) => {
            error!("Request for chat {chat_id} failed: {e:#}");
            sender.send_text(chat_id, FAILURE_TEXT).await
        }
    }
}

/// Command handler
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_command(
    sender: &dyn MessageSender,
    ctx: &BotContext,
    chat_id: i64,
    cmd: &Command,
) -> Result<()> {
    info!("Chat {chat_id} sent command {cmd:?}.");
    let reply = ctx.reply_to_command(cmd).await;
    deliver(sender, chat_id, reply).await
}

/// Free-text handler
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_text(
    sender: &dyn MessageSender,
    ctx: &BotContext,
    chat_id: i64,
    text: &str,
) -> Result<()> {
    info!("Chat {chat_id} asked a question.");
    let reply = ctx.reply_to_text(text).await;
    deliver(sender, chat_id, reply).await
}
