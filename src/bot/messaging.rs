//! Outbound messaging for the Telegram bot.
//!
//! Contains the send primitive shared by command handlers and the scheduler,
//! and long message splitting.

use crate::config::TELEGRAM_MESSAGE_LIMIT;
use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Platform send primitive
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send plain text to a chat, splitting it if it is too long.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[async_trait]
impl MessageSender for Bot {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        for part in split_long_message(text, TELEGRAM_MESSAGE_LIMIT) {
            self.send_message(ChatId(chat_id), part).await?;
        }
        Ok(())
    }
}

/// Splits a message into parts of at most `max_length` characters.
///
/// Lines are kept whole where possible; a single line longer than the limit
/// is cut at character boundaries.
#[must_use]
pub fn split_long_message(message: &str, max_length: usize) -> Vec<String> {
    if message.chars().count() <= max_length || max_length == 0 {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    // Blank lines leave `current` empty, so track line count separately
    let mut has_lines = false;

    for line in message.split('\n') {
        let line_len = line.chars().count();
        // +1 for the newline joining it to `current`
        let needed = if has_lines { line_len + 1 } else { line_len };

        if has_lines && current_len + needed > max_length {
            push_part(&mut parts, std::mem::take(&mut current));
            current_len = 0;
            has_lines = false;
        }

        if line_len > max_length {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(max_length) {
                parts.push(chunk.iter().collect());
            }
            continue;
        }

        if has_lines {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
        has_lines = true;
    }

    push_part(&mut parts, current);
    parts
}

/// Telegram rejects whitespace-only text
fn push_part(parts: &mut Vec<String>, part: String) {
    if !part.trim().is_empty() {
        parts.push(part);
    }
}
