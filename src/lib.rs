//! Telegram bot that relays German headlines on request or daily, and answers
//! news questions through a chat-completion API.

pub mod bot;
pub mod config;
pub mod http_utils;
pub mod llm;
pub mod logging;
pub mod news;
pub mod scheduler;
