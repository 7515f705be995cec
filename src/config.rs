//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the fixed constants of the bot.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_bot_token: String,
    /// Chat that receives the scheduled digest
    pub telegram_chat_id: i64,

    /// `OpenAI` API key
    pub openai_api_key: String,
    /// Base URL of the chat-completion API
    #[serde(default = "default_openai_api_base")]
    pub openai_api_base: String,
    /// Model used for answering questions
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// News API key
    pub news_api_key: String,
    /// Top-headlines endpoint
    #[serde(default = "default_news_api_url")]
    pub news_api_url: String,
    /// Timeout applied to every outbound HTTP call
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Local hour of the daily push
    #[serde(default = "default_digest_hour")]
    pub digest_hour: u32,
    /// Local minute of the daily push
    #[serde(default)]
    pub digest_minute: u32,
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_news_api_url() -> String {
    "https://newsapi.org/v2/top-headlines".to_string()
}

const fn default_http_timeout_secs() -> u64 {
    30
}

const fn default_digest_hour() -> u32 {
    20
}

/// Number of headlines in a digest
pub const NEWS_DIGEST_SIZE: usize = 5;

/// Headline region, matching the German news reply header
pub const NEWS_COUNTRY: &str = "de";

/// System prompt sent with every question
pub const SYSTEM_PROMPT: &str = "你是一个新闻助手，帮助用户解析新闻内容";

/// Maximum message length for Telegram with safety margin.
/// Telegram's official limit is 4096.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Builds the layered configuration source.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg.. `APP__DIGEST_HOUR=7 ./target/app`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE is mapped to snake_case, empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use news_digest_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required value is missing or invalid.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(build_config()?)
    }

    /// Deserializes and validates settings from an already built source.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required value is missing or invalid.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("telegram_bot_token", &self.telegram_bot_token),
            ("openai_api_key", &self.openai_api_key),
            ("news_api_key", &self.news_api_key),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("{key} must not be empty")));
            }
        }

        if self.digest_hour > 23 || self.digest_minute > 59 {
            return Err(ConfigError::Message(format!(
                "invalid digest time {:02}:{:02}",
                self.digest_hour, self.digest_minute
            )));
        }

        Ok(())
    }
}
