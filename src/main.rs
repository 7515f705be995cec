use dotenvy::dotenv;
use news_digest_bot::bot::dispatch;
use news_digest_bot::bot::handlers::BotContext;
use news_digest_bot::bot::messaging::MessageSender;
use news_digest_bot::config::Settings;
use news_digest_bot::llm::{AiResponder, OpenAiProvider};
use news_digest_bot::logging::{init_logging, RedactionPatterns};
use news_digest_bot::news::{NewsApiClient, NewsFetcher};
use news_digest_bot::scheduler::{DailyDigestJob, DailySchedule, NewsScheduler};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Redaction patterns must exist before the first log line
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);
    init_logging(patterns);

    info!("Starting news digest bot...");

    let settings = init_settings();

    let news = Arc::new(NewsFetcher::new(Arc::new(NewsApiClient::from_settings(
        &settings,
    ))));
    let responder = Arc::new(AiResponder::new(
        Arc::new(OpenAiProvider::from_settings(&settings)),
        settings.openai_model.clone(),
        settings.http_timeout_secs,
    ));
    info!(
        "News source and LLM client ({}) initialized.",
        settings.openai_model
    );

    let bot = Bot::new(settings.telegram_bot_token.clone());

    let mut scheduler = init_scheduler(&settings, news.clone(), Arc::new(bot.clone()));
    scheduler.start();

    let ctx = Arc::new(BotContext::new(news, responder));

    info!("Bot is running...");

    Dispatcher::builder(bot, dispatch::schema())
        .dependencies(dptree::deps![ctx])
        .default_handler(|upd| async move {
            debug!("Ignoring update {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    scheduler.stop().await;
    info!("Bot stopped.");

    Ok(())
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_scheduler(
    settings: &Settings,
    news: Arc<NewsFetcher>,
    sender: Arc<dyn MessageSender>,
) -> NewsScheduler {
    let Some(schedule) = DailySchedule::new(settings.digest_hour, settings.digest_minute) else {
        error!(
            "Invalid digest time {}:{}",
            settings.digest_hour, settings.digest_minute
        );
        std::process::exit(1);
    };

    let job = DailyDigestJob::new(news, sender, settings.telegram_chat_id);
    NewsScheduler::new(schedule, Arc::new(job))
}
