//! Outbound sends through a real `Bot` pointed at a mock Telegram API.

use anyhow::Result;
use mockito::Matcher;
use news_digest_bot::bot::messaging::MessageSender;
use news_digest_bot::news::{NewsApiClient, NewsFetcher};
use news_digest_bot::scheduler::{DailyDigestJob, ScheduledJob};
use serde_json::json;
use std::sync::Arc;
use teloxide::Bot;

const TEST_BOT_TOKEN: &str = "123456:test_bot_token";

fn send_message_ok(chat_id: i64) -> String {
    json!({
        "ok": true,
        "result": {
            "message_id": 1,
            "date": 1_714_586_400,
            "chat": {"id": chat_id, "type": "group", "title": "Nachrichten"},
            "from": {"id": 123_456, "is_bot": true, "first_name": "NewsBot", "username": "news_bot"},
            "text": "ok"
        }
    })
    .to_string()
}

fn bot_for(server: &mockito::ServerGuard) -> Result<Bot> {
    Ok(Bot::new(TEST_BOT_TOKEN).set_api_url(reqwest::Url::parse(&server.url())?))
}

fn send_message_path() -> Matcher {
    Matcher::Regex("(?i)^/bot[^/]+/sendmessage$".to_string())
}

#[tokio::test]
async fn test_scheduled_digest_goes_to_configured_chat() -> Result<()> {
    let mut server = mockito::Server::new_async().await;

    let _news = server
        .mock("GET", "/v2/top-headlines")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"articles":[{"title":"Sturmwarnung","url":"https://n.de/s"}]}"#)
        .create_async()
        .await;

    let send = server
        .mock("POST", send_message_path())
        .match_body(Matcher::PartialJson(json!({
            "chat_id": -100_500,
            "text": "📰 定时新闻推送：\n\n🔹 Sturmwarnung\nhttps://n.de/s"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(send_message_ok(-100_500))
        .expect(1)
        .create_async()
        .await;

    let news = Arc::new(NewsFetcher::new(Arc::new(NewsApiClient::new(
        format!("{}/v2/top-headlines", server.url()),
        "key".to_string(),
        5,
    ))));
    let job = DailyDigestJob::new(news, Arc::new(bot_for(&server)?), -100_500);

    job.run().await?;

    send.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_long_text_is_split() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let send = server
        .mock("POST", send_message_path())
        .match_body(Matcher::PartialJson(json!({"chat_id": 42})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(send_message_ok(42))
        .expect(2)
        .create_async()
        .await;

    let line = "x".repeat(100);
    let text = vec![line; 60].join("\n");
    bot_for(&server)?.send_text(42, &text).await?;

    send.assert_async().await;
    Ok(())
}
