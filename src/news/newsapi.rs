use super::{HeadlineItem, HeadlineSource, NewsError};
use crate::config::{Settings, NEWS_COUNTRY};
use crate::http_utils::{check_status, create_http_client};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize, Debug)]
struct TopHeadlinesResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize, Debug)]
struct Article {
    title: Option<String>,
    url: Option<String>,
}

impl From<Article> for HeadlineItem {
    fn from(article: Article) -> Self {
        Self::new(
            article.title.unwrap_or_default(),
            article.url.unwrap_or_default(),
        )
    }
}

/// Top-headlines client for newsapi.org
pub struct NewsApiClient {
    http_client: HttpClient,
    url: String,
    api_key: String,
}

impl NewsApiClient {
    /// Create a new client
    #[must_use]
    pub fn new(url: String, api_key: String, timeout_secs: u64) -> Self {
        Self {
            http_client: create_http_client(timeout_secs),
            url,
            api_key,
        }
    }

    /// Create a client from application settings
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.news_api_url.clone(),
            settings.news_api_key.clone(),
            settings.http_timeout_secs,
        )
    }
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    async fn fetch_headlines(&self) -> Result<Vec<HeadlineItem>, NewsError> {
        debug!(country = NEWS_COUNTRY, "Requesting top headlines");

        let response = self
            .http_client
            .get(&self.url)
            .query(&[("country", NEWS_COUNTRY), ("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| NewsError::Network(e.without_url().to_string()))?;

        let response = check_status(response).await.map_err(NewsError::Api)?;

        let body: TopHeadlinesResponse = response
            .json()
            .await
            .map_err(|e| NewsError::Json(e.without_url().to_string()))?;

        Ok(body.articles.into_iter().map(HeadlineItem::from).collect())
    }
}
