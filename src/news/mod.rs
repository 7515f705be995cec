//! Headlines fetching and digest rendering

mod newsapi;

pub use newsapi::NewsApiClient;

use crate::config::NEWS_DIGEST_SIZE;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Text shown when the provider returns no headlines
pub const NO_NEWS: &str = "❌ 暂无新闻";

/// Errors that can occur while fetching headlines
#[derive(Debug, Error)]
pub enum NewsError {
    /// Error during network communication
    #[error("Network error: {0}")]
    Network(String),
    /// Provider answered with a non-success status
    #[error("API error: {0}")]
    Api(String),
    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(String),
}

/// A single headline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineItem {
    /// Headline text
    pub title: String,
    /// Link to the article
    pub url: String,
}

impl HeadlineItem {
    /// Create a new headline
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Up to [`NEWS_DIGEST_SIZE`] headlines in provider order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsDigest {
    items: Vec<HeadlineItem>,
}

impl NewsDigest {
    /// Keeps the first [`NEWS_DIGEST_SIZE`] items, preserving order.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = HeadlineItem>) -> Self {
        Self {
            items: items.into_iter().take(NEWS_DIGEST_SIZE).collect(),
        }
    }

    /// Headlines contained in the digest
    #[must_use]
    pub fn items(&self) -> &[HeadlineItem] {
        &self.items
    }

    /// Returns true if there is nothing to show
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for NewsDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return f.write_str(NO_NEWS);
        }

        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "🔹 {}\n{}", item.title, item.url)?;
        }
        Ok(())
    }
}

/// Source of top headlines
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Fetch the current headlines in provider order
    async fn fetch_headlines(&self) -> Result<Vec<HeadlineItem>, NewsError>;
}

/// Builds digests from a [`HeadlineSource`]
pub struct NewsFetcher {
    source: Arc<dyn HeadlineSource>,
}

impl NewsFetcher {
    /// Create a fetcher over the given source
    #[must_use]
    pub fn new(source: Arc<dyn HeadlineSource>) -> Self {
        Self { source }
    }

    /// Fetch headlines and keep the top of the list.
    ///
    /// Every call hits the source; nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying source.
    #[instrument(skip(self))]
    pub async fn fetch_digest(&self) -> Result<NewsDigest, NewsError> {
        let items = self.source.fetch_headlines().await?;
        debug!(received = items.len(), "Headlines fetched");
        Ok(NewsDigest::from_items(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<HeadlineItem> {
        (1..=n)
            .map(|i| HeadlineItem::new(format!("Title {i}"), format!("https://n.de/{i}")))
            .collect()
    }

    #[test]
    fn test_empty_digest_is_sentinel() {
        let digest = NewsDigest::from_items(Vec::new());
        assert!(digest.is_empty());
        assert_eq!(digest.to_string(), NO_NEWS);
    }

    #[test]
    fn test_digest_keeps_first_five_in_order() {
        let digest = NewsDigest::from_items(items(8));
        assert_eq!(digest.items(), &items(5)[..]);
        assert_eq!(digest.to_string().matches("🔹").count(), 5);
        assert!(!digest.to_string().contains("Title 6"));
    }

    #[test]
    fn test_short_list_kept_whole() {
        let digest = NewsDigest::from_items(items(3));
        assert_eq!(digest.items().len(), 3);
        assert_eq!(
            digest.to_string(),
            "🔹 Title 1\nhttps://n.de/1\n\n🔹 Title 2\nhttps://n.de/2\n\n🔹 Title 3\nhttps://n.de/3"
        );
    }

    #[test]
    fn test_single_item_has_no_separator() {
        let digest = NewsDigest::from_items(items(1));
        assert_eq!(digest.to_string(), "🔹 Title 1\nhttps://n.de/1");
    }

    #[tokio::test]
    async fn test_fetch_digest_calls_source_each_time() -> Result<(), NewsError> {
        let mut source = MockHeadlineSource::new();
        source
            .expect_fetch_headlines()
            .times(2)
            .returning(|| Ok(items(6)));

        let fetcher = NewsFetcher::new(Arc::new(source));
        assert_eq!(fetcher.fetch_digest().await?.items().len(), 5);
        assert_eq!(fetcher.fetch_digest().await?.items().len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_digest_propagates_errors() {
        let mut source = MockHeadlineSource::new();
        source
            .expect_fetch_headlines()
            .returning(|| Err(NewsError::Api("HTTP 401 - apiKeyInvalid".to_string())));

        let fetcher = NewsFetcher::new(Arc::new(source));
        assert!(matches!(
            fetcher.fetch_digest().await,
            Err(NewsError::Api(_))
        ));
    }
}
