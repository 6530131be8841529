use crate::types::RawArticle;
use crate::Result;
use async_trait::async_trait;

/// Opaque filter forwarded to the upstream feed.
#[derive(Debug, Clone)]
pub struct FeedFilter {
    pub country: String,
}

impl FeedFilter {
    pub fn country(code: impl Into<String>) -> Self {
        Self { country: code.into() }
    }
}

impl Default for FeedFilter {
    fn default() -> Self {
        Self::country("us")
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page of candidate articles, newest first.
    async fn fetch_top_articles(
        &self,
        filter: &FeedFilter,
        limit: usize,
    ) -> Result<Vec<RawArticle>>;
}
