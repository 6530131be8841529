use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nm_core::{ArticleStore, Error, NewArticle, NormalizedArticle, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory article store. Always available, used by default and in tests.
#[derive(Debug)]
pub struct MemoryStorage {
    articles: Arc<RwLock<Vec<NormalizedArticle>>>,
    last_created: Mutex<DateTime<Utc>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            articles: Arc::new(RwLock::new(Vec::new())),
            last_created: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn find_by_url(&self, url: &str) -> Result<Option<NormalizedArticle>> {
        let articles = self.articles.read().await;
        Ok(articles.iter().find(|a| a.url == url).cloned())
    }

    async fn insert(&self, article: NewArticle) -> Result<NormalizedArticle> {
        let mut articles = self.articles.write().await;
        if articles.iter().any(|a| a.url == article.url) {
            return Err(Error::DuplicateUrl(article.url));
        }

        let created_at = crate::next_created_at(&self.last_created);
        let record = article.into_record(Uuid::new_v4().to_string(), created_at);
        articles.push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<NormalizedArticle>> {
        let articles = self.articles.read().await;
        let mut recent: Vec<NormalizedArticle> = articles.iter().cloned().collect();
        recent.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        recent.truncate(limit);
        Ok(recent)
    }
}
