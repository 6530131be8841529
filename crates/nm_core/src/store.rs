use crate::types::{Enrichment, Importance, Location, NormalizedArticle, RawArticle};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A record ready for persistence. The store assigns the identifier and
/// the creation timestamp on insert.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub location: Location,
    pub importance: Importance,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub published_at: DateTime<Utc>,
    pub source: String,
}

impl NewArticle {
    pub fn from_parts(raw: &RawArticle, enrichment: Enrichment) -> Self {
        Self {
            title: raw.title.clone(),
            description: raw.description.clone(),
            url: raw.url.clone(),
            image_url: raw.image_url.clone(),
            location: enrichment.location,
            importance: enrichment.importance,
            min_zoom: enrichment.min_zoom,
            max_zoom: enrichment.max_zoom,
            published_at: raw.published_at,
            source: raw.source.clone(),
        }
    }

    /// Seals the record with its store-assigned identity.
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> NormalizedArticle {
        NormalizedArticle {
            id,
            title: self.title,
            description: self.description,
            url: self.url,
            image_url: self.image_url,
            location: self.location,
            importance: self.importance,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            published_at: self.published_at,
            source: self.source,
            created_at,
        }
    }
}

#[async_trait]
pub trait ArticleStore: Send + Sync + std::fmt::Debug {
    /// Equality lookup by canonical URL, restricted to one record
    async fn find_by_url(&self, url: &str) -> Result<Option<NormalizedArticle>>;

    /// Persist a record. URL is a logical unique key: inserting a second
    /// record for the same URL fails with `Error::DuplicateUrl`.
    async fn insert(&self, article: NewArticle) -> Result<NormalizedArticle>;

    /// Most recently published records, newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<NormalizedArticle>>;
}
