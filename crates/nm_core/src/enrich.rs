use crate::types::{Enrichment, RawArticle};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Enricher: Send + Sync + std::fmt::Debug {
    /// Returns the name of the enrichment strategy
    fn name(&self) -> &str;

    /// Derive a location and an importance score for a candidate article
    async fn enrich(&self, article: &RawArticle) -> Result<Enrichment>;
}
