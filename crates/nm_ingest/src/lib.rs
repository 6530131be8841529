use futures::future::join_all;
use nm_core::{
    ArticleStore, Enricher, Error, FeedFilter, FeedSource, NewArticle, RawArticle, Result,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle of one ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Processing,
    Done,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Inserted,
    Skipped,
    Failed,
}

/// What one run did. Items are independent: a failure is counted and the
/// run carries on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Drives one ingest run: fetch a page of candidates, then pass each one
/// through duplicate filtering, enrichment, and persistence. Candidates are
/// processed concurrently up to a configurable limit.
pub struct IngestPipeline {
    feed: Arc<dyn FeedSource>,
    enricher: Arc<dyn Enricher>,
    store: Arc<dyn ArticleStore>,
    semaphore: Arc<Semaphore>,
    item_timeout: Duration,
}

impl IngestPipeline {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        enricher: Arc<dyn Enricher>,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            feed,
            enricher,
            store,
            semaphore: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
            item_timeout: DEFAULT_ITEM_TIMEOUT,
        }
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    pub fn with_item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = timeout;
        self
    }

    pub async fn run(&self, filter: &FeedFilter, limit: usize) -> Result<RunReport> {
        let mut state = RunState::Fetching;
        info!(state = ?state, country = %filter.country, limit, "starting ingest run");

        let candidates = match self.feed.fetch_top_articles(filter, limit).await {
            Ok(articles) => articles,
            Err(e) => {
                state = RunState::Aborted;
                error!(state = ?state, "ingest run aborted: {}", e);
                return Err(e);
            }
        };

        state = RunState::Processing;
        debug!(state = ?state, candidates = candidates.len(), "processing candidates");

        let mut report = RunReport {
            fetched: candidates.len(),
            ..RunReport::default()
        };

        let outcomes = join_all(
            candidates
                .into_iter()
                .map(|article| self.process_item(article)),
        )
        .await;

        for outcome in outcomes {
            match outcome {
                ItemOutcome::Inserted => report.inserted += 1,
                ItemOutcome::Skipped => report.skipped += 1,
                ItemOutcome::Failed => report.failed += 1,
            }
        }

        state = RunState::Done;
        info!(
            state = ?state,
            fetched = report.fetched,
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed,
            "ingest run completed"
        );
        Ok(report)
    }

    async fn process_item(&self, article: RawArticle) -> ItemOutcome {
        match self.try_process(&article).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(url = %article.url, "failed to process article: {}", e);
                ItemOutcome::Failed
            }
        }
    }

    async fn try_process(&self, article: &RawArticle) -> Result<ItemOutcome> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::Internal(format!("concurrency limiter closed: {}", e)))?;

        // Check for duplicates before the potentially expensive enrichment
        if self.store.find_by_url(&article.url).await?.is_some() {
            debug!(url = %article.url, "article already stored, skipping");
            return Ok(ItemOutcome::Skipped);
        }

        let enrichment = tokio::time::timeout(self.item_timeout, self.enricher.enrich(article))
            .await
            .map_err(|_| {
                Error::ExtractionFailed(format!(
                    "enrichment timed out after {}s",
                    self.item_timeout.as_secs()
                ))
            })??;

        match self.store.insert(NewArticle::from_parts(article, enrichment)).await {
            Ok(stored) => {
                info!(url = %stored.url, id = %stored.id, "stored new article");
                Ok(ItemOutcome::Inserted)
            }
            // A concurrent run won the race; the record exists either way
            Err(Error::DuplicateUrl(url)) => {
                debug!(url = %url, "article stored concurrently, skipping");
                Ok(ItemOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }
}
