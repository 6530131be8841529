use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nm_core::{Error, FeedFilter, FeedSource, RawArticle, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: String,
    #[serde(default)]
    articles: Vec<WireArticle>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<WireSource>,
    author: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSource {
    name: Option<String>,
}

/// Client for a NewsAPI-style top-headlines endpoint.
pub struct NewsFeed {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl fmt::Debug for NewsFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsFeed")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl NewsFeed {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

/// Maps a wire article into a `RawArticle`, dropping items that lack the
/// fields the pipeline cannot work without.
fn into_raw(wire: WireArticle) -> Option<RawArticle> {
    let url = wire.url.filter(|u| !u.trim().is_empty())?;
    let title = wire.title.filter(|t| !t.trim().is_empty())?;
    let published_at = wire
        .published_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Some(RawArticle {
        title,
        description: wire.description,
        content: wire.content,
        url,
        image_url: wire.url_to_image,
        published_at,
        source: wire
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "NewsAPI".to_string()),
        author: wire.author,
    })
}

fn collect_articles(body: FeedResponse) -> Result<Vec<RawArticle>> {
    if body.status != "ok" {
        return Err(Error::UpstreamUnavailable(format!(
            "feed reported status {}: {}",
            body.status,
            body.message.unwrap_or_default()
        )));
    }
    Ok(body.articles.into_iter().filter_map(into_raw).collect())
}

#[async_trait]
impl FeedSource for NewsFeed {
    async fn fetch_top_articles(
        &self,
        filter: &FeedFilter,
        limit: usize,
    ) -> Result<Vec<RawArticle>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::MisconfiguredCredentials("news API key is not set".to_string())
            })?;

        debug!(country = %filter.country, limit, "fetching top headlines");

        let page_size = limit.to_string();
        let response = self
            .client
            .get(format!("{}/top-headlines", self.base_url))
            .query(&[
                ("apiKey", api_key),
                ("country", filter.country.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("feed request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "feed returned status {}",
                response.status()
            )));
        }

        let body: FeedResponse = response.json().await.map_err(|e| {
            Error::UpstreamUnavailable(format!("feed response was not valid JSON: {}", e))
        })?;

        let articles = collect_articles(body)?;
        debug!(count = articles.len(), "fetched candidate articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_aborts_before_any_request() {
        // An unroutable base URL: reaching it would surface as
        // UpstreamUnavailable, so the credentials error proves no request
        // was issued.
        let feed = NewsFeed::new(None).with_base_url("http://127.0.0.1:1");
        let err = feed
            .fetch_top_articles(&FeedFilter::default(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MisconfiguredCredentials(_)));

        let feed = NewsFeed::new(Some(String::new())).with_base_url("http://127.0.0.1:1");
        let err = feed
            .fetch_top_articles(&FeedFilter::default(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MisconfiguredCredentials(_)));
    }

    #[test]
    fn test_wire_article_mapping() {
        let json = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": {"id": null, "name": "Example Times"},
                    "author": "Jane Doe",
                    "title": "Flood warnings issued",
                    "description": "Heavy rain expected",
                    "url": "https://example.com/flood",
                    "urlToImage": "https://example.com/flood.jpg",
                    "publishedAt": "2024-03-01T10:00:00Z",
                    "content": "Full content here"
                },
                {
                    "source": {"id": null, "name": "Example Times"},
                    "title": "No link for this one",
                    "url": null,
                    "publishedAt": "2024-03-01T11:00:00Z"
                }
            ]
        }"#;

        let body: FeedResponse = serde_json::from_str(json).unwrap();
        let articles = collect_articles(body).unwrap();

        // The item without a URL is dropped
        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.title, "Flood warnings issued");
        assert_eq!(article.url, "https://example.com/flood");
        assert_eq!(article.image_url.as_deref(), Some("https://example.com/flood.jpg"));
        assert_eq!(article.source, "Example Times");
        assert_eq!(article.author.as_deref(), Some("Jane Doe"));
        assert_eq!(
            article.published_at,
            DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc)
        );
    }

    #[test]
    fn test_provider_level_error_status() {
        let json = r#"{
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid"
        }"#;

        let body: FeedResponse = serde_json::from_str(json).unwrap();
        let err = collect_articles(body).unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
        assert!(err.to_string().contains("Your API key is invalid"));
    }

    #[test]
    fn test_unparseable_timestamp_falls_back_to_now() {
        let wire = WireArticle {
            title: Some("Title".to_string()),
            description: None,
            url: Some("https://example.com/a".to_string()),
            url_to_image: None,
            published_at: Some("yesterday-ish".to_string()),
            source: None,
            author: None,
            content: None,
        };

        let before = Utc::now();
        let article = into_raw(wire).unwrap();
        assert!(article.published_at >= before);
        assert_eq!(article.source, "NewsAPI");
    }
}
