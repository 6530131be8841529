use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use nm_core::{Error, NormalizedArticle};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::preview::{extract_preview, PreviewCard};
use crate::AppState;

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
}

pub async fn health() -> &'static str {
    "ok"
}

fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state.preview_token.as_deref().ok_or_else(|| {
        ApiError(Error::Unauthenticated("no preview token is configured".to_string()))
    })?;

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError(Error::Unauthenticated("missing bearer token".to_string())))?;

    if presented != expected {
        return Err(ApiError(Error::Unauthenticated("invalid bearer token".to_string())));
    }
    Ok(())
}

pub async fn preview_article(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<PreviewParams>,
) -> Result<Json<PreviewCard>, ApiError> {
    check_auth(&state, &headers)?;

    let url = params.url.filter(|u| !u.trim().is_empty()).ok_or_else(|| {
        ApiError(Error::InvalidArgument(
            "the 'url' query parameter is required".to_string(),
        ))
    })?;

    let html = state
        .http
        .get(&url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            warn!(url = %url, "preview fetch failed: {}", e);
            ApiError(Error::Internal(format!("failed to fetch page: {}", e)))
        })?
        .text()
        .await
        .map_err(|e| ApiError(Error::Internal(format!("failed to read page body: {}", e))))?;

    let card = extract_preview(&url, &html)?;
    Ok(Json(card))
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<NormalizedArticle>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let articles = state.store.list_recent(limit).await?;
    Ok(Json(articles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_app;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use nm_core::{ArticleStore, Importance, Location, NewArticle};
    use nm_storage::MemoryStorage;
    use tower::ServiceExt;

    fn test_state(store: Arc<MemoryStorage>) -> AppState {
        AppState {
            store,
            http: reqwest::Client::new(),
            preview_token: Some("secret-token".to_string()),
        }
    }

    fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_preview_rejects_unauthenticated_callers() {
        let app = create_app(test_state(Arc::new(MemoryStorage::new())));

        let response = app
            .clone()
            .oneshot(get("/api/preview?url=https://example.com", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(get("/api/preview?url=https://example.com", Some("wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_preview_requires_url_argument() {
        let app = create_app(test_state(Arc::new(MemoryStorage::new())));

        let response = app
            .oneshot(get("/api/preview", Some("secret-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_articles_returns_stored_records() {
        let store = Arc::new(MemoryStorage::new());
        store
            .insert(NewArticle {
                title: "Stored article".to_string(),
                description: None,
                url: "https://example.com/stored".to_string(),
                image_url: None,
                location: Location::Place { name: "Seoul".to_string() },
                importance: Importance::new(80),
                min_zoom: None,
                max_zoom: None,
                published_at: Utc::now(),
                source: "test".to_string(),
            })
            .await
            .unwrap();

        let app = create_app(test_state(store));
        let response = app.oneshot(get("/api/articles", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let articles: Vec<NormalizedArticle> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://example.com/stored");
    }

    #[tokio::test]
    async fn test_health_probe() {
        let app = create_app(test_state(Arc::new(MemoryStorage::new())));
        let response = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
