use nm_core::ArticleStore;
use std::sync::Arc;

pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub http: reqwest::Client,
    /// Bearer token callers must present to the preview endpoint.
    pub preview_token: Option<String>,
}
