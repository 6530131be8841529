use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod preview;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/preview", get(handlers::preview_article))
        .layer(cors)
        .with_state(Arc::new(state))
}
