//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Routes that sit behind authentication when a token is configured
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload_document))
        .route("/ask", post(handlers::ask))
        .route("/documents", get(handlers::list_documents))
        .route(
            "/documents/:id",
            get(handlers::get_document).delete(handlers::delete_document),
        )
        .with_state(state)
}

/// Routes that are always public
pub fn public_routes() -> Router {
    Router::new().route("/health", get(handlers::health))
}
