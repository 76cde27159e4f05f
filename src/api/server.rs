//! HTTP server implementation

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::DefaultOnResponse;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::Level;

use crate::api::auth::bearer_auth_middleware;
use crate::api::auth::AuthState;
use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::llm::LlmService;
use crate::store::DocumentStore;
use crate::Result;

/// Room for multipart framing on top of the largest accepted file
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Connect to Postgres and wire the production services
///
/// # Errors
/// - Database connection errors or a schema that was never initialized
/// - HTTP client build errors for the embedding or LLM service
pub async fn connect_state(config: &AppConfig) -> Result<(Arc<Database>, AppState)> {
    let database = Arc::new(Database::from_config(config).await?);
    database.verify_schema_or_error().await?;

    let state = AppState::new(
        config,
        database.clone(),
        database.clone(),
        Arc::new(EmbeddingService::new(config)?),
        Arc::new(LlmService::new(config)?),
    )?;

    Ok((database, state))
}

/// Assemble the router with tracing, body limit, optional auth and CORS
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    let body_limit = state.ingestion.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

    let mut api = routes::api_routes(state);
    if let Some(token) = server.auth_token.as_deref().filter(|t| !t.is_empty()) {
        info!("🔒 Bearer authentication enabled");
        api = api.layer(axum::middleware::from_fn_with_state(
            AuthState {
                expected_token: token.to_string(),
            },
            bearer_auth_middleware,
        ));
    }

    let mut app = routes::public_routes()
        .merge(api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<axum::body::Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        );

    if server.enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting docrag API server...");

    let (database, state) = connect_state(config).await?;

    let recovered = database.recover_interrupted().await?;
    if recovered > 0 {
        info!("Marked {} interrupted uploads as failed", recovered);
    }

    let mut server = config.server.clone();
    server.enable_cors = enable_cors;
    let app = build_app(state, &server);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET    /health          - Health check");
    info!("  POST   /upload          - Upload a PDF, text or markdown file");
    info!("  POST   /ask             - Ask a question");
    info!("  GET    /documents       - List documents");
    info!("  GET    /documents/:id   - Get one document");
    info!("  DELETE /documents/:id   - Delete a document");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
