use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Streaming transcription session
        .route(
            "/ws/transcribe/:consultation_id",
            get(handlers::transcribe_stream),
        )
        // Single-shot file transcription
        .route(
            "/transcribe-file/:consultation_id",
            post(handlers::transcribe_file),
        )
        // Request logging and browser-client CORS
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
