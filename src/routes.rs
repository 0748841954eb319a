use crate::{
    handlers, // Import handlers module
    AppState, // Use the AppState defined in main.rs
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/templates", get(handlers::list_templates))
        .route("/api/templates/clear-cache", post(handlers::clear_cache))
        .route("/api/memes/generate", post(handlers::generate_meme))
        .route("/api/memes/recent", get(handlers::recent_memes))
        .route("/api/memes/{id}", get(handlers::get_meme))
        .route("/api/captions/generate", post(handlers::generate_caption))
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state) // Pass the application state
}
