use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Both pages draw a fresh random prediction
        .route("/", get(handlers::index))
        .route("/refresh", get(handlers::refresh))
        // Liveness probe
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
