mod config;
mod guests;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/config", config::router())
        .nest("/guests", guests::router())
}

/// The full application without request tracing, as served and as tested.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .nest("/api", router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
