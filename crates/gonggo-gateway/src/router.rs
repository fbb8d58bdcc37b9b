use axum::Router;
use axum::routing::get;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, proxy_handler};
use super::server::AppState;

pub(crate) fn build_router(state: AppState) -> Router {
    let max_body_size = state.max_body_size;
    Router::new()
        .route("/health", get(health_handler))
        .fallback(proxy_handler)
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
