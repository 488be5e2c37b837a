//! Router assembly for the session API

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use crate::core::SessionRepository;

/// Build the application router around a repository instance.
pub fn build_router(repository: Arc<dyn SessionRepository>) -> Router {
    let state = AppState { repository };

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route("/sessions/average", get(handlers::average_duration))
        .route(
            "/sessions/{id}",
            get(handlers::get_session)
                .put(handlers::update_session)
                .delete(handlers::delete_session),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
