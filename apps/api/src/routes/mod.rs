pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/config", get(health::config_handler))
        // Session API
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/upload", post(handlers::handle_upload))
        .route(
            "/api/v1/sessions/:id/job-description",
            put(handlers::handle_set_job_description),
        )
        .route("/api/v1/sessions/:id/analyze", post(handlers::handle_analyze))
        .route("/api/v1/sessions/:id/reset", post(handlers::handle_reset))
        .route("/api/v1/sessions/:id/rewrite", post(handlers::handle_rewrite))
        .route("/api/v1/sessions/:id/layout", put(handlers::handle_set_layout))
        .route("/api/v1/sessions/:id/export", get(handlers::handle_export))
        .layer(body_limit)
        .with_state(state)
}
