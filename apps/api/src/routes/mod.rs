pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::docs::handlers as auth;
use crate::state::AppState;

/// Competitor post dumps can be large; plain-text bodies up to 10 MiB.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        // Google OAuth
        .route("/auth", get(auth::handle_auth_url))
        .route("/auth/callback", get(auth::handle_auth_callback))
        // Analysis
        .route("/analyze", post(analysis::handle_analyze))
        .route("/analyze-file", post(analysis::handle_analyze_file))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}
