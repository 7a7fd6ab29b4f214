use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Returns service status, version, and the available endpoints.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "service": "SyncSpark Gap Analysis Engine",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "analyze": "POST /analyze - Analyze competitor posts from text",
            "analyzeFile": "POST /analyze-file - Analyze competitor posts from file",
            "auth": "GET /auth - Get Google OAuth URL",
            "authCallback": "GET /auth/callback?code=XXX - Complete OAuth"
        }
    }))
}
