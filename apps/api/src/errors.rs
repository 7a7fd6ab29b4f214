use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::orchestrator::AnalysisError;
use crate::docs::AuthError;

/// Shown alongside analysis failures where the model output was rejected.
pub const HALLUCINATION_HINT: &str =
    "The AI returned invalid data. Try rephrasing or providing more context.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed request shape, rejected before any analysis work.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Analysis(e @ AnalysisError::EmptyInput) => {
                (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
            }
            AppError::Analysis(e @ AnalysisError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, json!({ "error": e.to_string() }))
            }
            AppError::Analysis(e) => {
                tracing::error!("Analysis error: {e}");
                let mut body = json!({
                    "error": "Analysis failed",
                    "details": e.to_string(),
                });
                if e.is_suspected_hallucination() {
                    body["hint"] = json!(HALLUCINATION_HINT);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            AppError::Auth(e @ AuthError::InvalidCode) => {
                (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
            }
            AppError::Auth(e) => {
                tracing::error!("Auth error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": e.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    use crate::analysis::normalizer::NormalizeError;
    use crate::docs::DocsError;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_is_bad_request() {
        let (status, body) = render(AppError::Validation("bad".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "bad" }));
    }

    #[tokio::test]
    async fn test_empty_input_is_bad_request() {
        let (status, body) = render(AnalysisError::EmptyInput.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Competitor posts cannot be empty");
    }

    #[tokio::test]
    async fn test_not_found_is_404() {
        let (status, body) = render(AnalysisError::NotFound("/tmp/x".to_string()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "File not found: /tmp/x");
    }

    #[tokio::test]
    async fn test_rejected_output_carries_hint() {
        let error = AnalysisError::Rejected(NormalizeError::InvalidShape {
            field: "opportunities",
            reason: "is missing".to_string(),
        });
        let (status, body) = render(error.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Analysis failed");
        assert_eq!(
            body["details"],
            "Invalid gap analysis structure: opportunities is missing"
        );
        assert_eq!(body["hint"], HALLUCINATION_HINT);
    }

    #[tokio::test]
    async fn test_upstream_failure_has_no_hint() {
        let (status, body) = render(AnalysisError::Upstream("boom".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "boom");
        assert!(body.get("hint").is_none());
    }

    #[tokio::test]
    async fn test_auth_errors() {
        let (status, body) = render(AuthError::InvalidCode.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Authorization code required");

        let (status, body) = render(AuthError::Upstream(DocsError::NotAuthenticated).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Not authenticated"));
    }
}
