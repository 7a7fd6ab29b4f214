//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::analysis::models::{AnalysisOutcome, GapAnalysis};
use crate::analysis::orchestrator::{analyze, analyze_file};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub posts: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFileRequest {
    pub file_path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub message: String,
    pub document_url: String,
    pub analysis: GapAnalysis,
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        AnalyzeResponse {
            success: true,
            message: "Gap analysis completed successfully".to_string(),
            document_url: outcome.document_url,
            analysis: outcome.analysis,
        }
    }
}

const INVALID_ANALYZE_BODY: &str =
    "Invalid request. Send either plain text or JSON with \"posts\" field";
const MISSING_FILE_PATH: &str =
    "File path required. Provide absolute path in JSON: {\"filePath\": \"path/to/file.txt\"}";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Accepts either a raw text body or JSON `{"posts": "..."}`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let posts = extract_posts(&headers, &body)?;
    let outcome = analyze(&posts, state.llm.as_ref(), &state.docs).await?;
    Ok(Json(outcome.into()))
}

/// POST /analyze-file
///
/// Reads competitor posts from a path on the server's filesystem.
pub async fn handle_analyze_file(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeFileRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(request) = payload.map_err(|_| AppError::Validation(MISSING_FILE_PATH.to_string()))?;

    let file_path = request
        .file_path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation(MISSING_FILE_PATH.to_string()))?;

    let outcome = analyze_file(&file_path, state.llm.as_ref(), &state.docs).await?;
    Ok(Json(outcome.into()))
}

/// Pulls the competitor text out of a `/analyze` body. `text/*` bodies are
/// taken as raw text; JSON bodies must carry a string `posts` field. Any
/// other content type, or none, is rejected.
fn extract_posts(headers: &HeaderMap, body: &[u8]) -> Result<String, AppError> {
    let invalid = || AppError::Validation(INVALID_ANALYZE_BODY.to_string());

    let mime = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .ok_or_else(invalid)?;

    if mime == "application/json" {
        let request: AnalyzeRequest = serde_json::from_slice(body).map_err(|_| invalid())?;
        return request.posts.ok_or_else(invalid);
    }

    if !mime.starts_with("text/") {
        return Err(invalid());
    }

    String::from_utf8(body.to_vec())
        .map_err(|_| AppError::Validation("Request body must be UTF-8 text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_extract_posts_from_plain_text() {
        let posts = extract_posts(&headers("text/plain"), b"Post one\nPost two").unwrap();
        assert_eq!(posts, "Post one\nPost two");
    }

    #[test]
    fn test_extract_posts_accepts_any_text_subtype() {
        let posts = extract_posts(&headers("text/markdown; charset=utf-8"), b"# Launch").unwrap();
        assert_eq!(posts, "# Launch");
    }

    #[test]
    fn test_extract_posts_without_content_type_is_rejected() {
        let err = extract_posts(&HeaderMap::new(), b"Post one").unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == INVALID_ANALYZE_BODY));
    }

    #[test]
    fn test_extract_posts_rejects_non_text_content_types() {
        for content_type in [
            "application/x-www-form-urlencoded",
            "multipart/form-data; boundary=x",
            "image/png",
        ] {
            let err = extract_posts(&headers(content_type), b"posts=hello").unwrap_err();
            assert!(
                matches!(err, AppError::Validation(ref m) if m == INVALID_ANALYZE_BODY),
                "content type: {content_type}"
            );
        }
    }

    #[test]
    fn test_extract_posts_from_json() {
        let posts = extract_posts(
            &headers("application/json; charset=utf-8"),
            br#"{"posts": "We ship fast"}"#,
        )
        .unwrap();
        assert_eq!(posts, "We ship fast");
    }

    #[test]
    fn test_extract_posts_json_without_posts_field() {
        let err = extract_posts(&headers("application/json"), br#"{"text": "x"}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == INVALID_ANALYZE_BODY));
    }

    #[test]
    fn test_extract_posts_json_with_non_string_posts() {
        let err = extract_posts(&headers("application/json"), br#"{"posts": 42}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_extract_posts_invalid_utf8() {
        let err = extract_posts(&headers("text/plain"), &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
