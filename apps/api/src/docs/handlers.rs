use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::docs::AuthError;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub success: bool,
    pub message: String,
}

/// GET /auth
pub async fn handle_auth_url(
    State(state): State<AppState>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    let auth_url = state.docs.authorization_url().await?;
    Ok(Json(AuthUrlResponse { auth_url }))
}

/// GET /auth/callback?code=...
pub async fn handle_auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, AppError> {
    let code = query.code.ok_or(AuthError::InvalidCode)?;
    state.docs.exchange_code(&code).await?;

    info!("OAuth callback completed");
    Ok(Json(CallbackResponse {
        success: true,
        message: "Authentication successful! You can now use the analyze endpoints.".to_string(),
    }))
}
