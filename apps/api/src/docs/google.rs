//! Google Docs client — OAuth2 authorization-code flow plus document creation.
//!
//! Holds a single in-memory token set for the process. There is no
//! per-user token storage: whoever completes `/auth/callback` last owns
//! the session.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::analysis::models::GapAnalysis;
use crate::config::GoogleCredentials;
use crate::docs::report::{render_report, RenderedReport};
use crate::docs::{DocsError, DocumentService};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DOCS_API_URL: &str = "https://docs.googleapis.com/v1/documents";
const DOCS_VIEW_URL: &str = "https://docs.google.com/document/d";
const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive.file",
];
/// Refresh the access token when it expires within this many seconds.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct TokenSet {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    fn from_response(
        response: TokenResponse,
        previous_refresh: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        TokenSet {
            access_token: response.access_token,
            // Google omits refresh_token on refresh grants; keep the old one.
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: response.expires_in.map(|secs| now + Duration::seconds(secs)),
        }
    }

    fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map_or(false, |at| at - Duration::seconds(REFRESH_MARGIN_SECS) <= now)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

pub struct GoogleDocsClient {
    client: Client,
    credentials: GoogleCredentials,
    token: RwLock<Option<TokenSet>>,
}

impl GoogleDocsClient {
    pub fn new(credentials: GoogleCredentials) -> Result<Self, DocsError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            credentials,
            token: RwLock::new(None),
        })
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, DocsError> {
        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(params)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Returns a usable access token, refreshing it first if it is about to expire.
    async fn access_token(&self) -> Result<String, DocsError> {
        let current = self
            .token
            .read()
            .await
            .clone()
            .ok_or(DocsError::NotAuthenticated)?;

        let now = Utc::now();
        let refresh_token = match &current.refresh_token {
            Some(refresh) if current.needs_refresh(now) => refresh.clone(),
            _ => return Ok(current.access_token),
        };

        debug!("Refreshing Google access token");
        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &refresh_token),
                ("client_id", &self.credentials.client_id),
                ("client_secret", &self.credentials.client_secret),
            ])
            .await?;

        let refreshed = TokenSet::from_response(response, Some(refresh_token), now);
        let access_token = refreshed.access_token.clone();
        *self.token.write().await = Some(refreshed);
        Ok(access_token)
    }

    async fn create_document(&self, token: &str, title: &str) -> Result<String, DocsError> {
        let response = self
            .client
            .post(DOCS_API_URL)
            .bearer_auth(token)
            .json(&json!({ "title": title }))
            .send()
            .await?;
        let created: CreatedDocument = check_status(response).await?.json().await?;
        Ok(created.document_id)
    }

    async fn batch_update(
        &self,
        token: &str,
        document_id: &str,
        requests: Vec<Value>,
    ) -> Result<(), DocsError> {
        let response = self
            .client
            .post(format!("{DOCS_API_URL}/{document_id}:batchUpdate"))
            .bearer_auth(token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentService for GoogleDocsClient {
    fn authorization_url(&self) -> Result<String, DocsError> {
        build_authorization_url(&self.credentials)
    }

    async fn exchange_code(&self, code: &str) -> Result<(), DocsError> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.credentials.client_id),
                ("client_secret", &self.credentials.client_secret),
                ("redirect_uri", &self.credentials.redirect_uri),
            ])
            .await?;

        let token = TokenSet::from_response(response, None, Utc::now());
        info!(
            has_refresh_token = token.refresh_token.is_some(),
            "Google OAuth token obtained"
        );
        *self.token.write().await = Some(token);
        Ok(())
    }

    async fn create_report(&self, analysis: &GapAnalysis) -> Result<String, DocsError> {
        let token = self.access_token().await?;
        let report = render_report(analysis, Utc::now().date_naive());

        let document_id = self.create_document(&token, &report.title).await?;
        self.batch_update(&token, &document_id, batch_requests(&report))
            .await?;

        info!(%document_id, "Gap analysis report created");
        Ok(document_url(&document_id))
    }
}

fn build_authorization_url(credentials: &GoogleCredentials) -> Result<String, DocsError> {
    let scope = SCOPES.join(" ");
    Url::parse_with_params(
        GOOGLE_AUTH_URL,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", scope.as_str()),
        ],
    )
    .map(String::from)
    .map_err(|e| DocsError::NotConfigured(format!("Invalid OAuth URL: {e}")))
}

/// Insert the whole body at the top of the document, then style the headings.
fn batch_requests(report: &RenderedReport) -> Vec<Value> {
    let mut requests = vec![json!({
        "insertText": {
            "location": { "index": 1 },
            "text": report.body
        }
    })];
    requests.extend(report.headings.iter().map(|h| {
        json!({
            "updateParagraphStyle": {
                "range": { "startIndex": h.start, "endIndex": h.end },
                "paragraphStyle": { "namedStyleType": h.style },
                "fields": "namedStyleType"
            }
        })
    }));
    requests
}

fn document_url(document_id: &str) -> String {
    format!("{DOCS_VIEW_URL}/{document_id}/edit")
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DocsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DocsError::Api {
        status: status.as_u16(),
        message: google_error_message(body),
    })
}

/// Handles both the Docs API (`{"error": {"message": ..}}`) and the OAuth
/// token endpoint (`{"error": "..", "error_description": ".."}`) error shapes.
fn google_error_message(body: String) -> String {
    let Ok(value) = serde_json::from_str::<Value>(&body) else {
        return body;
    };
    if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
        return message.to_string();
    }
    let error = value.get("error").and_then(Value::as_str);
    let description = value.get("error_description").and_then(Value::as_str);
    match (error, description) {
        (Some(error), Some(description)) => format!("{error}: {description}"),
        (Some(error), None) => error.to_string(),
        _ => body,
    }
}
