// Document publishing: Google Docs OAuth session and report creation.
// All Google API calls go through `google::GoogleDocsClient`; handlers and the
// analysis pipeline only see the `DocumentService` trait via `AuthBridge`.

pub mod bridge;
pub mod google;
pub mod handlers;
pub mod report;

use async_trait::async_trait;
use thiserror::Error;

use crate::analysis::models::GapAnalysis;

pub use bridge::{AuthBridge, AuthError};

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("Not authenticated with Google. Visit GET /auth to authorize document access")]
    NotAuthenticated,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// The document-publishing collaborator.
///
/// `AuthBridge` holds exactly one of these per process. Tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// URL the user visits to grant document access.
    fn authorization_url(&self) -> Result<String, DocsError>;

    /// Exchanges an OAuth authorization code for a session token and keeps it.
    async fn exchange_code(&self, code: &str) -> Result<(), DocsError>;

    /// Creates a document from the analysis and returns its URL.
    async fn create_report(&self, analysis: &GapAnalysis) -> Result<String, DocsError>;
}
