//! Auth Bridge — owns the one process-wide document-service session.
//!
//! The bridge is built at startup and carried in `AppState`. The service
//! behind it is constructed lazily on first use through a `OnceCell`, so
//! concurrent first requests construct it exactly once. A failed
//! construction is not cached; every later use tries again and reports
//! `NotConfigured` until credentials are present.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::warn;

use crate::config::GoogleCredentials;
use crate::docs::google::GoogleDocsClient;
use crate::docs::{DocsError, DocumentService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Google Docs Service initialization failed: {0}")]
    NotConfigured(String),

    #[error("Authorization code required")]
    InvalidCode,

    #[error("{0}")]
    Upstream(DocsError),
}

type ServiceFactory = dyn Fn() -> Result<Arc<dyn DocumentService>, DocsError> + Send + Sync;

#[derive(Clone)]
pub struct AuthBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    service: OnceCell<Arc<dyn DocumentService>>,
    factory: Box<ServiceFactory>,
}

impl AuthBridge {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn DocumentService>, DocsError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(BridgeInner {
                service: OnceCell::new(),
                factory: Box::new(factory),
            }),
        }
    }

    /// Bridge backed by the Google Docs client. Missing credentials are only
    /// reported when the bridge is first used.
    pub fn from_config(google: Option<GoogleCredentials>) -> Self {
        Self::new(move || {
            let credentials = google.clone().ok_or_else(|| {
                DocsError::NotConfigured(
                    "GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set".to_string(),
                )
            })?;
            let client: Arc<dyn DocumentService> = Arc::new(GoogleDocsClient::new(credentials)?);
            Ok(client)
        })
    }

    /// Bridge around an already-built service.
    #[cfg(test)]
    pub fn with_service(service: Arc<dyn DocumentService>) -> Self {
        Self::new(move || Ok(service.clone()))
    }

    pub async fn service(&self) -> Result<Arc<dyn DocumentService>, AuthError> {
        self.inner
            .service
            .get_or_try_init(|| async { (self.inner.factory)() })
            .await
            .cloned()
            .map_err(|e| {
                warn!("Document service unavailable: {e}");
                AuthError::NotConfigured(e.to_string())
            })
    }

    pub async fn authorization_url(&self) -> Result<String, AuthError> {
        self.service()
            .await?
            .authorization_url()
            .map_err(|e| AuthError::NotConfigured(e.to_string()))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<(), AuthError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::InvalidCode);
        }
        self.service()
            .await?
            .exchange_code(code)
            .await
            .map_err(AuthError::Upstream)
    }
}
