use std::sync::Arc;

use crate::docs::AuthBridge;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gemini in production; swapped for a canned generator in tests.
    pub llm: Arc<dyn TextGenerator>,
    /// Lazily-initialized Google Docs session.
    pub docs: AuthBridge,
}
