//! Analysis pipeline — competitor text → Gemini → normalizer → Google Doc.
//!
//! Flow: validate input → build prompt → one LLM call → normalize →
//!       create report through the Auth Bridge → return analysis + URL.
//!
//! No retries anywhere: a rejected model response is reported to the caller.

use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::models::{AnalysisOutcome, GapAnalysis};
use crate::analysis::normalizer::{normalize, NormalizeError};
use crate::analysis::prompts::build_gap_analysis_prompt;
use crate::docs::{AuthBridge, AuthError, DocsError};
use crate::llm_client::{LlmError, TextGenerator};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Competitor posts cannot be empty")]
    EmptyInput,

    #[error("File not found: {0}")]
    NotFound(String),

    /// `MalformedOutput` or `InvalidShape` from the normalizer.
    #[error(transparent)]
    Rejected(#[from] NormalizeError),

    #[error("{0}")]
    NotConfigured(String),

    #[error("{0}")]
    Upstream(String),
}

impl AnalysisError {
    /// True when the model answered but its output was unusable.
    pub fn is_suspected_hallucination(&self) -> bool {
        matches!(self, AnalysisError::Rejected(_))
    }
}

impl From<LlmError> for AnalysisError {
    fn from(e: LlmError) -> Self {
        AnalysisError::Upstream(format!("Gemini request failed: {e}"))
    }
}

impl From<DocsError> for AnalysisError {
    fn from(e: DocsError) -> Self {
        match e {
            DocsError::NotConfigured(msg) => AnalysisError::NotConfigured(msg),
            other => AnalysisError::Upstream(format!("Document creation failed: {other}")),
        }
    }
}

impl From<AuthError> for AnalysisError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Upstream(docs) => docs.into(),
            e @ AuthError::NotConfigured(_) => AnalysisError::NotConfigured(e.to_string()),
            // Only `exchange_code` produces this; the analysis path never does.
            e @ AuthError::InvalidCode => AnalysisError::Upstream(e.to_string()),
        }
    }
}

/// Runs the LLM step only: prompt, one model call, normalization.
pub async fn extract_gap_analysis(
    competitor_posts: &str,
    llm: &dyn TextGenerator,
) -> Result<GapAnalysis, AnalysisError> {
    if competitor_posts.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let prompt = build_gap_analysis_prompt(competitor_posts);
    let raw = llm.generate(&prompt).await?;

    normalize(&raw).map_err(|e| {
        warn!("Rejected model output: {e}");
        AnalysisError::Rejected(e)
    })
}

/// Full analysis of text supplied directly by the caller.
pub async fn analyze(
    competitor_posts: &str,
    llm: &dyn TextGenerator,
    docs: &AuthBridge,
) -> Result<AnalysisOutcome, AnalysisError> {
    let analysis = extract_gap_analysis(competitor_posts, llm).await?;

    let service = docs.service().await?;
    let document_url = service.create_report(&analysis).await?;

    info!(
        topics = analysis.topics_covered.len(),
        gaps = analysis.identified_gaps.len(),
        opportunities = analysis.opportunities.len(),
        %document_url,
        "Gap analysis completed"
    );

    Ok(AnalysisOutcome {
        analysis,
        document_url,
    })
}

/// Full analysis of text read from a local file.
pub async fn analyze_file(
    path: &str,
    llm: &dyn TextGenerator,
    docs: &AuthBridge,
) -> Result<AnalysisOutcome, AnalysisError> {
    let competitor_posts = read_posts_file(path).await?;
    analyze(&competitor_posts, llm, docs).await
}

/// Reads a regular UTF-8 file. Anything else (missing, directory,
/// unreadable, binary) is `NotFound`.
pub async fn read_posts_file(path: &str) -> Result<String, AnalysisError> {
    let not_found = || AnalysisError::NotFound(path.to_string());

    let metadata = tokio::fs::metadata(path).await.map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    tokio::fs::read_to_string(path).await.map_err(|e| {
        warn!("Could not read {path}: {e}");
        not_found()
    })
}
