use serde::Serialize;

/// A validated content gap analysis.
///
/// Only `normalizer::normalize` produces one from model output, so every
/// instance has all four fields in the requested shape. JSON keys match
/// the structure the prompt asks the model for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapAnalysis {
    #[serde(rename = "topics_competitor_covers")]
    pub topics_covered: Vec<String>,
    pub identified_gaps: Vec<String>,
    pub opportunities: Vec<String>,
    #[serde(rename = "analysis_summary")]
    pub summary: String,
}

/// Result of a full analysis run: the analysis and the generated document's URL.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: GapAnalysis,
    pub document_url: String,
}
