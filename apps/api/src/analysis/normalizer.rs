//! Response Normalizer — turns untrusted model text into a validated `GapAnalysis`.
//!
//! The model may wrap its JSON in code fences, drop fields, or return
//! something that is not JSON at all. Nothing leaves this module unless all
//! four fields are present and correctly shaped.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::models::GapAnalysis;

pub const TOPICS_FIELD: &str = "topics_competitor_covers";
pub const GAPS_FIELD: &str = "identified_gaps";
pub const OPPORTUNITIES_FIELD: &str = "opportunities";
pub const SUMMARY_FIELD: &str = "analysis_summary";

/// Reported as the offending field when the top level is not a JSON object.
const ROOT_FIELD: &str = "analysis";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The text could not be parsed as JSON at all.
    #[error("Model returned invalid JSON. This might be a hallucination. Error: {detail}")]
    MalformedOutput { detail: String },

    /// Valid JSON, but a required field is missing or has the wrong type.
    #[error("Invalid gap analysis structure: {field} {reason}")]
    InvalidShape { field: &'static str, reason: String },
}

impl NormalizeError {
    fn shape(field: &'static str, reason: impl Into<String>) -> Self {
        NormalizeError::InvalidShape {
            field,
            reason: reason.into(),
        }
    }
}

/// Strips a leading ```json (any case) or bare ``` opener and a trailing ``` closer.
/// Text without a leading fence is returned trimmed and otherwise untouched.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let rest = rest.trim_start();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Validates raw model output as a `GapAnalysis`.
///
/// Fields are checked in a fixed order (topics, gaps, opportunities, summary)
/// and the first failure is reported.
pub fn normalize(raw: &str) -> Result<GapAnalysis, NormalizeError> {
    let cleaned = strip_fences(raw);

    let value: Value =
        serde_json::from_str(cleaned).map_err(|e| NormalizeError::MalformedOutput {
            detail: e.to_string(),
        })?;

    let object = value.as_object().ok_or_else(|| {
        NormalizeError::shape(
            ROOT_FIELD,
            format!("must be a JSON object, found {}", describe(&value)),
        )
    })?;

    Ok(GapAnalysis {
        topics_covered: string_list(object, TOPICS_FIELD)?,
        identified_gaps: string_list(object, GAPS_FIELD)?,
        opportunities: string_list(object, OPPORTUNITIES_FIELD)?,
        summary: summary(object)?,
    })
}

fn string_list(object: &Map<String, Value>, field: &'static str) -> Result<Vec<String>, NormalizeError> {
    let items = match object.get(field) {
        None | Some(Value::Null) => return Err(NormalizeError::shape(field, "is missing")),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(NormalizeError::shape(
                field,
                format!("must be an array of strings, found {}", describe(other)),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(String::from).ok_or_else(|| {
                NormalizeError::shape(
                    field,
                    format!("must contain only strings, element {i} is {}", describe(item)),
                )
            })
        })
        .collect()
}

fn summary(object: &Map<String, Value>) -> Result<String, NormalizeError> {
    match object.get(SUMMARY_FIELD) {
        None | Some(Value::Null) => Err(NormalizeError::shape(SUMMARY_FIELD, "is missing")),
        Some(Value::String(s)) if s.is_empty() => {
            Err(NormalizeError::shape(SUMMARY_FIELD, "must not be empty"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(NormalizeError::shape(
            SUMMARY_FIELD,
            format!("must be a string, found {}", describe(other)),
        )),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"topics_competitor_covers":["pricing"],"identified_gaps":["tutorials"],"opportunities":["how-to series"],"analysis_summary":"Competitor focuses on pricing."}"#;

    fn expected() -> GapAnalysis {
        GapAnalysis {
            topics_covered: vec!["pricing".to_string()],
            identified_gaps: vec!["tutorials".to_string()],
            opportunities: vec!["how-to series".to_string()],
            summary: "Competitor focuses on pricing.".to_string(),
        }
    }

    fn shape_field(result: Result<GapAnalysis, NormalizeError>) -> &'static str {
        match result {
            Err(NormalizeError::InvalidShape { field, .. }) => field,
            other => panic!("expected InvalidShape, got {other:?}"),
        }
    }

    #[test]
    fn test_strip_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_with_uppercase_tag() {
        let input = "```JSON\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_missing_closer() {
        let input = "```json\n{\"key\": \"value\"}";
        assert_eq!(strip_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_keeps_surrounding_prose() {
        let input = "Here you go:\n```json\n{}\n```";
        assert_eq!(strip_fences(input), input);
    }

    #[test]
    fn test_normalize_fenced_example() {
        let input = format!("```json\n{VALID}\n```");
        assert_eq!(normalize(&input).unwrap(), expected());
    }

    #[test]
    fn test_normalize_unfenced_and_fenced_agree() {
        let plain = normalize(VALID).unwrap();
        assert_eq!(plain, normalize(&format!("```json\n{VALID}\n```")).unwrap());
        assert_eq!(plain, normalize(&format!("```\n{VALID}\n```")).unwrap());
        assert_eq!(plain, normalize(&format!("\n\n  {VALID}  \n")).unwrap());
    }

    #[test]
    fn test_normalize_preserves_order_and_ignores_extra_keys() {
        let input = r#"{
            "topics_competitor_covers": ["c", "a", "b"],
            "identified_gaps": [],
            "opportunities": ["z", "y"],
            "analysis_summary": "ok",
            "confidence": 0.9
        }"#;
        let analysis = normalize(input).unwrap();
        assert_eq!(analysis.topics_covered, vec!["c", "a", "b"]);
        assert!(analysis.identified_gaps.is_empty());
        assert_eq!(analysis.opportunities, vec!["z", "y"]);
        assert_eq!(analysis.summary, "ok");
    }

    #[test]
    fn test_normalize_missing_fields_reports_first_in_check_order() {
        let result = normalize(r#"{"topics_competitor_covers":["x"]}"#);
        assert_eq!(shape_field(result.clone()), GAPS_FIELD);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid gap analysis structure: identified_gaps is missing"
        );
    }

    #[test]
    fn test_normalize_each_missing_field_is_named() {
        let full: Value = serde_json::from_str(VALID).unwrap();
        for field in [TOPICS_FIELD, GAPS_FIELD, OPPORTUNITIES_FIELD, SUMMARY_FIELD] {
            let mut partial = full.clone();
            partial.as_object_mut().unwrap().remove(field);
            assert_eq!(shape_field(normalize(&partial.to_string())), field);
        }
    }

    #[test]
    fn test_normalize_wrong_types() {
        let cases = [
            (
                r#"{"topics_competitor_covers":"pricing","identified_gaps":[],"opportunities":[],"analysis_summary":"s"}"#,
                TOPICS_FIELD,
            ),
            (
                r#"{"topics_competitor_covers":[],"identified_gaps":[1, 2],"opportunities":[],"analysis_summary":"s"}"#,
                GAPS_FIELD,
            ),
            (
                r#"{"topics_competitor_covers":[],"identified_gaps":[],"opportunities":{"a":1},"analysis_summary":"s"}"#,
                OPPORTUNITIES_FIELD,
            ),
            (
                r#"{"topics_competitor_covers":[],"identified_gaps":[],"opportunities":[],"analysis_summary":["s"]}"#,
                SUMMARY_FIELD,
            ),
            (
                r#"{"topics_competitor_covers":[],"identified_gaps":[],"opportunities":[],"analysis_summary":null}"#,
                SUMMARY_FIELD,
            ),
        ];
        for (input, field) in cases {
            assert_eq!(shape_field(normalize(input)), field, "input: {input}");
        }
    }

    #[test]
    fn test_normalize_rejects_empty_summary() {
        let input = r#"{"topics_competitor_covers":[],"identified_gaps":[],"opportunities":[],"analysis_summary":""}"#;
        assert_eq!(shape_field(normalize(input)), SUMMARY_FIELD);
    }

    #[test]
    fn test_normalize_accepts_whitespace_summary() {
        let input = r#"{"topics_competitor_covers":["a"],"identified_gaps":["b"],"opportunities":["c"],"analysis_summary":"   "}"#;
        assert_eq!(normalize(input).unwrap().summary, "   ");
    }

    #[test]
    fn test_normalize_rejects_non_object() {
        assert_eq!(shape_field(normalize("[1, 2, 3]")), "analysis");
        assert_eq!(shape_field(normalize("\"just a string\"")), "analysis");
    }

    #[test]
    fn test_normalize_malformed_output() {
        for input in [
            "I'm sorry, I can't help with that.",
            "{\"topics_competitor_covers\": [",
            "```json\n```",
            "",
        ] {
            match normalize(input) {
                Err(NormalizeError::MalformedOutput { detail }) => assert!(!detail.is_empty()),
                other => panic!("expected MalformedOutput for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_output_message_flags_hallucination() {
        let err = normalize("not json").unwrap_err();
        assert!(err.to_string().contains("hallucination"));
    }
}
