//! Report rendering — lays a `GapAnalysis` out as plain document text.
//!
//! Pure: produces the title, the body text, and the heading ranges that the
//! Google client styles after inserting the body.

use chrono::NaiveDate;

use crate::analysis::models::GapAnalysis;

/// Google Docs body content starts at index 1.
const DOC_START_INDEX: usize = 1;
const EMPTY_SECTION: &str = "(none identified)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingSpan {
    /// Start index in UTF-16 code units, document-relative.
    pub start: usize,
    /// End index (exclusive), including the paragraph's trailing newline.
    pub end: usize,
    /// Google Docs `namedStyleType`.
    pub style: &'static str,
}

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub title: String,
    pub body: String,
    pub headings: Vec<HeadingSpan>,
}

pub fn render_report(analysis: &GapAnalysis, generated_on: NaiveDate) -> RenderedReport {
    let date = generated_on.format("%Y-%m-%d").to_string();
    let mut builder = ReportBuilder::default();

    builder.heading("Content Gap Analysis", "HEADING_1");
    builder.line(&format!("Generated: {date}"));
    builder.line("");

    builder.heading("Summary", "HEADING_2");
    builder.line(&analysis.summary);
    builder.line("");

    builder.heading("Topics Competitor Covers", "HEADING_2");
    builder.bullets(&analysis.topics_covered);
    builder.line("");

    builder.heading("Identified Gaps", "HEADING_2");
    builder.bullets(&analysis.identified_gaps);
    builder.line("");

    builder.heading("Content Opportunities", "HEADING_2");
    builder.numbered(&analysis.opportunities);

    RenderedReport {
        title: format!("Content Gap Analysis - {date}"),
        body: builder.body,
        headings: builder.headings,
    }
}

#[derive(Default)]
struct ReportBuilder {
    body: String,
    utf16_len: usize,
    headings: Vec<HeadingSpan>,
}

impl ReportBuilder {
    fn line(&mut self, text: &str) {
        self.body.push_str(text);
        self.body.push('\n');
        self.utf16_len += text.encode_utf16().count() + 1;
    }

    fn heading(&mut self, text: &str, style: &'static str) {
        let start = DOC_START_INDEX + self.utf16_len;
        self.line(text);
        self.headings.push(HeadingSpan {
            start,
            end: DOC_START_INDEX + self.utf16_len,
            style,
        });
    }

    fn bullets(&mut self, items: &[String]) {
        if items.is_empty() {
            self.line(EMPTY_SECTION);
        }
        for item in items {
            self.line(&format!("• {item}"));
        }
    }

    fn numbered(&mut self, items: &[String]) {
        if items.is_empty() {
            self.line(EMPTY_SECTION);
        }
        for (i, item) in items.iter().enumerate() {
            self.line(&format!("{}. {item}", i + 1));
        }
    }
}
