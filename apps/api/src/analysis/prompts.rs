// Gap analysis LLM prompt template.
// The competitor text is substituted for {competitor_posts} verbatim.

pub const GAP_ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are a competitive intelligence analyst. Analyze the following competitor social media posts and identify content gaps.

Competitor Posts:
{competitor_posts}

Your task:
1. Identify the main topics the competitor IS talking about
2. Identify topics/angles they are NOT covering (gaps in their content strategy)
3. Suggest opportunities based on these gaps

Return ONLY a valid JSON object with this exact structure (no markdown, no code blocks):
{
  "topics_competitor_covers": ["topic1", "topic2", ...],
  "identified_gaps": ["gap1", "gap2", ...],
  "opportunities": ["opportunity1", "opportunity2", ...],
  "analysis_summary": "A brief 2-3 sentence summary of the key findings"
}"#;

pub fn build_gap_analysis_prompt(competitor_posts: &str) -> String {
    GAP_ANALYSIS_PROMPT_TEMPLATE.replace("{competitor_posts}", competitor_posts)
}
