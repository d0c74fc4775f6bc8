//! The three model-backed flows: README summarization, tech-stack
//! extraction, and resume question answering.
//!
//! Callers impose their own deadlines around these; every failure mode here
//! (upstream error, unparseable reply, empty text) surfaces as an `Err` the
//! pipeline converts into its fallback chain.

use std::collections::HashMap;

use tracing::{debug, instrument};

use super::prompt::{ANSWER_QUESTION_PROMPT, EXTRACT_TECH_PROMPT, SUMMARIZE_README_PROMPT};
use super::query::{AiSummaryResult, Query, TechStackList};
use super::{AiClient, GenerationParams};
use crate::AppResult;
use crate::config::MAX_README_LENGTH;

/// Replies starting with this are model-side refusals, handled by callers
/// exactly like an error.
pub const SUMMARY_FAILURE_SENTINEL: &str = "Could not summarize";

/// A summary the pipeline must not display: empty, or the sentinel refusal.
pub fn is_unusable_summary(summary: &str) -> bool {
    let trimmed = summary.trim();
    trimmed.is_empty() || trimmed.starts_with(SUMMARY_FAILURE_SENTINEL)
}

/// Everything known about a repository at summarization time.
#[derive(Debug, Clone)]
pub struct ReadmeSummaryInput<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub language: Option<&'a str>,
    pub topics: &'a [String],
    pub detected_tech: &'a [String],
    pub file_names: &'a [String],
    pub readme: &'a str,
}

/// Cut README text to the prompt budget, respecting char boundaries.
fn truncate_readme(readme: &str) -> &str {
    if readme.len() <= MAX_README_LENGTH {
        return readme;
    }
    let mut cut = MAX_README_LENGTH;
    while !readme.is_char_boundary(cut) {
        cut -= 1;
    }
    &readme[..cut]
}

/// Ask the model for a `{summary, techStack}` record grounded in the full
/// project context.
#[instrument(name = "Summarizing README", level = "debug", skip(client, input), fields(project = input.name))]
pub async fn summarize_readme(
    client: &AiClient,
    input: &ReadmeSummaryInput<'_>,
) -> AppResult<AiSummaryResult> {
    let topics = input.topics.join(", ");
    let detected = input.detected_tech.join(", ");
    let files = input.file_names.join(", ");
    let readme = truncate_readme(input.readme);

    let mut vars: HashMap<&str, &str> = HashMap::new();
    vars.insert("name", input.name);
    vars.insert("description", input.description.unwrap_or("(none)"));
    vars.insert("language", input.language.unwrap_or("(unknown)"));
    vars.insert("topics", &topics);
    vars.insert("detected", &detected);
    vars.insert("files", &files);
    vars.insert("readme", readme);

    let prompt = SUMMARIZE_README_PROMPT.render(&vars);
    let reply = client
        .generate(&prompt, &GenerationParams::structured())
        .await?;
    let result = AiSummaryResult::from_response(&reply)?;
    debug!(
        "Summary for {}: {} words, {} technologies",
        input.name,
        result.summary.split_whitespace().count(),
        result.tech_stack.len()
    );
    Ok(result)
}

/// Last-resort tech-stack guess from name and description alone.
#[instrument(name = "Extracting tech stack", level = "debug", skip(client, description))]
pub async fn extract_tech_stack_from_code(
    client: &AiClient,
    name: &str,
    description: &str,
) -> AppResult<Vec<String>> {
    let mut vars: HashMap<&str, &str> = HashMap::new();
    vars.insert("name", name);
    vars.insert(
        "description",
        if description.trim().is_empty() {
            "(none)"
        } else {
            description
        },
    );
    let prompt = EXTRACT_TECH_PROMPT.render(&vars);
    let reply = client
        .generate(&prompt, &GenerationParams::structured())
        .await?;
    Ok(TechStackList::from_response(&reply)?.tech_stack)
}

/// Free-text answer to a question over the combined context document.
#[instrument(name = "Answering question", level = "debug", skip(client, question, context))]
pub async fn answer_question(
    client: &AiClient,
    question: &str,
    context: &str,
) -> AppResult<String> {
    let mut vars: HashMap<&str, &str> = HashMap::new();
    vars.insert("resume", context);
    vars.insert("question", question);
    let prompt = ANSWER_QUESTION_PROMPT.render(&vars);
    client
        .generate(&prompt, &GenerationParams::conversational())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_and_empty_summaries_are_unusable() {
        assert!(is_unusable_summary(""));
        assert!(is_unusable_summary("   \n"));
        assert!(is_unusable_summary("Could not summarize README content."));
        assert!(is_unusable_summary(
            "Could not summarize README content due to an error."
        ));
        assert!(!is_unusable_summary("A CLI for parsing logs."));
    }

    #[test]
    fn readme_truncation_respects_char_boundaries() {
        let readme = "é".repeat(MAX_README_LENGTH);
        let cut = truncate_readme(&readme);
        assert!(cut.len() <= MAX_README_LENGTH);
        assert!(cut.chars().all(|c| c == 'é'));
    }
}
