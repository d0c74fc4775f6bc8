//! The resume-chat pipeline and its in-memory transcript types.
//!
//! Raw errors never reach the end user: validation failures get fixed
//! prompts, model failures get a fixed apology with suggested topics.

use std::time::Duration;

use serde::Serialize;
use tracing::{instrument, warn};

use crate::AppResult;
use crate::ai::AiClient;
use crate::ai::flows;
use crate::config::AppConfig;
use crate::context::{chat_context, github_portfolio_context};
use crate::error::AppError;
use crate::github::GitHubClient;
use crate::resume::ResumeData;

/// Questions longer than this are rejected before any model call.
pub const MAX_QUESTION_CHARS: usize = 2000;

pub const EMPTY_QUESTION_MESSAGE: &str =
    "## Question Required\n\nPlease provide a question for me to answer.";

pub const QUESTION_TOO_LONG_MESSAGE: &str = "## Question Too Long\n\nPlease keep your question \
     under 2000 characters for better processing.";

pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "## Service Temporarily Unavailable\n\n\
     I ran into an issue processing your request. Please try again in a few \
     moments.\n\n\
     ### In the meantime, try asking about:\n\
     - My technical skills and experience\n\
     - Specific projects from my portfolio\n\
     - Career background and achievements";

const SHORT_ANSWER_TIP: &str = "\n\n---\n\n*Tip: ask more specific questions about my projects, \
     skills, or experience for detailed responses.*";

/// Model seam for the chat flow; fakes implement this in tests.
pub trait AnswerModel {
    async fn answer(&self, question: &str, context: &str) -> AppResult<String>;
}

impl AnswerModel for AiClient {
    async fn answer(&self, question: &str, context: &str) -> AppResult<String> {
        flows::answer_question(self, question, context).await
    }
}

/// One turn of the conversation, as the UI renders it.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Ordered in-memory transcript. Never persisted.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatSession {
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &ChatMessage {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            content: content.into(),
            is_typing: false,
        });
        self.messages.last().expect("just pushed")
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// Validate, ask the model under a deadline, and post-process; never errors.
///
/// The context document is only assembled by the caller when validation is
/// going to pass, which the separate [`validate_question`] makes possible.
pub async fn answer_with<M: AnswerModel>(
    model: &M,
    question: &str,
    context: &str,
    budget: Duration,
) -> String {
    if let Some(fixed) = validate_question(question) {
        return fixed.to_string();
    }
    match tokio::time::timeout(budget, model.answer(question.trim(), context)).await {
        Ok(Ok(answer)) => normalize_answer(answer),
        Ok(Err(e)) => {
            warn!("Chat answer failed: {e}");
            SERVICE_UNAVAILABLE_MESSAGE.to_string()
        }
        Err(_) => {
            let e = AppError::timeout("chat answer", budget);
            warn!("{e}");
            SERVICE_UNAVAILABLE_MESSAGE.to_string()
        }
    }
}

/// The two hard input checks. `Some` is the fixed reply to return without
/// calling the model.
pub fn validate_question(question: &str) -> Option<&'static str> {
    if question.trim().is_empty() {
        return Some(EMPTY_QUESTION_MESSAGE);
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Some(QUESTION_TOO_LONG_MESSAGE);
    }
    None
}

/// Guarantee minimal markdown structure in the answer.
///
/// Unformatted answers get their first short paragraph promoted to a
/// heading; very short answers get a tip footer.
pub fn normalize_answer(answer: String) -> String {
    let mut formatted = answer.trim().to_string();

    if !formatted.contains("**") && !formatted.contains("##") {
        let rebuilt = {
            let paragraphs: Vec<&str> = formatted
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            match paragraphs.as_slice() {
                [] => None,
                [first, rest @ ..] if !rest.is_empty() && first.chars().count() < 100 => {
                    Some(format!("## {first}\n\n{}", rest.join("\n\n")))
                }
                _ => Some(format!("## Response\n\n{formatted}")),
            }
        };
        if let Some(rebuilt) = rebuilt {
            formatted = rebuilt;
        }
    }

    if formatted.chars().count() < 100 {
        formatted.push_str(SHORT_ANSWER_TIP);
    }
    formatted
}

/// Full pipeline: assemble the combined context document, then answer.
#[instrument(name = "Answering chat question", level = "info", skip_all)]
pub async fn answer_question(
    config: &AppConfig,
    github: &GitHubClient,
    ai: &AiClient,
    resume: &ResumeData,
    question: &str,
) -> String {
    if let Some(fixed) = validate_question(question) {
        return fixed.to_string();
    }
    let portfolio =
        github_portfolio_context(github, &config.username, config.context_timeout).await;
    let context = chat_context(&resume.to_context_markdown(), &portfolio);
    answer_with(ai, question, &context, config.answer_timeout).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeModel {
        reply: AppResult<String>,
        calls: AtomicUsize,
    }

    impl FakeModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(AppError::upstream(500, "boom")),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AnswerModel for FakeModel {
        async fn answer(&self, _question: &str, _context: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(AppError::upstream(500, "boom")),
            }
        }
    }

    fn budget() -> Duration {
        Duration::from_secs(5)
    }

    #[tokio::test]
    async fn empty_question_short_circuits_without_model_call() {
        let model = FakeModel::replying("unused");
        let reply = answer_with(&model, "   \n", "ctx", budget()).await;
        assert_eq!(reply, EMPTY_QUESTION_MESSAGE);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_question_short_circuits_without_model_call() {
        let model = FakeModel::replying("unused");
        let question = "q".repeat(MAX_QUESTION_CHARS + 1);
        let reply = answer_with(&model, &question, "ctx", budget()).await;
        assert_eq!(reply, QUESTION_TOO_LONG_MESSAGE);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);

        let exactly_max = "q".repeat(MAX_QUESTION_CHARS);
        let reply = answer_with(&model, &exactly_max, "ctx", budget()).await;
        assert_ne!(reply, QUESTION_TOO_LONG_MESSAGE);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn model_failure_returns_the_fixed_apology() {
        let model = FakeModel::failing();
        let reply = answer_with(&model, "What are your skills?", "ctx", budget()).await;
        assert_eq!(reply, SERVICE_UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn unformatted_answers_get_a_heading() {
        let normalized = normalize_answer(
            "My strongest languages\n\nPython and Rust, with several shipped projects in each, \
             plus day-to-day TypeScript across the stack."
                .to_string(),
        );
        assert!(normalized.starts_with("## My strongest languages\n\n"));
    }

    #[test]
    fn single_paragraph_answers_get_a_generic_heading() {
        let long_tail = "because the resume lists them first and most projects use them daily. "
            .repeat(3);
        let normalized = normalize_answer(format!("Python and Rust, {long_tail}"));
        assert!(normalized.starts_with("## Response\n\n"));
    }

    #[test]
    fn formatted_answers_are_left_alone() {
        let answer = "## Skills\n\nPython, **Rust**, and TypeScript, applied across a dozen \
                      shipped projects and several years of coursework."
            .to_string();
        assert_eq!(normalize_answer(answer.clone()), answer);
    }

    #[test]
    fn short_answers_get_the_tip_footer() {
        let normalized = normalize_answer("**Python.**".to_string());
        assert!(normalized.ends_with(SHORT_ANSWER_TIP));
    }

    #[test]
    fn session_assigns_sequential_ids() {
        let mut session = ChatSession::default();
        session.push(Role::User, "hi");
        session.push(Role::Assistant, "hello");
        let ids: Vec<u64> = session.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(session.messages()[1].role, Role::Assistant);
    }
}
