//! Client for the hosted generative-language model and the utilities for
//! pulling structured answers out of its replies.

pub mod flows;
pub mod prompt;
pub mod query;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Generation parameters sent with every model call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    /// Near-deterministic settings for JSON-contract replies.
    pub const fn structured() -> Self {
        Self {
            temperature: 0.05,
            top_k: 40,
            top_p: 0.1,
            max_output_tokens: 1024,
        }
    }

    /// Looser settings for free-text chat answers.
    pub const fn conversational() -> Self {
        Self {
            temperature: 0.4,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Thin wrapper over the `generateContent` endpoint: prompt and generation
/// parameters in, concatenated candidate text out.
pub struct AiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl AiClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let api_key = config.ai_api_key.clone().ok_or_else(|| {
            AppError::Config(
                "AI API key is missing. Set GOOGLE_AI_API_KEY to enable \
                 summarization and chat answers."
                    .to_string(),
            )
        })?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: config.ai_api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.ai_model.clone(),
        })
    }

    /// One completion call. Non-2xx responses become `Upstream` errors; a
    /// reply with no candidate text becomes a `Parse` error.
    #[instrument(name = "Calling generative model", level = "debug", skip(self, prompt))]
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}],
            }],
            "generationConfig": {
                "temperature": params.temperature,
                "topK": params.top_k,
                "topP": params.top_p,
                "maxOutputTokens": params.max_output_tokens,
            },
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let candidate = parsed.candidates.into_iter().next();
        let finish_reason = candidate
            .as_ref()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let text: String = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            debug!("Model reply carried no text, finish reason: {finish_reason}");
            return Err(AppError::Parse(format!(
                "model returned no text (finish reason: {finish_reason})"
            )));
        }
        Ok(text)
    }
}

/// Extract the first balanced JSON object embedded in free text.
///
/// Walks the reply once, tracking string/escape state and brace depth, and
/// returns the slice from the first `{` to its matching `}`. Handles fenced
/// blocks and chatty prefixes without caring about them.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
