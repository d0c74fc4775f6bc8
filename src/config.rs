use std::env;
use std::time::Duration;

/// GitHub REST API root.
pub const GITHUB_API_BASE: &str = "https://api.github.com";
/// Generative Language API root.
pub const AI_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Model used for summaries and chat answers.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Portfolio owner whose repositories are fetched when none is given.
pub const DEFAULT_USERNAME: &str = "the-sauravkumar";

/// README text beyond this many bytes is truncated before prompting.
pub const MAX_README_LENGTH: usize = 50_000;

/// Explicit configuration injected into both API clients.
///
/// Nothing in the crate reads the process environment after construction,
/// so tests can build one of these by hand and point it at fakes.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer token for the GitHub API. Required for `/user/repos`.
    pub github_token: Option<String>,
    /// API key for the generative model endpoint.
    pub ai_api_key: Option<String>,
    /// GitHub login whose portfolio is rendered.
    pub username: String,
    pub github_api_base: String,
    pub ai_api_base: String,
    pub ai_model: String,
    /// Bounded wait for a single README fetch.
    pub readme_timeout: Duration,
    /// Bounded wait for one AI summarization call.
    pub summary_timeout: Duration,
    /// Bounded wait for one chat answer.
    pub answer_timeout: Duration,
    /// Bounded wait for assembling the GitHub portfolio context.
    pub context_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            ai_api_key: None,
            username: DEFAULT_USERNAME.to_string(),
            github_api_base: GITHUB_API_BASE.to_string(),
            ai_api_base: AI_API_BASE.to_string(),
            ai_model: DEFAULT_MODEL.to_string(),
            readme_timeout: Duration::from_secs(15),
            summary_timeout: Duration::from_secs(20),
            answer_timeout: Duration::from_secs(25),
            context_timeout: Duration::from_secs(15),
        }
    }
}

impl AppConfig {
    /// Build a config from the process environment.
    ///
    /// `GITHUB_ACCESS_TOKEN` is preferred; `PUBLIC_GITHUB_ACCESS_TOKEN` is
    /// accepted as an alias for deployments that only expose the public
    /// variable. The AI key comes from `GOOGLE_AI_API_KEY`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.github_token = env::var("GITHUB_ACCESS_TOKEN")
            .or_else(|_| env::var("PUBLIC_GITHUB_ACCESS_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());
        config.ai_api_key = env::var("GOOGLE_AI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Ok(username) = env::var("DEVFUSED_USERNAME") {
            if !username.trim().is_empty() {
                config.username = username;
            }
        }
        config
    }
}
