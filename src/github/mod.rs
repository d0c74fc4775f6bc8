//! Authenticated client for the GitHub REST API.
//!
//! Listing failures are fatal to the whole projects flow, so they propagate.
//! Per-repository lookups (README, languages, contents) degrade to empty
//! values instead, because one repository's transient failure must never
//! block display of the others.

pub mod types;

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::text::decode_base64_content;

pub use types::{
    ApiHealth, HealthStatus, Profile, RateLimitEnvelope, ReadmePayload, RepoContentEntry,
    RepositoryRecord,
};

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

pub struct GitHubClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
    readme_timeout: Duration,
}

impl GitHubClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static("devfused"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base: config.github_api_base.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
            readme_timeout: config.readme_timeout,
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.get(format!("{}{}", self.base, path));
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }

    /// Read the body and deserialize, reporting the JSON path on mismatch.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> AppResult<T> {
        let body = response.text().await?;
        let jd = &mut serde_json::Deserializer::from_str(&body);
        serde_path_to_error::deserialize(jd)
            .map_err(|e| AppError::Parse(format!("{what}: {} at {}", e.inner(), e.path())))
    }

    async fn expect_success(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::upstream(status.as_u16(), body))
    }

    /// List the authenticated user's repositories, newest activity first,
    /// with forks filtered out. Requires a token: `/user/repos` is the only
    /// endpoint that also sees private repositories, and GitHub rejects it
    /// unauthenticated.
    #[instrument(name = "Listing repositories", level = "debug", skip(self))]
    pub async fn list_repositories(&self) -> AppResult<Vec<RepositoryRecord>> {
        if self.token.is_none() {
            return Err(AppError::Config(
                "GitHub token is missing. Set GITHUB_ACCESS_TOKEN (or \
                 PUBLIC_GITHUB_ACCESS_TOKEN) with repo or public_repo scope to \
                 list repositories from /user/repos."
                    .to_string(),
            ));
        }
        let response = self
            .get("/user/repos?per_page=100&sort=updated&direction=desc&type=owner")
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        let repos: Vec<RepositoryRecord> = Self::read_json(response, "repository listing").await?;
        Ok(repos.into_iter().filter(|r| !r.fork).collect())
    }

    /// Public repository listing for any user. Token optional.
    #[instrument(name = "Listing public repositories", level = "debug", skip(self))]
    pub async fn list_user_repositories(
        &self,
        username: &str,
    ) -> AppResult<Vec<RepositoryRecord>> {
        let response = self
            .get(&format!(
                "/users/{username}/repos?per_page=100&sort=updated&direction=desc"
            ))
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        let repos: Vec<RepositoryRecord> = Self::read_json(response, "repository listing").await?;
        Ok(repos.into_iter().filter(|r| !r.fork).collect())
    }

    pub async fn fetch_profile(&self, username: &str) -> AppResult<Profile> {
        let response = self.get(&format!("/users/{username}")).send().await?;
        let response = Self::expect_success(response).await?;
        Self::read_json(response, "user profile").await
    }

    /// Profile and repository listing, fetched concurrently.
    pub async fn fetch_portfolio(
        &self,
        username: &str,
    ) -> AppResult<(Profile, Vec<RepositoryRecord>)> {
        tokio::try_join!(
            self.fetch_profile(username),
            self.list_user_repositories(username)
        )
    }

    /// Fetch and decode a repository README.
    ///
    /// README absence is an expected, non-fatal condition: 404, timeout, and
    /// every other failure all come back as the empty string, logged here and
    /// not propagated.
    #[instrument(name = "Fetching README", level = "debug", skip(self))]
    pub async fn fetch_readme(&self, owner: &str, repo: &str) -> String {
        match tokio::time::timeout(self.readme_timeout, self.readme_inner(owner, repo)).await {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                warn!("README fetch for {owner}/{repo} failed: {e}");
                String::new()
            }
            Err(_) => {
                let e = AppError::timeout(format!("README for {owner}/{repo}"), self.readme_timeout);
                warn!("{e}");
                String::new()
            }
        }
    }

    async fn readme_inner(&self, owner: &str, repo: &str) -> AppResult<String> {
        let response = self
            .get(&format!("/repos/{owner}/{repo}/readme"))
            .header(ACCEPT, ACCEPT_RAW)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No README in {owner}/{repo}");
            return Ok(String::new());
        }
        let response = Self::expect_success(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.text().await?;
        if content_type.contains("application/json") {
            // Some proxies ignore the raw accept header and hand back the
            // JSON envelope instead.
            let payload: ReadmePayload = {
                let jd = &mut serde_json::Deserializer::from_str(&body);
                serde_path_to_error::deserialize(jd)
                    .map_err(|e| AppError::Parse(format!("README payload: {}", e.inner())))?
            };
            if payload.encoding == "base64" && !payload.content.is_empty() {
                decode_base64_content(&payload.content)
            } else {
                warn!(
                    "README for {owner}/{repo} came back as JSON without base64 content, ignoring"
                );
                Ok(String::new())
            }
        } else {
            Ok(body)
        }
    }

    /// Detected languages, most prominent first. Empty on any failure.
    #[instrument(name = "Fetching languages", level = "debug", skip(self))]
    pub async fn fetch_languages(&self, owner: &str, repo: &str) -> Vec<String> {
        let result: AppResult<BTreeMap<String, u64>> = async {
            let response = self
                .get(&format!("/repos/{owner}/{repo}/languages"))
                .send()
                .await?;
            let response = Self::expect_success(response).await?;
            Self::read_json(response, "language listing").await
        }
        .await;
        match result {
            Ok(by_bytes) => {
                let mut entries: Vec<(String, u64)> = by_bytes.into_iter().collect();
                entries.sort_by(|a, b| b.1.cmp(&a.1));
                entries.into_iter().map(|(lang, _)| lang).collect()
            }
            Err(e) => {
                warn!("Language fetch for {owner}/{repo} failed: {e}");
                Vec::new()
            }
        }
    }

    /// Top-level file and directory names. Empty on any failure.
    #[instrument(name = "Fetching root contents", level = "debug", skip(self))]
    pub async fn fetch_root_contents(&self, owner: &str, repo: &str) -> Vec<String> {
        let result: AppResult<Vec<RepoContentEntry>> = async {
            let response = self
                .get(&format!("/repos/{owner}/{repo}/contents"))
                .send()
                .await?;
            let response = Self::expect_success(response).await?;
            Self::read_json(response, "root contents").await
        }
        .await;
        match result {
            Ok(entries) => entries.into_iter().map(|e| e.name).collect(),
            Err(e) => {
                warn!("Root contents fetch for {owner}/{repo} failed: {e}");
                Vec::new()
            }
        }
    }

    /// Single-repository lookup. `None` when the repository does not exist.
    pub async fn fetch_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> AppResult<Option<RepositoryRecord>> {
        let response = self.get(&format!("/repos/{owner}/{repo}")).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::expect_success(response).await?;
        Ok(Some(Self::read_json(response, "repository").await?))
    }

    /// Whether a bearer token is configured.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Probe `/rate_limit` and report a coarse health status.
    #[instrument(name = "Checking GitHub API health", level = "debug", skip(self))]
    pub async fn check_health(&self) -> ApiHealth {
        let result: AppResult<RateLimitEnvelope> = async {
            let response = self.get("/rate_limit").send().await?;
            let response = Self::expect_success(response).await?;
            Self::read_json(response, "rate limit").await
        }
        .await;
        match result {
            Ok(envelope) => ApiHealth {
                status: HealthStatus::Healthy,
                details: format!(
                    "Rate limit: {}/{}",
                    envelope.rate.remaining, envelope.rate.limit
                ),
            },
            Err(AppError::Upstream { status, .. }) => ApiHealth {
                status: HealthStatus::Degraded,
                details: format!("API responded with status {status}"),
            },
            Err(e) => ApiHealth {
                status: HealthStatus::Down,
                details: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_without_token_is_a_config_error() {
        // No network involved: the credential check happens first.
        let client = GitHubClient::new(&AppConfig::default()).unwrap();
        assert!(!client.has_token());
        match client.list_repositories().await {
            Err(AppError::Config(msg)) => assert!(msg.contains("GITHUB_ACCESS_TOKEN")),
            other => panic!("expected a config error, got {other:?}"),
        }
    }
}
