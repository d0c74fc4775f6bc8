//! Typed views of the GitHub API payloads the engine consumes.
//!
//! Every consumed response shape gets an explicit record here, validated on
//! ingress; fields the pipeline does not use are simply dropped by serde.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Repository owner as embedded in repository payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One GitHub repository as returned by the listing and lookup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: u64,
    pub name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    // Null for repositories that have never been pushed to.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub pushed_at: Option<OffsetDateTime>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub fork: bool,
}

/// Owner profile from `GET /users/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    pub avatar_url: String,
    pub html_url: String,
}

/// JSON-wrapped README body from `GET /repos/{o}/{r}/readme` when the server
/// ignores the raw accept header.
#[derive(Debug, Deserialize)]
pub struct ReadmePayload {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

/// One entry of a repository's root listing. Only the name matters.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoContentEntry {
    pub name: String,
}

/// `GET /rate_limit` envelope.
#[derive(Debug, Deserialize)]
pub struct RateLimitEnvelope {
    pub rate: RateLimitWindow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitWindow {
    pub limit: u64,
    pub remaining: u64,
}

/// Outcome of the rate-limit health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiHealth {
    pub status: HealthStatus,
    pub details: String,
}
