//! Assembly of the chat context document: the rendered GitHub portfolio
//! section and its combination with the resume section.

use std::collections::HashMap;
use std::time::Duration;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::warn;

use crate::error::AppError;
use crate::github::{GitHubClient, Profile, RepositoryRecord};

/// Placeholder used whenever the portfolio section cannot be assembled.
pub const GITHUB_UNAVAILABLE: &str =
    "## GitHub Profile\n\n*GitHub profile data is currently unavailable.*";

/// Repository cards rendered into the context document.
const MAX_REPO_CARDS: usize = 15;
/// Rows in the language-distribution table.
const MAX_LANGUAGE_ROWS: usize = 8;

const CARD_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");

fn card_date(date: OffsetDateTime) -> String {
    date.format(CARD_DATE).unwrap_or_else(|_| date.to_string())
}

/// Render the profile card, the top repository cards, and the language
/// distribution table as one markdown section.
pub fn render_portfolio(profile: &Profile, repositories: &[RepositoryRecord]) -> String {
    let mut repos: Vec<&RepositoryRecord> = repositories.iter().collect();
    // Most-starred first, recent activity breaking ties.
    repos.sort_by(|a, b| {
        b.stargazers_count
            .cmp(&a.stargazers_count)
            .then(b.updated_at.cmp(&a.updated_at))
    });

    let display_name = profile.name.as_deref().unwrap_or(&profile.login);
    let mut out = format!("## GitHub Profile: {display_name}\n\n");
    out.push_str(&format!(
        "**Location:** {}\n",
        profile.location.as_deref().unwrap_or("Not specified")
    ));
    out.push_str(&format!(
        "**Bio:** {}\n",
        profile.bio.as_deref().unwrap_or("No bio available")
    ));
    out.push_str(&format!("**Public Repositories:** {}\n", profile.public_repos));
    out.push_str(&format!(
        "**Network:** {} followers, {} following\n",
        profile.followers, profile.following
    ));
    out.push_str(&format!(
        "**Profile:** [{}]({})\n\n---\n\n## Featured Projects\n\n",
        profile.login, profile.html_url
    ));

    for (index, repo) in repos.iter().take(MAX_REPO_CARDS).enumerate() {
        out.push_str(&format!("### {}. {}\n\n", index + 1, repo.name));
        match repo.description.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(description) => out.push_str(&format!("> {description}\n\n")),
            None => out.push_str("*No description provided*\n\n"),
        }
        out.push_str(&format!(
            "**Language:** {}\n",
            repo.language.as_deref().unwrap_or("Not specified")
        ));
        out.push_str(&format!(
            "**Stars:** {} | **Forks:** {}\n",
            repo.stargazers_count, repo.forks_count
        ));
        out.push_str(&format!("**Last Updated:** {}\n", card_date(repo.updated_at)));
        if !repo.topics.is_empty() {
            out.push_str(&format!("**Topics:** {}\n", repo.topics.join(", ")));
        }
        out.push_str(&format!("**Repository:** {}", repo.html_url));
        if let Some(homepage) = repo.homepage.as_deref().filter(|h| !h.is_empty()) {
            out.push_str(&format!(" | **Live Demo:** {homepage}"));
        }
        out.push_str("\n\n---\n\n");
    }

    // Language distribution over the full listing, not just the cards.
    let mut by_language: HashMap<&str, usize> = HashMap::new();
    for repo in repositories {
        *by_language
            .entry(repo.language.as_deref().unwrap_or("Other"))
            .or_default() += 1;
    }
    let mut rows: Vec<(&str, usize)> = by_language.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    if !rows.is_empty() && !repositories.is_empty() {
        out.push_str("## Technology Distribution\n\n");
        out.push_str("| Language | Projects | Percentage |\n");
        out.push_str("|----------|----------|------------|\n");
        for (language, count) in rows.into_iter().take(MAX_LANGUAGE_ROWS) {
            let percentage = (count as f64 / repositories.len() as f64) * 100.0;
            out.push_str(&format!("| **{language}** | {count} | {percentage:.1}% |\n"));
        }
        out.push_str("\n---\n\n");
    }

    out
}

/// Fetch and render the portfolio section under a deadline.
///
/// This feeds the chat pipeline, where GitHub being down must degrade the
/// answer, not fail it, so every failure collapses to a fixed placeholder.
pub async fn github_portfolio_context(
    github: &GitHubClient,
    username: &str,
    budget: Duration,
) -> String {
    match tokio::time::timeout(budget, github.fetch_portfolio(username)).await {
        Ok(Ok((profile, repos))) => render_portfolio(&profile, &repos),
        Ok(Err(e)) => {
            warn!("Portfolio context unavailable: {e}");
            GITHUB_UNAVAILABLE.to_string()
        }
        Err(_) => {
            let e = AppError::timeout("GitHub portfolio context", budget);
            warn!("{e}");
            GITHUB_UNAVAILABLE.to_string()
        }
    }
}

/// Combine the resume section and the portfolio section into the document
/// handed to the chat model. Built fresh per question; never cached.
pub fn chat_context(resume_markdown: &str, portfolio_markdown: &str) -> String {
    format!(
        "# Complete Professional Profile\n\n\
         ## Resume\n\n{resume_markdown}\n\n\
         ## GitHub Portfolio & Projects\n\n{portfolio_markdown}\n\n\
         ---\n\n\
         *This context includes both resume details and the GitHub profile \
         with all projects.*"
    )
}
