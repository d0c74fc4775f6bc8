//! The project-enrichment pipeline: raw repository records in, display-ready
//! projects out.
//!
//! Each repository runs independently; the fan-out join is all-settled in
//! spirit — nothing a single repository does can abort its peers, and the
//! output always carries exactly one project per input repository, in input
//! order. The AI is consulted only when a repository's own metadata is too
//! thin to display.

use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::ai::AiClient;
use crate::ai::flows::{self, ReadmeSummaryInput, is_unusable_summary};
use crate::ai::query::AiSummaryResult;
use crate::error::{AppError, AppResult};
use crate::github::{GitHubClient, RepositoryRecord};
use crate::techstack::{TechLexicon, push_unique};
use crate::text::{strip_markdown, truncate_words};

/// Shortest description worth displaying as-is.
pub const MEANINGFUL_MIN_LEN: usize = 10;
/// Fewer merged tech entries than this escalates to the AI.
pub const ESCALATION_MIN_TECH: usize = 2;
/// Hard cap on the emitted tech-stack list.
pub const MAX_TECH_STACK: usize = 12;
/// Hard cap on the emitted description, in whitespace-delimited words.
pub const DESCRIPTION_WORD_BUDGET: usize = 50;
/// Last-resort tech-stack entry when every other signal failed.
pub const TECH_STACK_PLACEHOLDER: &str = "Software Development";

/// Author-supplied descriptions containing any of these are treated as
/// absent.
const PLACEHOLDER_PHRASES: &[&str] = &[
    "no description",
    "todo",
    "coming soon",
    "work in progress",
    "wip",
    "placeholder",
    "description here",
];

/// A repository record plus the two derived display fields.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedProject {
    #[serde(flatten)]
    pub repo: RepositoryRecord,
    #[serde(rename = "summaryDescription")]
    pub summary_description: String,
    #[serde(rename = "summaryTechStack")]
    pub summary_tech_stack: Vec<String>,
    #[serde(rename = "usedAI")]
    pub used_ai: bool,
}

/// Per-repository data source. `GitHubClient` in production, a fake in tests.
/// All three lookups are non-fatal by contract and return empty on failure.
pub trait RepositoryHost {
    async fn readme(&self, owner: &str, repo: &str) -> String;
    async fn languages(&self, owner: &str, repo: &str) -> Vec<String>;
    async fn root_contents(&self, owner: &str, repo: &str) -> Vec<String>;
}

impl RepositoryHost for GitHubClient {
    async fn readme(&self, owner: &str, repo: &str) -> String {
        self.fetch_readme(owner, repo).await
    }

    async fn languages(&self, owner: &str, repo: &str) -> Vec<String> {
        self.fetch_languages(owner, repo).await
    }

    async fn root_contents(&self, owner: &str, repo: &str) -> Vec<String> {
        self.fetch_root_contents(owner, repo).await
    }
}

/// Model seam for the pipeline's two escalation calls.
pub trait Summarizer {
    async fn summarize_readme(&self, input: &ReadmeSummaryInput<'_>) -> AppResult<AiSummaryResult>;
    async fn extract_tech_stack(&self, name: &str, description: &str) -> AppResult<Vec<String>>;
}

impl Summarizer for AiClient {
    async fn summarize_readme(&self, input: &ReadmeSummaryInput<'_>) -> AppResult<AiSummaryResult> {
        flows::summarize_readme(self, input).await
    }

    async fn extract_tech_stack(&self, name: &str, description: &str) -> AppResult<Vec<String>> {
        flows::extract_tech_stack_from_code(self, name, description).await
    }
}

/// Running without an AI key degrades every escalation into its fallback
/// instead of failing the pipeline.
impl Summarizer for Option<AiClient> {
    async fn summarize_readme(&self, input: &ReadmeSummaryInput<'_>) -> AppResult<AiSummaryResult> {
        match self {
            Some(client) => flows::summarize_readme(client, input).await,
            None => Err(AppError::Config(
                "AI API key is missing; summarization disabled".to_string(),
            )),
        }
    }

    async fn extract_tech_stack(&self, name: &str, description: &str) -> AppResult<Vec<String>> {
        match self {
            Some(client) => flows::extract_tech_stack_from_code(client, name, description).await,
            None => Err(AppError::Config(
                "AI API key is missing; tech extraction disabled".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Deadline for each individual AI call.
    pub summary_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            summary_timeout: Duration::from_secs(20),
        }
    }
}

/// A description is meaningful iff it is present, at least
/// [`MEANINGFUL_MIN_LEN`] characters once trimmed, and free of placeholder
/// phrases.
pub fn is_meaningful_description(description: Option<&str>) -> bool {
    let Some(description) = description else {
        return false;
    };
    let trimmed = description.trim();
    if trimmed.chars().count() < MEANINGFUL_MIN_LEN {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !PLACEHOLDER_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Description of last resort, built from repository metadata alone.
fn synthesize_description(repo: &RepositoryRecord) -> String {
    let language = repo.language.as_deref().unwrap_or("software");
    match repo.stargazers_count {
        0 => format!(
            "{} is a {language} project showcasing modern development practices.",
            repo.name
        ),
        1 => format!(
            "{} is a {language} project with 1 star showcasing modern development practices.",
            repo.name
        ),
        stars => format!(
            "{} is a {language} project with {stars} stars showcasing modern development practices.",
            repo.name
        ),
    }
}

/// Apply the output invariants and wrap up: stripped, word-capped, non-empty
/// description; non-empty tech stack of at most [`MAX_TECH_STACK`] entries.
fn finalize(
    repo: RepositoryRecord,
    description: String,
    mut stack: Vec<String>,
    used_ai: bool,
) -> EnrichedProject {
    let mut description = truncate_words(&strip_markdown(&description), DESCRIPTION_WORD_BUDGET);
    if description.trim().is_empty() {
        description = truncate_words(&synthesize_description(&repo), DESCRIPTION_WORD_BUDGET);
    }
    stack.truncate(MAX_TECH_STACK);
    if stack.is_empty() {
        stack.push(TECH_STACK_PLACEHOLDER.to_string());
    }
    EnrichedProject {
        repo,
        summary_description: description,
        summary_tech_stack: stack,
        used_ai,
    }
}

/// Minimal record built purely from the original repository, used when a
/// repository must be emitted without any enrichment signals.
pub fn fallback_project(repo: RepositoryRecord) -> EnrichedProject {
    let description = repo
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| synthesize_description(&repo));
    let mut stack: Vec<String> = Vec::new();
    for topic in &repo.topics {
        push_unique(&mut stack, topic);
    }
    if stack.is_empty() {
        if let Some(language) = &repo.language {
            push_unique(&mut stack, language);
        }
    }
    finalize(repo, description, stack, false)
}

/// Enrich one repository. Infallible: every failure inside degrades to the
/// next level of the fallback chain.
#[instrument(name = "Enriching project", level = "debug", skip_all, fields(repo = %repo.name))]
pub async fn enrich_project<H: RepositoryHost, S: Summarizer>(
    host: &H,
    ai: &S,
    lexicon: &TechLexicon,
    options: &PipelineOptions,
    repo: RepositoryRecord,
) -> EnrichedProject {
    let owner = repo.owner.login.clone();
    let name = repo.name.clone();

    // Step 1: a meaningful description short-circuits straight to emission
    // (after signal gathering, which also feeds the escalation decision).
    let meaningful = is_meaningful_description(repo.description.as_deref());
    let mut description = if meaningful {
        repo.description.as_deref().unwrap_or_default().trim().to_string()
    } else {
        String::new()
    };

    // Step 2: gather tech signals concurrently, then merge topics-first.
    let (languages, files) = tokio::join!(
        host.languages(&owner, &name),
        host.root_contents(&owner, &name)
    );
    let derived = lexicon.infer_tech_stack_from_files(&files, &languages);
    let mut stack: Vec<String> = Vec::new();
    for topic in &repo.topics {
        push_unique(&mut stack, topic);
    }
    for tech in &derived {
        push_unique(&mut stack, tech);
    }

    // Step 3: escalate only when the defaults are too thin.
    let mut used_ai = false;
    if !meaningful || stack.len() < ESCALATION_MIN_TECH {
        // Step 4: README + AI summary. Failure keeps the working values.
        let readme = host.readme(&owner, &name).await;
        let input = ReadmeSummaryInput {
            name: &name,
            description: repo.description.as_deref(),
            language: repo.language.as_deref(),
            topics: &repo.topics,
            detected_tech: &stack,
            file_names: &files,
            readme: &readme,
        };
        let outcome = tokio::time::timeout(options.summary_timeout, ai.summarize_readme(&input)).await;
        match outcome {
            Ok(Ok(result)) if !is_unusable_summary(&result.summary) => {
                description = result.summary.trim().to_string();
                used_ai = true;
                for tech in &result.tech_stack {
                    push_unique(&mut stack, tech);
                }
                // Fallback signal only: known tech names mentioned in the
                // summary or the original description.
                let scanned = format!(
                    "{description} {}",
                    repo.description.as_deref().unwrap_or_default()
                );
                for keyword in lexicon.extract_keywords_from_text(&scanned) {
                    push_unique(&mut stack, &keyword);
                }
            }
            Ok(Ok(_)) => {
                warn!("AI summary for {name} was empty or a refusal, keeping working values");
            }
            Ok(Err(e)) => {
                warn!("AI summarization for {name} failed: {e}");
            }
            Err(_) => {
                let e = AppError::timeout(format!("AI summary for {name}"), options.summary_timeout);
                warn!("{e}");
            }
        }
    }

    // Step 5: tech-stack floor. Primary language first, one last AI guess
    // only when there is no language either.
    if stack.is_empty() {
        if let Some(language) = repo.language.as_deref() {
            push_unique(&mut stack, language);
        } else {
            let attempt = tokio::time::timeout(
                options.summary_timeout,
                ai.extract_tech_stack(&name, repo.description.as_deref().unwrap_or("")),
            )
            .await;
            match attempt {
                Ok(Ok(list)) => {
                    for tech in &list {
                        push_unique(&mut stack, tech);
                    }
                }
                Ok(Err(e)) => warn!("Tech extraction for {name} failed: {e}"),
                Err(_) => {
                    let e = AppError::timeout(
                        format!("tech extraction for {name}"),
                        options.summary_timeout,
                    );
                    warn!("{e}");
                }
            }
            if stack.is_empty() {
                stack.push(TECH_STACK_PLACEHOLDER.to_string());
            }
        }
    }

    // Step 6: description floor.
    if description.trim().chars().count() < MEANINGFUL_MIN_LEN {
        description = synthesize_description(&repo);
    }

    debug!(
        "Enriched {name}: {} tech entries, AI used: {used_ai}",
        stack.len()
    );
    // Step 7: emit under the output invariants.
    finalize(repo, description, stack, used_ai)
}

/// Enrich every repository concurrently and independently.
///
/// The join waits for all tasks; output order matches input order, one
/// project per repository. `enrich_project` cannot fail, so no task can take
/// its peers down with it.
#[instrument(name = "Enriching projects", level = "info", skip_all, fields(count = repos.len()))]
pub async fn enrich_all<H: RepositoryHost, S: Summarizer>(
    host: &H,
    ai: &S,
    lexicon: &TechLexicon,
    options: &PipelineOptions,
    repos: Vec<RepositoryRecord>,
) -> Vec<EnrichedProject> {
    let tasks = repos
        .into_iter()
        .map(|repo| enrich_project(host, ai, lexicon, options, repo));
    join_all(tasks).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use time::macros::datetime;

    use super::*;
    use crate::github::types::RepoOwner;

    fn repo(
        name: &str,
        description: Option<&str>,
        language: Option<&str>,
        topics: &[&str],
        stars: u64,
    ) -> RepositoryRecord {
        RepositoryRecord {
            id: 7,
            name: name.to_string(),
            owner: RepoOwner {
                login: "the-sauravkumar".to_string(),
                avatar_url: None,
            },
            description: description.map(str::to_string),
            language: language.map(str::to_string),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            stargazers_count: stars,
            forks_count: 0,
            watchers_count: stars,
            created_at: datetime!(2023-01-01 00:00:00 UTC),
            updated_at: datetime!(2024-06-01 12:00:00 UTC),
            pushed_at: None,
            html_url: format!("https://github.com/the-sauravkumar/{name}"),
            homepage: None,
            fork: false,
        }
    }

    struct FakeHost {
        readme: String,
        languages: Vec<String>,
        files: Vec<String>,
    }

    impl FakeHost {
        fn empty() -> Self {
            Self {
                readme: String::new(),
                languages: vec![],
                files: vec![],
            }
        }
    }

    impl RepositoryHost for FakeHost {
        async fn readme(&self, _owner: &str, _repo: &str) -> String {
            self.readme.clone()
        }

        async fn languages(&self, _owner: &str, _repo: &str) -> Vec<String> {
            self.languages.clone()
        }

        async fn root_contents(&self, _owner: &str, _repo: &str) -> Vec<String> {
            self.files.clone()
        }
    }

    enum AiBehavior {
        Succeed { summary: String, tech: Vec<String> },
        Sentinel,
        Fail,
    }

    struct FakeAi {
        behavior: AiBehavior,
        extracted: Option<Vec<String>>,
        summarize_calls: AtomicUsize,
        extract_calls: AtomicUsize,
    }

    impl FakeAi {
        fn new(behavior: AiBehavior) -> Self {
            Self {
                behavior,
                extracted: None,
                summarize_calls: AtomicUsize::new(0),
                extract_calls: AtomicUsize::new(0),
            }
        }
    }

    impl Summarizer for FakeAi {
        async fn summarize_readme(
            &self,
            _input: &ReadmeSummaryInput<'_>,
        ) -> AppResult<AiSummaryResult> {
            self.summarize_calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                AiBehavior::Succeed { summary, tech } => Ok(AiSummaryResult {
                    summary: summary.clone(),
                    tech_stack: tech.clone(),
                }),
                AiBehavior::Sentinel => Ok(AiSummaryResult {
                    summary: "Could not summarize README content.".to_string(),
                    tech_stack: vec!["ShouldNotAppear".to_string()],
                }),
                AiBehavior::Fail => Err(AppError::upstream(503, "model overloaded")),
            }
        }

        async fn extract_tech_stack(
            &self,
            _name: &str,
            _description: &str,
        ) -> AppResult<Vec<String>> {
            self.extract_calls.fetch_add(1, Ordering::SeqCst);
            match &self.extracted {
                Some(list) => Ok(list.clone()),
                None => Err(AppError::upstream(503, "model overloaded")),
            }
        }
    }

    fn options() -> PipelineOptions {
        PipelineOptions::default()
    }

    #[test]
    fn meaningful_check_needs_length_and_no_placeholders() {
        assert!(is_meaningful_description(Some(
            "A CLI tool for parsing logs and generating reports"
        )));
        assert!(!is_meaningful_description(None));
        assert!(!is_meaningful_description(Some("   short   ")));
        assert!(!is_meaningful_description(Some("This is a WIP project")));
        assert!(!is_meaningful_description(Some("TODO: write a description")));
        assert!(!is_meaningful_description(Some("coming soon to a repo near you")));
    }

    #[tokio::test]
    async fn meaningful_description_skips_the_ai() {
        let host = FakeHost {
            readme: "# logs\nparses logs".to_string(),
            languages: vec!["Go".to_string()],
            files: vec!["go.mod".to_string(), "main.go".to_string()],
        };
        let ai = FakeAi::new(AiBehavior::Succeed {
            summary: "should never be used".to_string(),
            tech: vec![],
        });
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo(
                "logparse",
                Some("A CLI tool for parsing logs and generating reports"),
                Some("Go"),
                &["cli"],
                3,
            ),
        )
        .await;

        assert_eq!(ai.summarize_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            project.summary_description,
            "A CLI tool for parsing logs and generating reports"
        );
        assert_eq!(project.summary_tech_stack, vec!["cli", "Go"]);
        assert!(!project.used_ai);
    }

    #[tokio::test]
    async fn synthesizes_description_and_language_floor_when_ai_fails() {
        let host = FakeHost::empty();
        let ai = FakeAi::new(AiBehavior::Fail);
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo("foo", Some(""), Some("Python"), &[], 0),
        )
        .await;

        assert_eq!(ai.summarize_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ai.extract_calls.load(Ordering::SeqCst), 0);
        assert!(project.summary_description.contains("foo"));
        assert!(project.summary_description.contains("Python"));
        assert_eq!(project.summary_tech_stack, vec!["Python"]);
    }

    #[tokio::test]
    async fn star_count_appears_in_the_synthesized_description() {
        let host = FakeHost::empty();
        let ai = FakeAi::new(AiBehavior::Fail);
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo("foo", None, Some("Python"), &[], 5),
        )
        .await;
        assert!(project.summary_description.contains("with 5 stars"));
    }

    #[tokio::test]
    async fn ai_summary_overwrites_description_and_merges_tech() {
        let host = FakeHost {
            readme: "# fast async thing".to_string(),
            languages: vec!["Rust".to_string()],
            files: vec![],
        };
        let ai = FakeAi::new(AiBehavior::Succeed {
            summary: "An async runtime experiment for highly concurrent workloads.".to_string(),
            tech: vec!["Rust".to_string(), "Tokio".to_string()],
        });
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo("whirl", Some("wip"), Some("Rust"), &["async"], 0),
        )
        .await;

        assert!(project.used_ai);
        assert_eq!(
            project.summary_description,
            "An async runtime experiment for highly concurrent workloads."
        );
        assert_eq!(project.summary_tech_stack, vec!["async", "Rust", "Tokio"]);
    }

    #[tokio::test]
    async fn tech_names_mentioned_in_the_summary_are_picked_up() {
        let host = FakeHost::empty();
        let ai = FakeAi::new(AiBehavior::Succeed {
            summary: "A Django dashboard backed by PostgreSQL for tracking lab inventory."
                .to_string(),
            tech: vec!["Python".to_string()],
        });
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo("labtrack", None, Some("Python"), &[], 0),
        )
        .await;

        assert_eq!(project.summary_tech_stack, vec!["Python", "Django", "PostgreSQL"]);
    }

    #[tokio::test]
    async fn sentinel_summary_keeps_working_values() {
        let host = FakeHost::empty();
        let ai = FakeAi::new(AiBehavior::Sentinel);
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo("ghost", None, Some("C++"), &[], 0),
        )
        .await;

        assert!(!project.used_ai);
        assert!(!project.summary_description.contains("Could not summarize"));
        assert!(project.summary_description.contains("ghost"));
        assert!(!project.summary_tech_stack.contains(&"ShouldNotAppear".to_string()));
        assert_eq!(project.summary_tech_stack, vec!["C++"]);
    }

    #[tokio::test]
    async fn placeholder_floor_when_nothing_is_known() {
        let host = FakeHost::empty();
        let mut ai = FakeAi::new(AiBehavior::Fail);
        ai.extracted = None; // extraction fails too
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo("mystery", None, None, &[], 0),
        )
        .await;

        assert_eq!(ai.extract_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            project.summary_tech_stack,
            vec![TECH_STACK_PLACEHOLDER.to_string()]
        );
        assert!(project.summary_description.contains("software"));
    }

    #[tokio::test]
    async fn extracted_tech_fills_the_floor_when_language_is_missing() {
        let host = FakeHost::empty();
        let mut ai = FakeAi::new(AiBehavior::Fail);
        ai.extracted = Some(vec!["Solidity".to_string()]);
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo("chain-votes", None, None, &[], 0),
        )
        .await;
        assert_eq!(project.summary_tech_stack, vec!["Solidity"]);
    }

    #[tokio::test]
    async fn output_caps_are_enforced() {
        let long_summary = (0..120).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let many_tech: Vec<String> = (0..20).map(|i| format!("Tech{i}")).collect();
        let host = FakeHost::empty();
        let ai = FakeAi::new(AiBehavior::Succeed {
            summary: long_summary,
            tech: many_tech,
        });
        let project = enrich_project(
            &host,
            &ai,
            &TechLexicon::default(),
            &options(),
            repo("bloated", None, None, &[], 0),
        )
        .await;

        assert!(project.summary_tech_stack.len() <= MAX_TECH_STACK);
        assert!(
            project.summary_description.split_whitespace().count() <= DESCRIPTION_WORD_BUDGET
        );
    }

    #[tokio::test]
    async fn pipeline_is_idempotent_for_identical_upstream_responses() {
        let host = FakeHost {
            readme: "readme".to_string(),
            languages: vec!["Python".to_string()],
            files: vec!["requirements.txt".to_string()],
        };
        let ai = FakeAi::new(AiBehavior::Succeed {
            summary: "A toolkit for 2D shape analysis.".to_string(),
            tech: vec!["Python".to_string(), "NumPy".to_string()],
        });
        let input = repo("curveshapenet", None, Some("Python"), &["geometry"], 2);
        let lexicon = TechLexicon::default();

        let first = enrich_project(&host, &ai, &lexicon, &options(), input.clone()).await;
        let second = enrich_project(&host, &ai, &lexicon, &options(), input).await;

        assert_eq!(first.summary_description, second.summary_description);
        assert_eq!(first.summary_tech_stack, second.summary_tech_stack);
    }

    #[tokio::test]
    async fn enrich_all_preserves_order_and_count() {
        let host = FakeHost::empty();
        let ai = FakeAi::new(AiBehavior::Fail);
        let repos = vec![
            repo("alpha", Some("A fine alpha-stage experiment"), Some("Rust"), &[], 0),
            repo("beta", None, Some("Go"), &[], 0),
            repo("gamma", None, None, &[], 0),
        ];
        let projects = enrich_all(&host, &ai, &TechLexicon::default(), &options(), repos).await;
        let names: Vec<&str> = projects.iter().map(|p| p.repo.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        for project in &projects {
            assert!(!project.summary_description.trim().is_empty());
            assert!(!project.summary_tech_stack.is_empty());
        }
    }

    #[test]
    fn fallback_project_never_comes_up_empty() {
        let project = fallback_project(repo("bare", None, None, &[], 0));
        assert!(!project.summary_description.is_empty());
        assert_eq!(
            project.summary_tech_stack,
            vec![TECH_STACK_PLACEHOLDER.to_string()]
        );

        let with_topics = fallback_project(repo("tagged", None, Some("Go"), &["cli", "tools"], 0));
        assert_eq!(with_topics.summary_tech_stack, vec!["cli", "tools"]);
    }
}
