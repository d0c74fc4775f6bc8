use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{ArgAction, Args, ColorChoice, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::aot::{Generator, Shell, generate};
use clap_complete_nushell::Nushell;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::{info, warn};

use crate::ai::AiClient;
use crate::chat;
use crate::config::AppConfig;
use crate::context::{chat_context, github_portfolio_context};
use crate::enrich::{PipelineOptions, enrich_all};
use crate::error::AppResult;
use crate::github::GitHubClient;
use crate::resume::ResumeData;
use crate::techstack::TechLexicon;

const STYLES: Styles = Styles::styled()
    .header(Style::new().bold())
    .usage(Style::new().bold())
    .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))))
    .literal(
        Style::new()
            .bold()
            .fg_color(Some(Color::Ansi(AnsiColor::Green))),
    )
    .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
    .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightRed))));

/// Long-form CLI description shown in `--help`.
const LONG_ABOUT: &str = "DevFused - Portfolio engine for GitHub projects and resume chat

This tool:
- fetches your repositories from the GitHub API
- enriches each one into a display-ready project record, asking a
  generative model for a summary only when the repository metadata is
  too thin to display
- answers questions about your resume and portfolio

Set GITHUB_ACCESS_TOKEN and GOOGLE_AI_API_KEY in your environment.";

/// DevFused - Portfolio engine for GitHub projects and resume chat.
#[derive(Parser, Debug, Clone)]
#[command(author, version, propagate_version = true, about, long_about = Some(LONG_ABOUT), styles = STYLES)]
pub struct Cli {
    /// Color choice for the output
    #[arg(long, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Subcommand to run
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Top-level commands supported by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Fetch your repositories and enrich them into project records
    ///
    /// Prints the enriched projects as JSON, ready for the site to render.
    Projects {
        #[command(flatten)]
        fetch: FetchArgs,
        /// Emit at most this many projects
        #[arg(short, long)]
        limit: Option<usize>,
        /// Skip the generative model even when a key is configured
        #[arg(long, default_value_t = false, action = ArgAction::SetTrue)]
        no_ai: bool,
        /// Deadline for each individual AI call (e.g. 20s, 1m)
        #[arg(long, default_value = "20s")]
        summary_timeout: String,
        #[command(flatten)]
        default: DefaultArgs,
        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    },

    /// Ask one question about the resume and portfolio
    Chat {
        /// The question to answer
        question: String,
        #[command(flatten)]
        resume: ResumeArgs,
        #[command(flatten)]
        default: DefaultArgs,
        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    },

    /// Print the combined context document handed to the chat model
    Context {
        #[command(flatten)]
        resume: ResumeArgs,
        #[command(flatten)]
        default: DefaultArgs,
        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    },

    /// Probe the GitHub API rate limit and report health
    Health {
        #[command(flatten)]
        default: DefaultArgs,
        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    },

    /// Generate shell completion for a given shell
    Completion {
        /// Output file to write the completion script to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The shell to generate the completion for
        #[arg(value_enum)]
        shell: CompletionShell,

        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    },
}

/// Options controlling which account is fetched.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// List another user's public repositories instead of /user/repos
    #[arg(short, long)]
    pub username: Option<String>,
}

/// Options locating the resume document.
#[derive(Args, Debug, Clone)]
pub struct ResumeArgs {
    /// Path to the resume JSON file
    #[arg(short, long, env = "DEVFUSED_RESUME", default_value = "data/resume.json")]
    pub resume: PathBuf,
}

/// Common options shared across commands.
#[derive(Args, Debug, Clone)]
pub struct DefaultArgs {
    /// Output file; prints to stdout when not provided
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl DefaultArgs {
    fn emit(&self, content: &str) -> AppResult<()> {
        match &self.output {
            Some(path) => {
                std::fs::write(path, content)?;
                info!("Wrote output to {}", path.display());
            }
            None => println!("{content}"),
        }
        Ok(())
    }
}

/// Supported completion targets for shell auto-completion.
#[derive(ValueEnum, Clone, Debug)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
    Nushell,
}

impl Display for CompletionShell {
    /// Render the canonical shell name string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompletionShell::Bash => "bash",
            CompletionShell::Zsh => "zsh",
            CompletionShell::Fish => "fish",
            CompletionShell::PowerShell => "powershell",
            CompletionShell::Elvish => "elvish",
            CompletionShell::Nushell => "nushell",
        };
        write!(f, "{}", s)
    }
}

impl Generator for &CompletionShell {
    fn generate(&self, cmd: &clap::builder::Command, buf: &mut dyn Write) {
        match self {
            CompletionShell::Bash => Shell::Bash.generate(cmd, buf),
            CompletionShell::Zsh => Shell::Zsh.generate(cmd, buf),
            CompletionShell::Fish => Shell::Fish.generate(cmd, buf),
            CompletionShell::PowerShell => Shell::PowerShell.generate(cmd, buf),
            CompletionShell::Elvish => Shell::Elvish.generate(cmd, buf),
            CompletionShell::Nushell => Nushell.generate(cmd, buf),
        }
    }

    fn file_name(&self, name: &str) -> String {
        match self {
            CompletionShell::Bash => Shell::Bash.file_name(name),
            CompletionShell::Zsh => Shell::Zsh.file_name(name),
            CompletionShell::Fish => Shell::Fish.file_name(name),
            CompletionShell::PowerShell => Shell::PowerShell.file_name(name),
            CompletionShell::Elvish => Shell::Elvish.file_name(name),
            CompletionShell::Nushell => Nushell.file_name(name),
        }
    }
}

/// Helper trait for accessing verbosity flags on commands.
pub trait GetVerbosity {
    fn get_verbosity(&self) -> &Verbosity<InfoLevel>;
}

impl GetVerbosity for Cmd {
    fn get_verbosity(&self) -> &Verbosity<InfoLevel> {
        match self {
            Cmd::Projects { verbosity, .. } => verbosity,
            Cmd::Chat { verbosity, .. } => verbosity,
            Cmd::Context { verbosity, .. } => verbosity,
            Cmd::Health { verbosity, .. } => verbosity,
            Cmd::Completion { verbosity, .. } => verbosity,
        }
    }
}

impl Cmd {
    /// Execute the chosen top-level command.
    #[tracing::instrument(name = "Running command", level = "info", skip_all)]
    pub async fn run(&self, config: AppConfig) -> AppResult<()> {
        match self {
            Cmd::Projects {
                fetch,
                limit,
                no_ai,
                summary_timeout,
                default,
                ..
            } => {
                let github = GitHubClient::new(&config)?;
                let repos = match &fetch.username {
                    Some(username) => github.list_user_repositories(username).await?,
                    None => github.list_repositories().await?,
                };
                info!("Fetched {} non-fork repositories", repos.len());

                let ai = if *no_ai {
                    None
                } else {
                    match AiClient::new(&config) {
                        Ok(client) => Some(client),
                        Err(e) => {
                            warn!("{e} Projects will use metadata-only fallbacks.");
                            None
                        }
                    }
                };
                let options = PipelineOptions {
                    summary_timeout: humantime::parse_duration(summary_timeout)?.min(
                        // A runaway flag should not stall the whole page build.
                        std::time::Duration::from_secs(300),
                    ),
                };
                let lexicon = TechLexicon::default();
                let mut projects = enrich_all(&github, &ai, &lexicon, &options, repos).await;
                if let Some(limit) = limit {
                    projects.truncate(*limit);
                }
                default.emit(&serde_json::to_string_pretty(&projects)?)
            }

            Cmd::Chat {
                question,
                resume,
                default,
                ..
            } => {
                let github = GitHubClient::new(&config)?;
                let ai = AiClient::new(&config)?;
                let resume = ResumeData::load(&resume.resume).await?;
                let answer =
                    chat::answer_question(&config, &github, &ai, &resume, question).await;
                default.emit(&answer)
            }

            Cmd::Context {
                resume, default, ..
            } => {
                let github = GitHubClient::new(&config)?;
                let resume = ResumeData::load(&resume.resume).await?;
                let portfolio =
                    github_portfolio_context(&github, &config.username, config.context_timeout)
                        .await;
                default.emit(&chat_context(&resume.to_context_markdown(), &portfolio))
            }

            Cmd::Health { default, .. } => {
                let github = GitHubClient::new(&config)?;
                let health = github.check_health().await;
                default.emit(&serde_json::to_string_pretty(&health)?)
            }

            Cmd::Completion { shell, output, .. } => {
                let mut cmd = Cli::command();
                if let Some(output_path) = output {
                    let mut file = std::fs::OpenOptions::new()
                        .write(true)
                        .truncate(true)
                        .create(true)
                        .open(output_path)?;
                    // Write completion script to the requested file.
                    generate(shell, &mut cmd, "devfused", &mut file);
                    info!(
                        "Generated completion script for {} at {}",
                        shell,
                        output_path.display()
                    );
                } else {
                    // Fallback: print completion script to stdout.
                    generate(shell, &mut cmd, "devfused", &mut std::io::stdout());
                }
                Ok(())
            }
        }
    }
}
