//! DevFused portfolio engine.
//!
//! Fetches a developer's repositories from the GitHub API, enriches each one
//! into a display-ready project record (escalating to a generative model
//! only when the repository's own metadata is too thin), and answers
//! questions about the owner's resume and portfolio.

pub mod ai;
pub mod chat;
pub mod cli;
pub mod config;
pub mod context;
pub mod enrich;
pub mod error;
pub mod github;
pub mod logging;
pub mod resume;
pub mod techstack;
pub mod text;

pub use error::{AppError, AppResult};
