#![doc = include_str!("../README.md")]
#![warn(clippy::all)]

//! repo-insight - LLM-written analyses of GitHub repositories
//!
//! This library fetches a repository's record, README and file contents from
//! GitHub, renders a fixed set of analysis prompts, sends them to an
//! OpenAI-compatible chat-completion service and stores the results per
//! project as JSON documents served by a small web API.
//!
//! ## Usage
//! ```rust,ignore
//! use repo_insight::{AnalysisOrchestrator, Config, GitHubFetcher, LlmClient};
//!
//! async fn example() -> repo_insight::Result<()> {
//!     let config = Config::from_env();
//!     let fetcher = GitHubFetcher::from_config(&config)?;
//!     let metadata = fetcher.fetch_metadata("https://github.com/acme/widget").await?;
//!
//!     let orchestrator = AnalysisOrchestrator::new(LlmClient::from_config(&config.openai));
//!     let analyses = orchestrator.run_all(&metadata, &config.openai.default_model).await;
//!     println!("{}", serde_json::to_string_pretty(&analyses)?);
//!     Ok(())
//! }
//! ```

/// Configuration module for the application
pub mod config;
/// Error handling types and utilities
pub mod error;
/// Logging configuration for the command-line tool
pub mod logging;
/// Repository fetching from GitHub
pub mod github;
/// Prompt templates
pub mod prompts;
/// Chat-completion client
pub mod llm;
/// Analysis sequencing and result bundles
pub mod orchestrator;
/// Per-project JSON storage
pub mod store;
/// REST API functionality for the web service
pub mod api;

// Re-export common types
pub use config::Config;
pub use error::{InsightError, Result};
pub use github::{parse_reference, GitHubFetcher, RepositoryMetadata, RepositorySource};
pub use llm::LlmClient;
pub use orchestrator::{AnalysisBundle, AnalysisKind, AnalysisOrchestrator};
pub use store::{Project, ProjectStore, ProjectSummary};
