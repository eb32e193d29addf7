use thiserror::Error;
use std::io;
use async_openai::error::OpenAIError;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, InsightError>;

/// Errors that can occur while fetching, analyzing or storing a repository
#[derive(Debug, Error)]
pub enum InsightError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// OpenAI API errors
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),

    /// Config file parse errors
    #[error("TOML error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Malformed repository reference
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Non-success response from the GitHub API
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Repository metadata could not be retrieved
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Language model errors
    #[error("LLM error: {0}")]
    LLM(String),

    /// Unknown project identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl InsightError {
    /// Checks if this error was caused by the caller's input rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) |
            Self::GitHubApi(_) |
            Self::Fetch(_) |
            Self::Validation(_)
        )
    }
}
