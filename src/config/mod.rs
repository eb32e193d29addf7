mod env_manager;

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::{InsightError, Result};

pub use env_manager::get_env_value;

/// Default model used when a request does not name one
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
/// Default GitHub REST API base
pub const GITHUB_API_BASE: &str = "https://api.github.com";
/// Default host for raw file downloads
pub const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Main configuration struct for the application
///
/// Values come from an optional TOML file, then environment variables
/// override whatever the file set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding one subdirectory per project
    pub projects_dir: PathBuf,
    /// Directory holding the landing page assets
    pub static_dir: PathBuf,
    /// Address the web server binds to
    pub bind_addr: String,
    /// GitHub access settings
    pub github: GitHubConfig,
    /// Completion service settings
    pub openai: OpenAiConfig,
    /// Fetch concurrency settings
    pub processing: ProcessingConfig,
}

/// GitHub access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API
    pub api_base: String,
    /// Base URL of the raw content host
    pub raw_base: String,
    /// Optional token for authenticated requests
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; when absent every analysis degrades to placeholder text
    pub api_key: Option<String>,
    /// Override for OpenAI-compatible endpoints
    pub api_base: Option<String>,
    /// Model used when a request does not specify one
    pub default_model: String,
}

/// Configuration for parallel fetch operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum number of concurrent raw file downloads
    pub max_concurrent_downloads: usize,
}

impl Config {
    /// Creates a new configuration storing projects under `projects_dir`
    ///
    /// # Arguments
    /// * `projects_dir` - The directory where project documents will be stored
    pub fn new(projects_dir: PathBuf) -> Self {
        Self {
            projects_dir,
            static_dir: PathBuf::from("static"),
            bind_addr: "127.0.0.1:5001".to_string(),
            github: GitHubConfig::default(),
            openai: OpenAiConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }

    /// Builds the configuration from defaults and environment variables only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        env_manager::apply_env(&mut config);
        config
    }

    /// Loads configuration from a TOML file, then applies environment overrides
    ///
    /// With no explicit path the default location under the user's config
    /// directory is tried. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };

        let mut config = match path {
            Some(ref path) if path.exists() => {
                let content = fs::read_to_string(path).map_err(|e| {
                    InsightError::Config(format!("Failed to read config file {}: {}", path.display(), e))
                })?;
                toml::from_str(&content)?
            }
            _ => Self::default(),
        };

        env_manager::apply_env(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Location of the per-user config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("repo-insight").join("config.toml"))
    }

    /// Rejects settings that would make the service unusable
    pub fn validate(&self) -> Result<()> {
        if self.processing.max_concurrent_downloads == 0 {
            return Err(InsightError::Config(
                "max_concurrent_downloads must be at least 1".into(),
            ));
        }
        if self.openai.default_model.trim().is_empty() {
            return Err(InsightError::Config("default_model must not be empty".into()));
        }
        if let Some(token) = &self.github.token {
            if token.trim().is_empty() {
                return Err(InsightError::Config("GitHub token is empty".into()));
            }
        }
        Ok(())
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            raw_base: GITHUB_RAW_BASE.to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(PathBuf::from("projects"))
    }
}
