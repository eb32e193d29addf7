//! Repository fetching through the GitHub REST API
//!
//! Reads the repository record, the README from the raw content host and a
//! recursive listing of every file with its text content.

use crate::config::{Config, GitHubConfig, ProcessingConfig};
use crate::error::{InsightError, Result};
use async_recursion::async_recursion;
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod types;

pub use types::{ContentListing, FileEntry, RepositoryMetadata, RepositoryReference, NO_README};

const CLIENT_USER_AGENT: &str = "repo-insight";
const FALLBACK_BRANCH: &str = "main";

/// Anything able to produce repository metadata for a repository URL
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetches the full metadata record for `repo_url`
    async fn fetch_metadata(&self, repo_url: &str) -> Result<RepositoryMetadata>;
}

/// Parses a repository URL into owner and name
///
/// Accepts full URLs (`https://github.com/acme/widget`), scheme-less hosts
/// (`github.com/acme/widget`) and bare `acme/widget` references. Trailing
/// slashes and a `.git` suffix are ignored.
pub fn parse_reference(url: &str) -> Result<RepositoryReference> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    // For full URLs only the path counts; the host is never an owner.
    let path = match trimmed.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
        None => trimmed,
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return Err(InsightError::Parse(format!(
            "Invalid repository URL '{}': expected an owner and a repository name",
            url
        )));
    }

    let owner = segments[segments.len() - 2];
    let name = segments[segments.len() - 1];
    Ok(RepositoryReference {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

/// Entry of a contents listing
#[derive(Debug, Deserialize)]
struct ContentItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
    download_url: Option<String>,
}

/// The contents endpoint answers with an object for a file path and a list for a directory
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentResponse {
    Many(Vec<ContentItem>),
    One(ContentItem),
}

impl ContentResponse {
    fn into_items(self) -> Vec<ContentItem> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// A file discovered by the tree walk, not yet downloaded
#[derive(Debug)]
struct RemoteFile {
    path: String,
    size: u64,
    download_url: String,
}

enum Download {
    Fetched(FileEntry),
    Skipped(String),
}

/// Fetches repository records and trees from GitHub
#[derive(Clone)]
pub struct GitHubFetcher {
    client: Client,
    api_base: String,
    raw_base: String,
    max_concurrent_downloads: usize,
}

impl GitHubFetcher {
    /// Creates a fetcher with the given API settings
    pub fn new(github: &GitHubConfig, processing: &ProcessingConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(token) = &github.token {
            let value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| InsightError::Config(format!("Invalid GitHub token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(github.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: github.api_base.trim_end_matches('/').to_string(),
            raw_base: github.raw_base.trim_end_matches('/').to_string(),
            max_concurrent_downloads: processing.max_concurrent_downloads.max(1),
        })
    }

    /// Creates a fetcher from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.github, &config.processing)
    }

    /// Fetches record, README and full file tree of the repository at `repo_url`
    pub async fn fetch_metadata(&self, repo_url: &str) -> Result<RepositoryMetadata> {
        let reference = parse_reference(repo_url)?;
        info!("Fetching repository {}", reference);

        let record = self.fetch_record(&reference).await?;
        let branch = record
            .get("default_branch")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_BRANCH)
            .to_string();
        let readme = self.fetch_readme(&reference, &branch).await?;
        let listing = self.fetch_contents(&reference.owner, &reference.name, "").await?;

        if listing.is_partial() {
            warn!(
                "Repository {} fetched with {} unreadable path(s)",
                reference,
                listing.skipped.len()
            );
        }
        info!("Fetched {} file(s) from {}", listing.files.len(), reference);

        Ok(RepositoryMetadata::new(record, readme, listing))
    }

    /// Recursively lists `path` and downloads every file below it
    ///
    /// Directories are expanded depth-first in the order the API returns
    /// them. A non-success status for a listing or a download drops that
    /// subtree and records its path in [`ContentListing::skipped`]. A 404 for
    /// the repository root means the repository has no commits and yields an
    /// empty, complete listing.
    pub async fn fetch_contents(&self, owner: &str, name: &str, path: &str) -> Result<ContentListing> {
        let reference = RepositoryReference {
            owner: owner.to_string(),
            name: name.to_string(),
        };

        let mut files = Vec::new();
        let mut skipped = Vec::new();
        self.walk(&reference, path, &mut files, &mut skipped).await?;

        let downloads: Vec<Download> = stream::iter(files.into_iter().map(|file| self.download(file)))
            .buffered(self.max_concurrent_downloads)
            .try_collect()
            .await?;

        let mut listing = ContentListing {
            files: Vec::with_capacity(downloads.len()),
            skipped,
        };
        for download in downloads {
            match download {
                Download::Fetched(entry) => listing.files.push(entry),
                Download::Skipped(path) => listing.skipped.push(path),
            }
        }
        Ok(listing)
    }

    async fn fetch_record(&self, reference: &RepositoryReference) -> Result<Map<String, Value>> {
        let url = format!("{}/repos/{}/{}", self.api_base, reference.owner, reference.name);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(InsightError::GitHubApi(format!(
                "Failed to fetch repository {}: HTTP {}",
                reference,
                response.status()
            )));
        }

        match response.json::<Value>().await? {
            Value::Object(record) => Ok(record),
            _ => Err(InsightError::GitHubApi(format!(
                "Unexpected repository record for {}",
                reference
            ))),
        }
    }

    async fn fetch_readme(&self, reference: &RepositoryReference, branch: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/{}/{}/{}/README.md",
            self.raw_base, reference.owner, reference.name, branch
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            debug!("No README for {} on {}: HTTP {}", reference, branch, response.status());
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }

    #[async_recursion]
    async fn walk(
        &self,
        reference: &RepositoryReference,
        path: &str,
        files: &mut Vec<RemoteFile>,
        skipped: &mut Vec<String>,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, reference.owner, reference.name, path
        );
        let response = self.client.get(&url).send().await?;

        if path.is_empty() && response.status() == StatusCode::NOT_FOUND {
            info!("Repository {} is empty", reference);
            return Ok(());
        }
        if !response.status().is_success() {
            warn!("Skipping '{}' in {}: HTTP {}", path, reference, response.status());
            skipped.push(path.to_string());
            return Ok(());
        }

        let items = response.json::<ContentResponse>().await?.into_items();
        for item in items {
            match item.kind.as_str() {
                "dir" => self.walk(reference, &item.path, files, skipped).await?,
                "file" => match item.download_url {
                    Some(download_url) => files.push(RemoteFile {
                        path: item.path,
                        size: item.size,
                        download_url,
                    }),
                    None => {
                        warn!("File '{}' in {} has no download URL", item.path, reference);
                        skipped.push(item.path);
                    }
                },
                other => debug!("Ignoring '{}' of type {}", item.path, other),
            }
        }
        Ok(())
    }

    async fn download(&self, file: RemoteFile) -> Result<Download> {
        let response = self.client.get(&file.download_url).send().await?;
        if !response.status().is_success() {
            warn!("Failed to download '{}': HTTP {}", file.path, response.status());
            return Ok(Download::Skipped(file.path));
        }

        let content = response.text().await?;
        Ok(Download::Fetched(FileEntry::new(file.path, content, file.size)))
    }
}

#[async_trait]
impl RepositorySource for GitHubFetcher {
    async fn fetch_metadata(&self, repo_url: &str) -> Result<RepositoryMetadata> {
        GitHubFetcher::fetch_metadata(self, repo_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("https://github.com/acme/widget" ; "plain url")]
    #[test_case("https://github.com/acme/widget/" ; "trailing slash")]
    #[test_case("https://github.com/acme/widget.git" ; "git suffix")]
    #[test_case("https://github.com/acme/widget.git/" ; "git suffix and slash")]
    #[test_case("  https://github.com/acme/widget  " ; "surrounding whitespace")]
    #[test_case("github.com/acme/widget" ; "no scheme")]
    #[test_case("acme/widget" ; "bare reference")]
    fn test_parse_reference(url: &str) {
        let reference = parse_reference(url).unwrap();
        assert_eq!(reference.owner, "acme");
        assert_eq!(reference.name, "widget");
    }

    #[test_case("" ; "empty")]
    #[test_case("widget" ; "single segment")]
    #[test_case("https://github.com/acme" ; "owner only")]
    #[test_case("https://github.com/" ; "host only")]
    #[test_case("/" ; "slash only")]
    fn test_parse_reference_rejects(url: &str) {
        assert!(matches!(parse_reference(url), Err(InsightError::Parse(_))));
    }

    #[test]
    fn test_parse_reference_keeps_inner_dots() {
        let reference = parse_reference("https://github.com/acme/acme.github.io").unwrap();
        assert_eq!(reference.name, "acme.github.io");
    }

    #[test]
    fn test_content_response_shapes() {
        let one: ContentResponse = serde_json::from_str(
            r#"{"path": "README.md", "type": "file", "size": 5, "download_url": "http://x/README.md"}"#,
        )
        .unwrap();
        assert_eq!(one.into_items().len(), 1);

        let many: ContentResponse = serde_json::from_str(
            r#"[{"path": "src", "type": "dir", "size": 0, "download_url": null},
                {"path": "a.rs", "type": "file", "size": 1, "download_url": "http://x/a.rs"}]"#,
        )
        .unwrap();
        assert_eq!(many.into_items().len(), 2);
    }
}
