use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Text stored in place of a README that could not be downloaded
pub const NO_README: &str = "No README found.";

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    /// Account or organization owning the repository
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A single file of the repository tree with its text content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the repository root
    pub path: String,
    /// Entry type; always `"file"` since directories are flattened away
    #[serde(rename = "type", default = "file_kind")]
    pub kind: String,
    /// Raw text content
    pub content: String,
    /// Size in bytes as reported by the contents listing
    pub size: u64,
}

fn file_kind() -> String {
    "file".to_string()
}

impl FileEntry {
    /// Creates a file entry
    pub fn new(path: impl Into<String>, content: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: file_kind(),
            content: content.into(),
            size,
        }
    }
}

/// Flattened file listing of a repository tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentListing {
    /// Files in depth-first API order
    pub files: Vec<FileEntry>,
    /// Paths whose listing or download returned a non-success status
    pub skipped: Vec<String>,
}

impl ContentListing {
    /// Whether any subtree was dropped
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Repository record from the hosting API, extended with README and contents
///
/// The hosting API's record is kept as an open JSON object so that every
/// field it returns survives the round trip to `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    /// Fields of the repository record
    #[serde(flatten)]
    pub record: Map<String, Value>,
    /// README text, or [`NO_README`]
    #[serde(default = "no_readme")]
    pub readme: String,
    /// Flattened file tree
    #[serde(default)]
    pub contents: Vec<FileEntry>,
    /// Set when part of the tree could not be fetched
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub contents_partial: bool,
}

fn no_readme() -> String {
    NO_README.to_string()
}

impl RepositoryMetadata {
    /// Merges a repository record with its README and file listing
    pub fn new(mut record: Map<String, Value>, readme: Option<String>, listing: ContentListing) -> Self {
        for key in ["readme", "contents", "contents_partial"] {
            record.remove(key);
        }
        Self {
            record,
            readme: readme.unwrap_or_else(no_readme),
            contents_partial: listing.is_partial(),
            contents: listing.files,
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.record.get(key).and_then(Value::as_str)
    }

    fn nested_str(&self, key: &str, inner: &str) -> Option<&str> {
        self.record
            .get(key)
            .and_then(|value| value.get(inner))
            .and_then(Value::as_str)
    }

    /// Repository name
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// Repository description; GitHub sends `null` when none is set
    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// Browser URL of the repository
    pub fn html_url(&self) -> Option<&str> {
        self.str_field("html_url")
    }

    /// Default branch name
    pub fn default_branch(&self) -> Option<&str> {
        self.str_field("default_branch")
    }

    /// License display name
    pub fn license_name(&self) -> Option<&str> {
        self.nested_str("license", "name")
    }

    /// Login of the owning account
    pub fn owner_login(&self) -> Option<&str> {
        self.nested_str("owner", "login")
    }
}
