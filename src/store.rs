//! Per-project JSON storage
//!
//! Each project lives in `<root>/<id>/` as two pretty-printed documents,
//! `metadata.json` and `analyses.json`. Saving overwrites both.

use crate::error::{InsightError, Result};
use crate::github::RepositoryMetadata;
use crate::orchestrator::AnalysisBundle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

pub const METADATA_FILE: &str = "metadata.json";
pub const ANALYSES_FILE: &str = "analyses.json";

/// Name reported for stored projects whose metadata lacks one
const UNKNOWN_NAME: &str = "Unknown";

/// Listing entry and creation response for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
}

/// A fully analyzed repository ready to be stored
#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    pub metadata: RepositoryMetadata,
    pub analyses: AnalysisBundle,
}

impl Project {
    /// Builds a project whose id derives from the repository name
    pub fn new(metadata: RepositoryMetadata, analyses: AnalysisBundle) -> Result<Self> {
        let name = metadata
            .name()
            .ok_or_else(|| InsightError::GitHubApi("Repository record has no name".into()))?;
        Ok(Self {
            id: slugify(name),
            metadata,
            analyses,
        })
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.metadata.name().unwrap_or(UNKNOWN_NAME).to_string(),
            description: self.metadata.description().unwrap_or_default().to_string(),
            url: self.metadata.html_url().unwrap_or_default().to_string(),
        }
    }
}

/// Both documents of a stored project as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProject {
    pub metadata: Value,
    pub analyses: Value,
}

/// Lowercases `name` and replaces spaces with underscores
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Filesystem-backed project storage
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the storage root if it does not exist
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Writes both documents of `project`, replacing any previous version
    pub async fn save(&self, project: &Project) -> Result<()> {
        let dir = self.project_dir(&project.id)?;
        fs::create_dir_all(&dir).await?;

        fs::write(dir.join(METADATA_FILE), serde_json::to_vec_pretty(&project.metadata)?).await?;
        fs::write(dir.join(ANALYSES_FILE), serde_json::to_vec_pretty(&project.analyses)?).await?;

        debug!("Saved project {} to {}", project.id, dir.display());
        Ok(())
    }

    /// Summaries of every stored project, ordered by id
    ///
    /// Directories without a metadata document are skipped, as are
    /// metadata documents that cannot be parsed.
    pub async fn list(&self) -> Result<Vec<ProjectSummary>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut projects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let metadata_path = entry.path().join(METADATA_FILE);
            if !fs::try_exists(&metadata_path).await? {
                continue;
            }

            let id = entry.file_name().to_string_lossy().to_string();
            let metadata: Value = match read_json(&metadata_path).await {
                Ok(value) => value,
                Err(e) => {
                    warn!("Skipping project {}: {}", id, e);
                    continue;
                }
            };
            projects.push(summarize(id, &metadata));
        }

        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    /// Reads both documents of project `id`
    pub async fn get(&self, id: &str) -> Result<StoredProject> {
        let dir = self.project_dir(id)?;
        let metadata_path = dir.join(METADATA_FILE);
        let analyses_path = dir.join(ANALYSES_FILE);

        for path in [&metadata_path, &analyses_path] {
            if !fs::try_exists(path).await? {
                return Err(InsightError::NotFound("Project not found".into()));
            }
        }

        Ok(StoredProject {
            metadata: read_json(&metadata_path).await?,
            analyses: read_json(&analyses_path).await?,
        })
    }

    fn project_dir(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\']);
        if !valid {
            return Err(InsightError::NotFound("Project not found".into()));
        }
        Ok(self.root.join(id))
    }
}

async fn read_json(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn summarize(id: String, metadata: &Value) -> ProjectSummary {
    let field = |key: &str| metadata.get(key).and_then(Value::as_str);
    ProjectSummary {
        id,
        name: field("name").unwrap_or(UNKNOWN_NAME).to_string(),
        description: field("description").unwrap_or_default().to_string(),
        url: field("html_url").unwrap_or_default().to_string(),
    }
}
