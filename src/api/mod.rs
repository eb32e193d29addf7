use crate::config::Config;
use crate::error::{InsightError, Result};
use crate::github::{GitHubFetcher, RepositorySource};
use crate::llm::LlmClient;
use crate::orchestrator::AnalysisOrchestrator;
use crate::store::{Project, ProjectStore, ProjectSummary, StoredProject};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod routes;

pub use routes::{router, AppState};

/// Request payload for creating a project
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Repository to fetch and analyze
    #[serde(default)]
    pub repo_url: Option<String>,
    /// Completion model; the configured default when absent
    #[serde(default)]
    pub model: Option<String>,
}

/// Service health information
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current status
    pub status: String,
    /// Whether analyses will be generated or replaced by placeholders
    pub llm_configured: bool,
}

/// Error returned to API clients as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<InsightError> for ApiError {
    fn from(e: InsightError) -> Self {
        match e {
            InsightError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            InsightError::Validation(message) => Self::bad_request(message),
            e if e.is_client_error() => Self::bad_request(
                "Failed to fetch repository metadata. Please check the URL and try again.",
            ),
            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process repository: {}", other),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Runs the fetch, analyze and store pipeline behind the HTTP handlers
pub struct ProjectService {
    source: Arc<dyn RepositorySource>,
    orchestrator: AnalysisOrchestrator,
    store: ProjectStore,
    default_model: String,
}

impl ProjectService {
    /// Create a new project service
    pub fn new(
        source: Arc<dyn RepositorySource>,
        orchestrator: AnalysisOrchestrator,
        store: ProjectStore,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            source,
            orchestrator,
            store,
            default_model: default_model.into(),
        }
    }

    /// Wires the GitHub fetcher, completion client and store from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = GitHubFetcher::from_config(config)?;
        let llm = LlmClient::from_config(&config.openai);
        Ok(Self::new(
            Arc::new(fetcher),
            AnalysisOrchestrator::new(llm),
            ProjectStore::new(config.projects_dir.clone()),
            config.openai.default_model.clone(),
        ))
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Service health information
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            service: "repo-insight".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            status: "healthy".to_string(),
            llm_configured: self.orchestrator.llm().is_configured(),
        }
    }

    /// Summaries of every stored project
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        self.store.list().await
    }

    /// Fetches, analyzes and stores the requested repository
    ///
    /// A missing URL is rejected before any network or disk access.
    pub async fn create_project(&self, request: CreateProjectRequest) -> Result<ProjectSummary> {
        let repo_url = request
            .repo_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| InsightError::Validation("Repository URL is required".into()))?;
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(self.default_model.as_str());

        let metadata = self.source.fetch_metadata(repo_url).await.map_err(|e| {
            warn!("Failed to fetch repository metadata for {}: {}", repo_url, e);
            match e {
                InsightError::Parse(_) | InsightError::GitHubApi(_) => e,
                other => InsightError::Fetch(other.to_string()),
            }
        })?;

        if metadata.name().is_none() {
            return Err(InsightError::GitHubApi("Repository record has no name".into()));
        }

        let analyses = self.orchestrator.run_all(&metadata, model).await;
        let project = Project::new(metadata, analyses)?;
        self.store.save(&project).await.map_err(|e| {
            error!("Failed to store project {}: {}", project.id, e);
            e
        })?;

        info!("Created project {} from {}", project.id, repo_url);
        Ok(project.summary())
    }

    /// Both stored documents of project `id`
    pub async fn get_project(&self, id: &str) -> Result<StoredProject> {
        self.store.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (InsightError::Validation("Repository URL is required".into()), StatusCode::BAD_REQUEST),
            (InsightError::Parse("bad".into()), StatusCode::BAD_REQUEST),
            (InsightError::Fetch("timeout".into()), StatusCode::BAD_REQUEST),
            (InsightError::GitHubApi("HTTP 404".into()), StatusCode::BAD_REQUEST),
            (InsightError::NotFound("Project not found".into()), StatusCode::NOT_FOUND),
            (InsightError::LLM("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let error = ApiError::from(InsightError::Validation("Repository URL is required".into()));
        assert_eq!(error.message(), "Repository URL is required");
    }

    #[test]
    fn test_client_errors_share_the_fetch_message() {
        let errors = [
            InsightError::Parse("bad".into()),
            InsightError::Fetch("timeout".into()),
            InsightError::GitHubApi("HTTP 404".into()),
        ];
        for error in errors {
            assert!(error.is_client_error());
            let api = ApiError::from(error);
            assert_eq!(api.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                api.message(),
                "Failed to fetch repository metadata. Please check the URL and try again."
            );
        }

        let server_side = ApiError::from(InsightError::Config("broken".into()));
        assert_eq!(server_side.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(server_side.message().starts_with("Failed to process repository: "));
    }
}
