use super::{ApiError, CreateProjectRequest, HealthResponse, ProjectService};
use crate::store::{ProjectSummary, StoredProject};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProjectService>,
}

impl AppState {
    pub fn new(service: ProjectService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Builds the application router
///
/// `static_dir` must contain `index.html`, served at `/`.
pub fn router(state: AppState, static_dir: &FsPath) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .route("/health", get(health_check))
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/:id", get(get_project))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.service.health())
}

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    Ok(Json(state.service.list_projects().await?))
}

async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<Json<ProjectSummary>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    info!("Creating project from {}", request.repo_url.as_deref().unwrap_or("<missing>"));

    Ok(Json(state.service.create_project(request).await?))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredProject>, ApiError> {
    Ok(Json(state.service.get_project(&id).await?))
}
