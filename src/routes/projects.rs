use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::{NewProject, Project, ProjectPatch};
use crate::pagination::{PaginatedResponse, Pagination};

#[utoipa::path(
    post,
    path = "/projects",
    request_body = NewProject,
    responses(
        (status = 201, description = "Project created successfully", body = Project),
        (status = 400, description = "Missing project name"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    if payload.project_name.trim().is_empty() {
        return Err(AppError::BadRequest("projectName is required".to_string()));
    }

    let now = chrono::Utc::now().naive_utc();
    let project = Project::create(Uuid::new_v4().to_string(), payload, now);
    let created = state.projects.insert_project(project).await?;

    info!("Projects | POST /projects | id={} | name={} | res=201", created.id, created.project_name);
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/projects",
    params(Pagination),
    responses(
        (status = 200, description = "Projects, oldest first", body = PaginatedResponse<Project>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<Project>>, AppError> {
    let projects = state
        .projects
        .list_projects(pagination.limit(), pagination.offset())
        .await?;

    Ok(Json(PaginatedResponse::new(projects, &pagination)))
}

#[utoipa::path(
    get,
    path = "/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project details", body = Project),
        (status = 404, description = "Project not found")
    ),
    tag = "Projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, AppError> {
    let project = state
        .projects
        .get_project(&project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

#[utoipa::path(
    put,
    path = "/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    request_body = ProjectPatch,
    responses(
        (status = 200, description = "Project updated successfully", body = Project),
        (status = 400, description = "Empty project name"),
        (status = 404, description = "Project not found")
    ),
    tag = "Projects"
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, AppError> {
    if patch.project_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("projectName cannot be empty".to_string()));
    }

    let now = chrono::Utc::now().naive_utc();
    let updated = state
        .projects
        .update_project(&project_id, patch, now)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    info!("Projects | PUT /projects/{} | res=200", project_id);
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted successfully"),
        (status = 404, description = "Project not found")
    ),
    tag = "Projects"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.projects.delete_project(&project_id).await? {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    info!("Projects | DELETE /projects/{} | res=200", project_id);
    Ok(Json(serde_json::json!({
        "message": "Project deleted successfully"
    })))
}
