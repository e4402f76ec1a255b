use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::services::jobs::{Job, JobStatus};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobRequest {
    pub file_ids: Vec<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct JobFilter {
    /// pending, processing or completed
    pub status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/jobs",
    tag = "Jobs",
    request_body = SubmitJobRequest,
    responses(
        (status = 202, description = "Job accepted", body = Job),
        (status = 400, description = "No files selected"),
        (status = 404, description = "Unknown file id")
    )
)]
pub async fn submit_job(
    State(state): State<AppState>,
    Json(payload): Json<SubmitJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = state
        .jobs
        .submit(payload.file_ids, state.library.repository().as_ref())
        .await?;

    info!("Jobs | POST /jobs | job={} | files={} | res=202", job.id, job.file_ids.len());
    Ok((StatusCode::ACCEPTED, Json(job)))
}

#[utoipa::path(
    get,
    path = "/jobs",
    tag = "Jobs",
    params(JobFilter),
    responses(
        (status = 200, description = "Jobs, newest first", body = [Job]),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<Vec<Job>>, AppError> {
    let status = filter
        .status
        .as_deref()
        .map(str::parse::<JobStatus>)
        .transpose()?;

    Ok(Json(state.jobs.list(status).await))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job with per-file outcomes", body = Job),
        (status = 404, description = "Job not found")
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(state.jobs.get(id).await?))
}
