use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::FileRecord;

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    /// Only files uploaded with this project id.
    pub project_id: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteFileResponse {
    pub message: String,
    pub id: String,
}

#[utoipa::path(
    get,
    path = "/files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Files in upload order", body = [FileRecord]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Files"
)]
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let project_id = query.project_id.as_deref().filter(|p| !p.is_empty());
    let files = state.library.list(project_id).await?;

    info!(
        "Files | GET /files | project={} | count={} | res=200",
        project_id.unwrap_or("-"),
        files.len()
    );
    Ok(Json(files))
}

#[utoipa::path(
    get,
    path = "/files/{id}",
    params(("id" = String, Path, description = "Stored file id")),
    responses(
        (status = 200, description = "File record", body = FileRecord),
        (status = 404, description = "File not found")
    ),
    tag = "Files"
)]
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FileRecord>, AppError> {
    let file = state.library.get(&id).await?;
    Ok(Json(file))
}

#[utoipa::path(
    get,
    path = "/files/{id}/content",
    params(("id" = String, Path, description = "Stored file id")),
    responses(
        (status = 200, description = "Stored bytes", content_type = "application/octet-stream"),
        (status = 404, description = "File not found")
    ),
    tag = "Files"
)]
pub async fn get_file_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let (record, bytes) = state.library.read(&id).await?;
    let safe_name: String = record
        .name
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"')
        .collect();
    let disposition = format!("inline; filename=\"{}\"", safe_name);

    Ok((
        [
            (header::CONTENT_TYPE, record.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/files/{id}",
    params(("id" = String, Path, description = "Stored file id")),
    responses(
        (status = 200, description = "File deleted successfully", body = DeleteFileResponse),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Files"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteFileResponse>, AppError> {
    match state.library.delete(&id).await {
        Ok(record) => {
            info!("Files | DELETE /files/{} | res=200", record.id);
            Ok(Json(DeleteFileResponse {
                message: "File deleted successfully".to_string(),
                id: record.id,
            }))
        }
        Err(e) => {
            info!("Files | DELETE /files/{} | res={}", id, e.status().as_u16());
            Err(e)
        }
    }
}
