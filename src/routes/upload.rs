use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::Serialize;
use tracing::info;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::FileRecord;
use crate::services::library::Upload;

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<FileRecord>,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Files",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Repeated `files` parts plus an optional `projectId` text field"),
    responses(
        (status = 200, description = "Files uploaded successfully", body = UploadResponse),
        (status = 400, description = "No files uploaded or malformed form"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut uploads = Vec::new();
    let mut project_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart data".to_string()))?
    {
        match field.name() {
            Some("files") | Some("file") => {
                let filename = field.file_name().unwrap_or("unknown").to_string();
                let content_type = field.content_type().map(str::to_owned);
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::BadRequest("Failed to read file bytes".to_string()))?;
                uploads.push(Upload::new(filename, content_type.as_deref(), data.to_vec()));
            }
            Some("projectId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid projectId field".to_string()))?;
                project_id = Some(text);
            }
            _ => {}
        }
    }

    if uploads.is_empty() {
        info!("Upload | POST /upload | res=400 | No files uploaded");
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    let files = state.library.upload(uploads, project_id).await?;

    info!(
        "Upload | POST /upload | project={} | files={} | res=200",
        files.first().and_then(|f| f.project_id.as_deref()).unwrap_or("-"),
        files.len()
    );
    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        files,
    }))
}
