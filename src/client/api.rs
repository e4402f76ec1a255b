use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::models::{FileRecord, NewProject, Project};
use crate::services::jobs::{Job, JobStatus};
use crate::services::library::Upload;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    #[error("job {0} did not complete in time")]
    Timeout(Uuid),
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Deserialize)]
struct UploadBody {
    files: Vec<FileRecord>,
}

#[derive(Deserialize)]
struct ProjectPage {
    data: Vec<Project>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    file_ids: &'a [String],
}

/// HTTP client for the drawing service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { base, http })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn list_files(&self, project_id: Option<&str>) -> Result<Vec<FileRecord>, ClientError> {
        let mut request = self.http.get(self.endpoint(&["files"]));
        if let Some(pid) = project_id {
            request = request.query(&[("projectId", pid)]);
        }
        decode(request.send().await?).await
    }

    pub async fn get_file(&self, id: &str) -> Result<FileRecord, ClientError> {
        decode(self.http.get(self.endpoint(&["files", id])).send().await?).await
    }

    pub async fn upload(
        &self,
        uploads: Vec<Upload>,
        project_id: Option<&str>,
    ) -> Result<Vec<FileRecord>, ClientError> {
        let mut form = Form::new();
        for upload in uploads {
            let mut part = Part::bytes(upload.data).file_name(upload.name);
            if let Some(ct) = upload.content_type.as_deref() {
                part = part.mime_str(ct)?;
            }
            form = form.part("files", part);
        }
        if let Some(pid) = project_id {
            form = form.text("projectId", pid.to_string());
        }

        let response = self
            .http
            .post(self.endpoint(&["upload"]))
            .multipart(form)
            .send()
            .await?;
        let body: UploadBody = decode(response).await?;
        Ok(body.files)
    }

    /// Read local files and upload them; the server infers each type from its name.
    pub async fn upload_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        project_id: Option<&str>,
    ) -> Result<Vec<FileRecord>, ClientError> {
        let mut uploads = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let data = tokio::fs::read(path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            uploads.push(Upload::new(name, None, data));
        }
        self.upload(uploads, project_id).await
    }

    pub async fn delete_file(&self, id: &str) -> Result<(), ClientError> {
        let response = self.http.delete(self.endpoint(&["files", id])).send().await?;
        let _: MessageBody = decode(response).await?;
        Ok(())
    }

    /// Delete each id in turn, stopping at the first failure.
    pub async fn delete_files(&self, ids: &[String]) -> Result<usize, ClientError> {
        for id in ids {
            self.delete_file(id).await?;
        }
        Ok(ids.len())
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["projects"]))
            .json(project)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        let page: ProjectPage = decode(
            self.http
                .get(self.endpoint(&["projects"]))
                .query(&[("limit", "100")])
                .send()
                .await?,
        )
        .await?;
        Ok(page.data)
    }

    pub async fn submit_job(&self, file_ids: &[String]) -> Result<Job, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["jobs"]))
            .json(&SubmitBody { file_ids })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, ClientError> {
        let id = id.to_string();
        decode(self.http.get(self.endpoint(&["jobs", &id])).send().await?).await
    }

    /// Poll a job until it completes or `timeout` elapses.
    pub async fn wait_for_job(
        &self,
        id: Uuid,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Job, ClientError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let job = self.get_job(id).await?;
            if job.status == JobStatus::Completed {
                return Ok(job);
            }
            debug!("Client | job {} is {:?}", id, job.status);
            if tokio::time::Instant::now() >= deadline {
                return Err(ClientError::Timeout(id));
            }
            tokio::time::sleep(interval).await;
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(ClientError::Status {
            code: status.as_u16(),
            message: error_message(status, &bytes),
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<MessageBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
