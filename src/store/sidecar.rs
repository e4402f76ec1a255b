use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::atomic;
use super::{FileRepository, ProjectRepository};
use crate::config::SIDECAR_FILE;
use crate::error::AppError;
use crate::models::kind::mime_from_name;
use crate::models::{FileRecord, Project, ProjectPatch};
use crate::services::disk::{file_url, original_name};

pub const PROJECTS_FILE: &str = "projects.json";

/// Metadata held in memory and mirrored to JSON files in the upload directory.
///
/// Every mutation rewrites the whole sidecar. The in-memory copy is only
/// replaced once the write has succeeded.
pub struct SidecarStore {
    files_path: PathBuf,
    projects_path: PathBuf,
    files: Mutex<Vec<FileRecord>>,
    projects: Mutex<Vec<Project>>,
}

impl SidecarStore {
    /// Load the sidecar from `dir`, rebuilding it from the directory contents
    /// when it is missing or unreadable. Rebuilt records carry no project.
    pub async fn load(dir: &Path, base_url: &str) -> Result<Self, AppError> {
        fs::create_dir_all(dir).await?;
        let files_path = dir.join(SIDECAR_FILE);
        let projects_path = dir.join(PROJECTS_FILE);

        let files = match atomic::read_json::<Vec<FileRecord>>(&files_path).await {
            Ok(Some(records)) => {
                info!("Metadata | loaded {} records from {}", records.len(), files_path.display());
                records
            }
            Ok(None) => {
                warn!("Metadata | no sidecar at {}, rebuilding from directory", files_path.display());
                rebuild(dir, base_url, &files_path).await?
            }
            Err(AppError::Json(e)) => {
                let moved = atomic::quarantine(&files_path).await?;
                warn!(
                    "Metadata | sidecar unreadable ({}), moved to {} and rebuilding from directory",
                    e,
                    moved.display()
                );
                rebuild(dir, base_url, &files_path).await?
            }
            Err(e) => return Err(e),
        };

        let projects = match atomic::read_json::<Vec<Project>>(&projects_path).await {
            Ok(projects) => projects.unwrap_or_default(),
            Err(AppError::Json(e)) => {
                let moved = atomic::quarantine(&projects_path).await?;
                warn!("Projects | registry unreadable ({}), moved to {}", e, moved.display());
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            files_path,
            projects_path,
            files: Mutex::new(files),
            projects: Mutex::new(projects),
        })
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.files_path
    }
}

async fn rebuild(dir: &Path, base_url: &str, sidecar: &Path) -> Result<Vec<FileRecord>, AppError> {
    let records = rescan_directory(dir, base_url).await?;
    atomic::write_json(sidecar, &records).await?;
    info!("Metadata | rebuilt {} records from {}", records.len(), dir.display());
    Ok(records)
}

/// Names in the upload directory that are bookkeeping, not uploads: the
/// sidecars with their temp and `.corrupt` siblings, and the SQLite files.
/// Uploads always carry a timestamp prefix, so they never collide with these.
fn is_reserved(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("metadata.") || name.starts_with("projects.")
}

/// One record per regular file in `dir`, filled from filesystem metadata and
/// ordered by stored name (upload order for timestamp-prefixed names).
pub async fn rescan_directory(dir: &Path, base_url: &str) -> Result<Vec<FileRecord>, AppError> {
    let mut records = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let Some(id) = entry.file_name().to_str().map(str::to_owned) else {
            warn!("Metadata | skipping non UTF-8 filename {:?}", entry.file_name());
            continue;
        };
        if is_reserved(&id) {
            continue;
        }
        let meta = entry.metadata().await?;
        if !meta.is_file() {
            continue;
        }

        let last_modified = meta
            .modified()
            .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
            .unwrap_or_default();

        debug!("Metadata | found {} ({} bytes)", id, meta.len());
        records.push(FileRecord {
            name: original_name(&id).to_string(),
            size: meta.len(),
            mime_type: mime_from_name(&id).to_string(),
            url: file_url(base_url, &id),
            last_modified,
            project_id: None,
            id,
        });
    }

    records.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(records)
}

/// Merge a fresh directory scan with previously stored records.
///
/// Files still on disk keep their stored record (and project); files no longer
/// on disk are dropped; new files are appended in scan order.
pub fn reconcile(existing: Vec<FileRecord>, scanned: Vec<FileRecord>) -> Vec<FileRecord> {
    let on_disk: std::collections::HashSet<&str> = scanned.iter().map(|r| r.id.as_str()).collect();
    let mut merged: Vec<FileRecord> = existing
        .into_iter()
        .filter(|r| on_disk.contains(r.id.as_str()))
        .collect();

    let known: std::collections::HashSet<String> = merged.iter().map(|r| r.id.clone()).collect();
    merged.extend(scanned.into_iter().filter(|r| !known.contains(&r.id)));
    merged
}

/// Rewrite the sidecar in `dir` from the directory contents, returning the
/// number of records written. With `keep_existing`, records of files still
/// present are carried over from the current sidecar.
pub async fn rewrite_sidecar(dir: &Path, base_url: &str, keep_existing: bool) -> Result<usize, AppError> {
    let sidecar = dir.join(SIDECAR_FILE);
    let scanned = rescan_directory(dir, base_url).await?;

    let records = if keep_existing {
        match atomic::read_json::<Vec<FileRecord>>(&sidecar).await {
            Ok(existing) => reconcile(existing.unwrap_or_default(), scanned),
            Err(AppError::Json(e)) => {
                warn!("Metadata | current sidecar unreadable ({}), ignoring it", e);
                scanned
            }
            Err(e) => return Err(e),
        }
    } else {
        scanned
    };

    atomic::write_json(&sidecar, &records).await?;
    info!("Metadata | wrote {} records to {}", records.len(), sidecar.display());
    Ok(records.len())
}

#[async_trait]
impl FileRepository for SidecarStore {
    async fn list(&self, project_id: Option<&str>) -> Result<Vec<FileRecord>, AppError> {
        let files = self.files.lock().await;
        Ok(match project_id {
            Some(pid) => files.iter().filter(|f| f.belongs_to(pid)).cloned().collect(),
            None => files.clone(),
        })
    }

    async fn get(&self, id: &str) -> Result<Option<FileRecord>, AppError> {
        let files = self.files.lock().await;
        Ok(files.iter().find(|f| f.id == id).cloned())
    }

    async fn append(&self, records: Vec<FileRecord>) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut files = self.files.lock().await;
        if let Some(dup) = records.iter().find(|r| files.iter().any(|f| f.id == r.id)) {
            return Err(AppError::InternalServerError(format!(
                "Duplicate file id '{}'",
                dup.id
            )));
        }

        let mut next = files.clone();
        next.extend(records);
        atomic::write_json(&self.files_path, &next).await?;
        *files = next;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<Option<FileRecord>, AppError> {
        let mut files = self.files.lock().await;
        let Some(index) = files.iter().position(|f| f.id == id) else {
            return Ok(None);
        };

        let mut next = files.clone();
        let removed = next.remove(index);
        atomic::write_json(&self.files_path, &next).await?;
        *files = next;
        Ok(Some(removed))
    }
}

#[async_trait]
impl ProjectRepository for SidecarStore {
    async fn insert_project(&self, project: Project) -> Result<Project, AppError> {
        let mut projects = self.projects.lock().await;
        let mut next = projects.clone();
        next.push(project.clone());
        atomic::write_json(&self.projects_path, &next).await?;
        *projects = next;
        Ok(project)
    }

    async fn list_projects(&self, limit: u64, offset: u64) -> Result<Vec<Project>, AppError> {
        let projects = self.projects.lock().await;
        Ok(projects
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let projects = self.projects.lock().await;
        Ok(projects.iter().find(|p| p.id == id).cloned())
    }

    async fn update_project(
        &self,
        id: &str,
        patch: ProjectPatch,
        now: NaiveDateTime,
    ) -> Result<Option<Project>, AppError> {
        let mut projects = self.projects.lock().await;
        let Some(index) = projects.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        let mut next = projects.clone();
        next[index].apply(patch, now);
        let updated = next[index].clone();
        atomic::write_json(&self.projects_path, &next).await?;
        *projects = next;
        Ok(Some(updated))
    }

    async fn delete_project(&self, id: &str) -> Result<bool, AppError> {
        let mut projects = self.projects.lock().await;
        let Some(index) = projects.iter().position(|p| p.id == id) else {
            return Ok(false);
        };

        let mut next = projects.clone();
        next.remove(index);
        atomic::write_json(&self.projects_path, &next).await?;
        *projects = next;
        Ok(true)
    }
}
