use std::sync::Arc;

use tracing::warn;

use crate::error::AppError;
use crate::models::kind::resolve_mime;
use crate::models::FileRecord;
use crate::services::disk::{sanitize_filename, DiskStore};
use crate::store::FileRepository;

/// One payload of an upload request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, content_type: Option<&str>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(str::to_owned),
            data: data.into(),
        }
    }
}

/// Upload, query and delete over the disk store and the metadata repository,
/// keeping the two in step.
pub struct FileLibrary {
    disk: DiskStore,
    files: Arc<dyn FileRepository>,
}

impl FileLibrary {
    pub fn new(disk: DiskStore, files: Arc<dyn FileRepository>) -> Self {
        Self { disk, files }
    }

    pub fn repository(&self) -> &Arc<dyn FileRepository> {
        &self.files
    }

    /// Store every payload and record them as one batch.
    ///
    /// Nothing is written for an empty batch. If any write or the metadata
    /// append fails, files already written for this batch are removed again.
    pub async fn upload(
        &self,
        uploads: Vec<Upload>,
        project_id: Option<String>,
    ) -> Result<Vec<FileRecord>, AppError> {
        if uploads.is_empty() {
            return Err(AppError::BadRequest("No files uploaded".to_string()));
        }

        let project_id = project_id.filter(|p| !p.trim().is_empty());
        let mut records = Vec::with_capacity(uploads.len());

        for upload in uploads {
            let id = match self.disk.put_object(&upload.name, &upload.data).await {
                Ok(id) => id,
                Err(e) => {
                    self.discard(&records).await;
                    return Err(e);
                }
            };

            let name = sanitize_filename(&upload.name);
            records.push(FileRecord {
                url: self.disk.url_for(&id),
                mime_type: resolve_mime(upload.content_type.as_deref(), &name),
                size: upload.data.len() as u64,
                last_modified: chrono::Utc::now().timestamp_millis(),
                project_id: project_id.clone(),
                name,
                id,
            });
        }

        if let Err(e) = self.files.append(records.clone()).await {
            self.discard(&records).await;
            return Err(e);
        }

        Ok(records)
    }

    async fn discard(&self, records: &[FileRecord]) {
        for record in records {
            if let Err(e) = self.disk.delete_object(&record.id).await {
                warn!("Upload | failed to remove partial upload {}: {}", record.id, e);
            }
        }
    }

    pub async fn list(&self, project_id: Option<&str>) -> Result<Vec<FileRecord>, AppError> {
        self.files.list(project_id).await
    }

    pub async fn get(&self, id: &str) -> Result<FileRecord, AppError> {
        self.files
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    pub async fn read(&self, id: &str) -> Result<(FileRecord, Vec<u8>), AppError> {
        let record = self.get(id).await?;
        let bytes = self.disk.get_object(&record.id).await?;
        Ok((record, bytes))
    }

    /// Remove the stored bytes and the metadata entry for `id`.
    pub async fn delete(&self, id: &str) -> Result<FileRecord, AppError> {
        let record = self.get(id).await?;

        if !self.disk.delete_object(&record.id).await? {
            warn!("Delete | {} was already missing from disk", record.id);
        }

        self.files
            .remove(&record.id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SidecarStore;

    const BASE: &str = "http://localhost:5000";

    async fn library(dir: &std::path::Path) -> FileLibrary {
        let disk = DiskStore::open(dir, BASE).await.unwrap();
        let store = SidecarStore::load(dir, BASE).await.unwrap();
        FileLibrary::new(disk, Arc::new(store))
    }

    #[tokio::test]
    async fn upload_creates_one_record_per_payload() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path()).await;

        let records = lib
            .upload(
                vec![
                    Upload::new("a.pdf", Some("application/pdf"), vec![0u8; 500_000]),
                    Upload::new("b.png", Some("image/png"), vec![0u8; 2000]),
                ],
                Some("p1".into()),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_ne!(records[0].id, records[1].id);
        assert_eq!(records[0].size, 500_000);
        assert_eq!(records[1].size, 2000);
        assert_eq!(records[0].mime_type, "application/pdf");
        assert!(records[1].url.ends_with(&format!("/uploads/{}", records[1].id)));
        assert!(records.iter().all(|r| r.belongs_to("p1")));

        let listed = lib.list(Some("p1")).await.unwrap();
        assert_eq!(listed, records);
        assert!(dir.path().join(&records[0].id).exists());
    }

    #[tokio::test]
    async fn same_name_twice_gets_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path()).await;

        let records = lib
            .upload(
                vec![
                    Upload::new("A-101.pdf", None, b"one".to_vec()),
                    Upload::new("A-101.pdf", None, b"two".to_vec()),
                ],
                None,
            )
            .await
            .unwrap();

        assert_ne!(records[0].id, records[1].id);
        assert_eq!(records[0].name, "A-101.pdf");
        assert_eq!(records[0].mime_type, "application/pdf");
        assert_eq!(records[0].project_id, None);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_without_writes() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path()).await;

        let err = lib.upload(Vec::new(), Some("p1".into())).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "No files uploaded"));

        let on_disk: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n != "metadata.json")
            .collect();
        assert!(on_disk.is_empty());
    }

    #[tokio::test]
    async fn list_adds_new_uploads_to_existing_project_files() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path()).await;

        lib.upload(vec![Upload::new("old.pdf", None, b"x".to_vec())], Some("p1".into()))
            .await
            .unwrap();
        lib.upload(vec![Upload::new("other.pdf", None, b"x".to_vec())], Some("p2".into()))
            .await
            .unwrap();
        let fresh = lib
            .upload(
                vec![
                    Upload::new("n1.pdf", None, b"x".to_vec()),
                    Upload::new("n2.pdf", None, b"x".to_vec()),
                ],
                Some("p1".into()),
            )
            .await
            .unwrap();

        let p1 = lib.list(Some("p1")).await.unwrap();
        assert_eq!(p1.len(), 3);
        assert!(p1.iter().all(|r| r.belongs_to("p1")));
        assert!(fresh.iter().all(|r| p1.contains(r)));
        assert_eq!(lib.list(None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn delete_removes_bytes_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path()).await;
        let records = lib
            .upload(
                vec![
                    Upload::new("a.pdf", Some("application/pdf"), vec![1u8; 500_000]),
                    Upload::new("b.png", Some("image/png"), vec![2u8; 2000]),
                ],
                Some("p1".into()),
            )
            .await
            .unwrap();

        let deleted = lib.delete(&records[0].id).await.unwrap();
        assert_eq!(deleted.name, "a.pdf");

        let remaining = lib.list(Some("p1")).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "b.png");
        assert!(matches!(lib.read(&records[0].id).await, Err(AppError::NotFound(_))));
        assert!(!dir.path().join(&records[0].id).exists());
    }

    #[tokio::test]
    async fn deleting_unknown_id_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path()).await;
        lib.upload(vec![Upload::new("a.pdf", None, b"x".to_vec())], None)
            .await
            .unwrap();

        assert!(matches!(lib.delete("missing.pdf").await, Err(AppError::NotFound(_))));
        assert_eq!(lib.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_tolerates_bytes_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path()).await;
        let records = lib
            .upload(vec![Upload::new("a.pdf", None, b"x".to_vec())], None)
            .await
            .unwrap();
        std::fs::remove_file(dir.path().join(&records[0].id)).unwrap();

        lib.delete(&records[0].id).await.unwrap();
        assert!(lib.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restart_without_sidecar_recovers_files_without_project() {
        let dir = tempfile::tempdir().unwrap();
        {
            let lib = library(dir.path()).await;
            lib.upload(
                vec![
                    Upload::new("a.pdf", None, vec![0u8; 10]),
                    Upload::new("b.png", None, vec![0u8; 20]),
                ],
                Some("p1".into()),
            )
            .await
            .unwrap();
        }
        std::fs::remove_file(dir.path().join("metadata.json")).unwrap();

        let lib = library(dir.path()).await;
        let files = lib.list(None).await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.project_id.is_none()));
        assert!(lib.list(Some("p1")).await.unwrap().is_empty());
        assert_eq!(files[0].name, "a.pdf");
        assert_eq!(files[1].size, 20);
    }
}
