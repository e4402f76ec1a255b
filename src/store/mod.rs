//! Metadata persistence.
//!
//! Two interchangeable backends sit behind [`FileRepository`] and
//! [`ProjectRepository`]: the JSON sidecar kept next to the uploaded files,
//! and a SQLite database driven through sea-orm.

pub mod atomic;
pub mod sidecar;
pub mod sql;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::config::{Config, StoreBackend};
use crate::error::AppError;
use crate::models::{FileRecord, Project, ProjectPatch};

pub use sidecar::SidecarStore;
pub use sql::SqlStore;

#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Records in insertion order, optionally restricted to one project.
    async fn list(&self, project_id: Option<&str>) -> Result<Vec<FileRecord>, AppError>;

    async fn get(&self, id: &str) -> Result<Option<FileRecord>, AppError>;

    /// Add a batch of records. Either all of them are persisted or none.
    async fn append(&self, records: Vec<FileRecord>) -> Result<(), AppError>;

    /// Remove the record with `id`, returning it, or `None` if absent.
    async fn remove(&self, id: &str) -> Result<Option<FileRecord>, AppError>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert_project(&self, project: Project) -> Result<Project, AppError>;

    async fn list_projects(&self, limit: u64, offset: u64) -> Result<Vec<Project>, AppError>;

    async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError>;

    async fn update_project(
        &self,
        id: &str,
        patch: ProjectPatch,
        now: NaiveDateTime,
    ) -> Result<Option<Project>, AppError>;

    /// Delete the project record only; files keep their `projectId`.
    async fn delete_project(&self, id: &str) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct Stores {
    pub files: Arc<dyn FileRepository>,
    pub projects: Arc<dyn ProjectRepository>,
}

impl Stores {
    pub async fn open(config: &Config) -> Result<Self, AppError> {
        match config.store_backend {
            StoreBackend::Sidecar => {
                let store = Arc::new(SidecarStore::load(&config.upload_dir, &config.public_base_url).await?);
                Ok(Self {
                    files: store.clone(),
                    projects: store,
                })
            }
            StoreBackend::Sqlite => {
                let store = SqlStore::connect(&config.database_url).await?;
                store
                    .adopt_orphans(&config.upload_dir, &config.public_base_url)
                    .await?;
                let store = Arc::new(store);
                Ok(Self {
                    files: store.clone(),
                    projects: store,
                })
            }
        }
    }
}
