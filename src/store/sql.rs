use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use tokio::fs;
use tracing::{info, warn};

use super::sidecar::rescan_directory;
use super::{FileRepository, ProjectRepository};
use crate::entities::{file, project};
use crate::error::AppError;
use crate::models::{FileRecord, Project, ProjectPatch};

/// Metadata in SQLite. Each mutation runs in its own transaction.
#[derive(Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let db = Database::connect(database_url).await?;
        Migrator::up(&db, None).await?;
        info!("Metadata | connected to {}", database_url);
        Ok(Self { db })
    }

    /// Record files sitting in `dir` that the database has no row for, such
    /// as uploads interrupted before their commit or files left behind by a
    /// lost database. Adopted records have no project. Returns how many were
    /// added.
    pub async fn adopt_orphans(&self, dir: &Path, base_url: &str) -> Result<usize, AppError> {
        fs::create_dir_all(dir).await?;
        let known: HashSet<String> = file::Entity::find()
            .select_only()
            .column(file::Column::Id)
            .into_tuple::<String>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        let orphans: Vec<FileRecord> = rescan_directory(dir, base_url)
            .await?
            .into_iter()
            .filter(|r| !known.contains(&r.id))
            .collect();

        let count = orphans.len();
        if count > 0 {
            warn!("Metadata | adopting {} untracked files from {}", count, dir.display());
            self.append(orphans).await?;
        }
        Ok(count)
    }
}

#[async_trait]
impl FileRepository for SqlStore {
    async fn list(&self, project_id: Option<&str>) -> Result<Vec<FileRecord>, AppError> {
        let mut query = file::Entity::find().order_by_asc(file::Column::Seq);
        if let Some(pid) = project_id {
            query = query.filter(file::Column::ProjectId.eq(pid));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(FileRecord::from).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<FileRecord>, AppError> {
        let model = file::Entity::find()
            .filter(file::Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(model.map(FileRecord::from))
    }

    async fn append(&self, records: Vec<FileRecord>) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        for record in records {
            file::ActiveModel::from(record).insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<Option<FileRecord>, AppError> {
        let txn = self.db.begin().await?;

        let Some(model) = file::Entity::find()
            .filter(file::Column::Id.eq(id))
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        file::Entity::delete_by_id(model.seq).exec(&txn).await?;
        txn.commit().await?;
        Ok(Some(FileRecord::from(model)))
    }
}

#[async_trait]
impl ProjectRepository for SqlStore {
    async fn insert_project(&self, project: Project) -> Result<Project, AppError> {
        let model = project::ActiveModel::from(project).insert(&self.db).await?;
        Ok(Project::from(model))
    }

    async fn list_projects(&self, limit: u64, offset: u64) -> Result<Vec<Project>, AppError> {
        let models = project::Entity::find()
            .order_by_asc(project::Column::CreatedAt)
            .order_by_asc(project::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Project::from).collect())
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let model = project::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(Project::from))
    }

    async fn update_project(
        &self,
        id: &str,
        patch: ProjectPatch,
        now: NaiveDateTime,
    ) -> Result<Option<Project>, AppError> {
        let txn = self.db.begin().await?;

        let Some(model) = project::Entity::find_by_id(id.to_string()).one(&txn).await? else {
            return Ok(None);
        };

        let mut project = Project::from(model);
        project.apply(patch, now);
        let updated = project::ActiveModel::from(project).update(&txn).await?;
        txn.commit().await?;
        Ok(Some(Project::from(updated)))
    }

    async fn delete_project(&self, id: &str) -> Result<bool, AppError> {
        let res = project::Entity::delete_by_id(id.to_string()).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
