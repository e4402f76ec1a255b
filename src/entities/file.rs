use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::FileRecord;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    /// Insertion order; listing sorts on it.
    #[sea_orm(primary_key)]
    pub seq: i32,
    #[sea_orm(unique)]
    pub id: String,
    pub name: String,
    pub size: i64,
    pub mime_type: String,
    pub url: String,
    pub last_modified: i64,
    pub project_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FileRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            size: u64::try_from(model.size).unwrap_or_default(),
            mime_type: model.mime_type,
            url: model.url,
            last_modified: model.last_modified,
            project_id: model.project_id,
        }
    }
}

impl From<FileRecord> for ActiveModel {
    fn from(record: FileRecord) -> Self {
        use sea_orm::{ActiveValue::NotSet, Set};

        Self {
            seq: NotSet,
            id: Set(record.id),
            name: Set(record.name),
            size: Set(i64::try_from(record.size).unwrap_or(i64::MAX)),
            mime_type: Set(record.mime_type),
            url: Set(record.url),
            last_modified: Set(record.last_modified),
            project_id: Set(record.project_id),
        }
    }
}
