use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::Project;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub project_name: String,
    pub user_id: Option<String>,
    pub discipline: Option<String>,
    pub doc_type: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Project {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            project_name: model.project_name,
            user_id: model.user_id,
            discipline: model.discipline,
            doc_type: model.doc_type,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Project> for ActiveModel {
    fn from(project: Project) -> Self {
        use sea_orm::Set;

        Self {
            id: Set(project.id),
            project_name: Set(project.project_name),
            user_id: Set(project.user_id),
            discipline: Set(project.discipline),
            doc_type: Set(project.doc_type),
            description: Set(project.description),
            created_at: Set(project.created_at),
            updated_at: Set(project.updated_at),
        }
    }
}
