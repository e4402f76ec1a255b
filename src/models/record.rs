use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::kind::DocumentKind;

/// Stored description of one uploaded document.
///
/// Serialized camelCase; this is also the on-disk sidecar format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Stored filename; unique and never reassigned.
    pub id: String,
    /// Original filename as uploaded.
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl FileRecord {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::classify(Some(&self.mime_type), &self.name)
    }

    pub fn belongs_to(&self, project_id: &str) -> bool {
        self.project_id.as_deref() == Some(project_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub project_name: String,
    pub user_id: Option<String>,
    pub discipline: Option<String>,
    pub doc_type: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub project_name: String,
    pub user_id: Option<String>,
    pub discipline: Option<String>,
    pub doc_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub project_name: Option<String>,
    pub user_id: Option<String>,
    pub discipline: Option<String>,
    pub doc_type: Option<String>,
    pub description: Option<String>,
}

impl Project {
    pub fn create(id: String, new: NewProject, now: NaiveDateTime) -> Self {
        Self {
            id,
            project_name: new.project_name,
            user_id: new.user_id,
            discipline: new.discipline,
            doc_type: new.doc_type,
            description: new.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ProjectPatch, now: NaiveDateTime) {
        if let Some(name) = patch.project_name {
            self.project_name = name;
        }
        if let Some(user_id) = patch.user_id {
            self.user_id = Some(user_id);
        }
        if let Some(discipline) = patch.discipline {
            self.discipline = Some(discipline);
        }
        if let Some(doc_type) = patch.doc_type {
            self.doc_type = Some(doc_type);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        self.updated_at = now;
    }
}
