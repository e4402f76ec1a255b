pub mod kind;
pub mod record;

pub use kind::DocumentKind;
pub use record::{FileRecord, NewProject, Project, ProjectPatch};
