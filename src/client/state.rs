use crate::models::FileRecord;

/// Lifecycle events of the file list, as dispatched by the fetch and upload calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileListAction {
    FetchPending,
    FetchFulfilled(Vec<FileRecord>),
    FetchRejected(String),
    UploadPending,
    UploadFulfilled(Vec<FileRecord>),
    UploadRejected(String),
    Add(Vec<FileRecord>),
    Removed(Vec<String>),
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListState {
    pub files: Vec<FileRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

impl FileListState {
    pub fn apply(&mut self, action: FileListAction) {
        match action {
            FileListAction::FetchPending | FileListAction::UploadPending => {
                self.loading = true;
                self.error = None;
            }
            FileListAction::FetchFulfilled(files) => {
                self.files = files;
                self.loading = false;
            }
            FileListAction::UploadFulfilled(files) | FileListAction::Add(files) => {
                self.files.extend(files);
                self.loading = false;
            }
            FileListAction::FetchRejected(message) | FileListAction::UploadRejected(message) => {
                self.error = Some(message);
                self.loading = false;
            }
            FileListAction::Removed(ids) => self.files.retain(|f| !ids.contains(&f.id)),
            FileListAction::Clear => self.files.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: id.to_string(),
            size: 1,
            mime_type: "application/pdf".into(),
            url: String::new(),
            last_modified: 1,
            project_id: None,
        }
    }

    #[test]
    fn fetch_replaces_and_upload_appends() {
        let mut state = FileListState::default();
        state.apply(FileListAction::FetchPending);
        assert!(state.loading);

        state.apply(FileListAction::FetchFulfilled(vec![record("a")]));
        state.apply(FileListAction::UploadPending);
        state.apply(FileListAction::UploadFulfilled(vec![record("b"), record("c")]));
        assert!(!state.loading);
        assert_eq!(state.files.len(), 3);

        state.apply(FileListAction::FetchFulfilled(vec![record("z")]));
        assert_eq!(state.files, vec![record("z")]);
    }

    #[test]
    fn rejection_keeps_files_and_records_error() {
        let mut state = FileListState::default();
        state.apply(FileListAction::Add(vec![record("a")]));
        state.apply(FileListAction::UploadPending);
        state.apply(FileListAction::UploadRejected("Failed to upload files to the server.".into()));

        assert!(!state.loading);
        assert_eq!(state.files.len(), 1);
        assert_eq!(state.error.as_deref(), Some("Failed to upload files to the server."));

        state.apply(FileListAction::Removed(vec!["a".into()]));
        assert!(state.files.is_empty());
    }
}
