//! Selection and per-file status state for the file table.
//!
//! Both are plain reducers: state changes only through [`Selection::apply`]
//! and [`StatusBoard::apply`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::notice::Notice;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    #[default]
    Unset,
    Success,
    Failure,
    Approved,
    NeedApprove,
}

impl FileStatus {
    pub fn label(self) -> &'static str {
        match self {
            FileStatus::Approved => "Approved",
            FileStatus::Success => "Processed",
            FileStatus::NeedApprove => "Need to approve",
            FileStatus::Unset | FileStatus::Failure => "Not processed",
        }
    }

    pub fn is_viewable(self) -> bool {
        matches!(
            self,
            FileStatus::Success | FileStatus::Approved | FileStatus::NeedApprove
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// Replace the selection with these ids.
    Select(Vec<String>),
    Clear,
}

/// Ordered set of selected file ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn apply(&mut self, action: SelectionAction) {
        match action {
            SelectionAction::Select(ids) => {
                self.ids.clear();
                for id in ids {
                    if !self.ids.contains(&id) {
                        self.ids.push(id);
                    }
                }
            }
            SelectionAction::Clear => self.ids.clear(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn availability(&self) -> ActionAvailability {
        ActionAvailability::for_count(self.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusAction {
    /// Merge these statuses over the current map.
    SetMany(HashMap<String, FileStatus>),
    Set(String, FileStatus),
    ClearAll,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBoard {
    statuses: HashMap<String, FileStatus>,
}

impl StatusBoard {
    pub fn apply(&mut self, action: StatusAction) {
        match action {
            StatusAction::SetMany(map) => self.statuses.extend(map),
            StatusAction::Set(id, status) => {
                self.statuses.insert(id, status);
            }
            StatusAction::ClearAll => self.statuses.clear(),
        }
    }

    pub fn status(&self, id: &str) -> FileStatus {
        self.statuses.get(id).copied().unwrap_or_default()
    }

    pub fn is_viewable(&self, id: &str) -> bool {
        self.status(id).is_viewable()
    }
}

/// Which toolbar actions are enabled for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionAvailability {
    pub edit: bool,
    pub view: bool,
    pub delete: bool,
    pub process: bool,
}

impl ActionAvailability {
    pub fn for_count(selected: usize) -> Self {
        Self {
            edit: selected == 1,
            view: selected == 1,
            delete: selected >= 1,
            process: selected >= 1,
        }
    }
}

/// The single file the viewer may open, or the notice explaining why not.
pub fn view_target<'a>(selection: &'a Selection, board: &StatusBoard) -> Result<&'a str, Notice> {
    match selection.ids() {
        [id] if board.is_viewable(id) => Ok(id),
        [_] => Err(Notice::info("Only successfully processed files can be viewed.")),
        _ => Err(Notice::info("Please select exactly one file to view.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(ids: &[&str]) -> Selection {
        let mut s = Selection::default();
        s.apply(SelectionAction::Select(ids.iter().map(|i| i.to_string()).collect()));
        s
    }

    #[test]
    fn availability_follows_selection_size() {
        let none = select(&[]).availability();
        assert!(!none.edit && !none.view && !none.delete && !none.process);

        let one = select(&["a"]).availability();
        assert!(one.edit && one.view && one.delete && one.process);

        let two = select(&["a", "b"]).availability();
        assert!(!two.edit && !two.view);
        assert!(two.delete && two.process);
    }

    #[test]
    fn select_replaces_and_dedupes() {
        let mut s = select(&["a", "b"]);
        s.apply(SelectionAction::Select(vec!["c".into(), "c".into(), "a".into()]));
        assert_eq!(s.ids(), ["c", "a"]);
        s.apply(SelectionAction::Clear);
        assert!(s.is_empty());
    }

    #[test]
    fn status_map_merges_and_clears() {
        let mut board = StatusBoard::default();
        board.apply(StatusAction::Set("a".into(), FileStatus::Failure));
        board.apply(StatusAction::SetMany(HashMap::from([
            ("a".to_string(), FileStatus::Success),
            ("b".to_string(), FileStatus::NeedApprove),
        ])));

        assert_eq!(board.status("a"), FileStatus::Success);
        assert_eq!(board.status("b").label(), "Need to approve");
        assert_eq!(board.status("zzz"), FileStatus::Unset);

        board.apply(StatusAction::ClearAll);
        assert_eq!(board.status("a").label(), "Not processed");
    }

    #[test]
    fn view_requires_one_viewable_file() {
        let mut board = StatusBoard::default();
        board.apply(StatusAction::Set("a".into(), FileStatus::Failure));
        board.apply(StatusAction::Set("b".into(), FileStatus::Approved));

        assert_eq!(
            view_target(&select(&["a", "b"]), &board).unwrap_err().message,
            "Please select exactly one file to view."
        );
        assert_eq!(
            view_target(&select(&["a"]), &board).unwrap_err().message,
            "Only successfully processed files can be viewed."
        );
        assert_eq!(view_target(&select(&["b"]), &board), Ok("b"));
    }
}
