use serde::Serialize;

use super::selection::StatusBoard;
use crate::models::{DocumentKind, FileRecord};

/// One display row of the file table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRow {
    pub id: String,
    pub serial_no: usize,
    pub document_no: String,
    pub name: String,
    pub kind: DocumentKind,
    pub size: String,
    pub last_modified: String,
    pub status: &'static str,
    pub viewable: bool,
}

pub fn build_rows(files: &[FileRecord], board: &StatusBoard) -> Vec<FileRow> {
    files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let status = board.status(&file.id);
            FileRow {
                id: file.id.clone(),
                serial_no: index + 1,
                document_no: document_number(&file.id).to_string(),
                name: if file.name.is_empty() {
                    "N/A".to_string()
                } else {
                    file.name.clone()
                },
                kind: file.kind(),
                size: format_size(file.size),
                last_modified: format_date(file.last_modified),
                status: status.label(),
                viewable: status.is_viewable(),
            }
        })
        .collect()
}

pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if size == 0 {
        "0 KB".to_string()
    } else if size < KB {
        format!("{} B", size)
    } else if size < MB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else {
        format!("{:.2} MB", size as f64 / MB as f64)
    }
}

/// `dd/mm/yyyy` in UTC, or `N/A` for a missing timestamp.
pub fn format_date(millis: i64) -> String {
    if millis == 0 {
        return "N/A".to_string();
    }
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Leading digits of a stored id, used as the document number in viewer links.
pub fn document_number(id: &str) -> &str {
    let end = id.find(|c: char| !c.is_ascii_digit()).unwrap_or(id.len());
    if end == 0 {
        id
    } else {
        &id[..end]
    }
}
