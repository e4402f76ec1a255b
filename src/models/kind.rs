use serde::{Deserialize, Serialize};
use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"];

/// Display classification of a stored document.
///
/// A declared MIME type wins when it carries information; the filename
/// extension is only consulted when the MIME is missing or the generic
/// `application/octet-stream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum DocumentKind {
    #[serde(rename = "PDF")]
    Pdf,
    Image,
    Other,
}

impl DocumentKind {
    pub fn classify(mime: Option<&str>, name: &str) -> Self {
        if let Some(mime) = mime.map(str::trim).filter(|m| !m.is_empty()) {
            let mime = mime.to_ascii_lowercase();
            if mime != OCTET_STREAM {
                return if mime.contains("pdf") {
                    DocumentKind::Pdf
                } else if mime.starts_with("image/") {
                    DocumentKind::Image
                } else {
                    DocumentKind::Other
                };
            }
        }

        match extension(name).as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => DocumentKind::Image,
            _ => DocumentKind::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Image => "Image",
            DocumentKind::Other => "Other",
        }
    }
}

/// Lowercased extension of `name`, without the dot.
pub fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::to_ascii_lowercase)
}

/// MIME type for a filename, used when the uploader did not declare one and
/// when rebuilding metadata from the directory.
pub fn mime_from_name(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("dwg") => "image/vnd.dwg",
        Some("dxf") => "image/vnd.dxf",
        _ => OCTET_STREAM,
    }
}

/// Resolve the `type` stored on a record: the declared content type unless it
/// is missing or generic.
pub fn resolve_mime(declared: Option<&str>, name: &str) -> String {
    match declared.map(str::trim) {
        Some(m) if !m.is_empty() && !m.eq_ignore_ascii_case(OCTET_STREAM) => m.to_string(),
        _ => mime_from_name(name).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_mime_takes_precedence_over_extension() {
        assert_eq!(DocumentKind::classify(Some("application/pdf"), "scan.png"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::classify(Some("image/png"), "drawing.pdf"), DocumentKind::Image);
        assert_eq!(DocumentKind::classify(Some("text/plain"), "drawing.pdf"), DocumentKind::Other);
    }

    #[test]
    fn generic_or_missing_mime_falls_back_to_extension() {
        assert_eq!(DocumentKind::classify(None, "A-101.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::classify(Some(""), "site.JPEG"), DocumentKind::Image);
        assert_eq!(DocumentKind::classify(Some(OCTET_STREAM), "site.webp"), DocumentKind::Image);
        assert_eq!(DocumentKind::classify(None, "notes"), DocumentKind::Other);
    }

    #[test]
    fn resolve_mime_infers_only_when_needed() {
        assert_eq!(resolve_mime(Some("image/png"), "b.png"), "image/png");
        assert_eq!(resolve_mime(None, "a.pdf"), "application/pdf");
        assert_eq!(resolve_mime(Some(OCTET_STREAM), "b.png"), "image/png");
        assert_eq!(resolve_mime(None, "archive.zip"), OCTET_STREAM);
    }
}
