use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::AppError;

const MAX_NAME_ATTEMPTS: usize = 8;

/// Uploaded bytes on local disk, one file per upload.
///
/// Stored names are `{millis}-{original}`; `millis` never repeats within a
/// process, and `create_new` refuses to clobber a name left by an earlier run.
pub struct DiskStore {
    root: PathBuf,
    base_url: String,
    last_stamp: AtomicI64,
}

impl DiskStore {
    pub async fn open(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            base_url: base_url.into(),
            last_stamp: AtomicI64::new(0),
        })
    }

    /// Millisecond timestamp strictly greater than any previously returned.
    pub fn next_stamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut prev = self.last_stamp.load(Ordering::Acquire);
        loop {
            let next = now.max(prev + 1);
            match self
                .last_stamp
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    /// Write `data` under a fresh name derived from `original`; returns the stored name.
    pub async fn put_object(&self, original: &str, data: &[u8]) -> Result<String, AppError> {
        let clean = sanitize_filename(original);

        for _ in 0..MAX_NAME_ATTEMPTS {
            let stored = format!("{}-{}", self.next_stamp(), clean);
            let path = self.root.join(&stored);
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = write_all_synced(&mut file, data).await {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(e.into());
            }
            return Ok(stored);
        }

        Err(AppError::InternalServerError(format!(
            "Could not allocate a unique name for '{}'",
            clean
        )))
    }

    pub async fn get_object(&self, id: &str) -> Result<Vec<u8>, AppError> {
        let path = self.path_for(id)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored file. Returns `false` when it was already gone.
    pub async fn delete_object(&self, id: &str) -> Result<bool, AppError> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path_for(&self, id: &str) -> Result<PathBuf, AppError> {
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(AppError::BadRequest(format!("Invalid file id '{}'", id)));
        }
        Ok(self.root.join(id))
    }

    pub fn url_for(&self, id: &str) -> String {
        file_url(&self.base_url, id)
    }
}

async fn write_all_synced(file: &mut fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Public URL of a stored file: `{base}/uploads/{id}` with `id` encoded as one
/// path segment.
pub fn file_url(base_url: &str, id: &str) -> String {
    match Url::parse(base_url) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push("uploads").push(id);
            }
            url.to_string()
        }
        Err(_) => format!("{}/uploads/{}", base_url.trim_end_matches('/'), id),
    }
}

/// Final path component of a client-supplied filename, stripped of control
/// characters.
pub fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Original filename recovered from a stored name, if it has the
/// `{millis}-` prefix.
pub fn original_name(stored: &str) -> &str {
    match stored.split_once('-') {
        Some((stamp, rest))
            if !stamp.is_empty() && !rest.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => stored,
    }
}
