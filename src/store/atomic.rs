//! Whole-file JSON persistence.
//!
//! Writes go to a sibling temp file, are fsynced, then renamed over the
//! target, so readers never observe a half-written document.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::AppError;

const TEMP_SUFFIX: &str = ".tmp";

/// Read and parse a JSON file. `Ok(None)` when the file does not exist.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&contents)?))
}

pub async fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let serialized = serde_json::to_vec_pretty(data)?;
    let temp_path = temp_path_for(path);

    let result: std::io::Result<()> = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&serialized).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// Move an unreadable file aside so a rebuilt copy does not destroy it.
pub async fn quarantine(path: &Path) -> Result<PathBuf, AppError> {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    let target = PathBuf::from(name);
    fs::rename(path, &target).await?;
    Ok(target)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}{}", std::process::id(), TEMP_SUFFIX));
    PathBuf::from(name)
}
