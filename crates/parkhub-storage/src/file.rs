//! Shared helpers for whole-file JSON persistence.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use parkhub_core::error::{AppError, ErrorKind};
use parkhub_core::result::AppResult;

/// Read and parse a JSON file. A missing file yields `Ok(None)`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read {}", path.display()),
                e,
            ));
        }
    };

    let value = serde_json::from_slice(&data).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Failed to parse {}", path.display()),
            e,
        )
    })?;
    Ok(Some(value))
}

/// Serialize `value` as pretty JSON and replace `path` with it.
///
/// The data is written to a uniquely named sibling temporary file and
/// renamed over the target, so readers never see a half-written file and
/// concurrent writers never share a temporary file.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {}", parent.display()),
                e,
            )
        })?;
    }

    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));
    fs::write(&tmp, &data).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to write {}", tmp.display()),
            e,
        )
    })?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to replace {}", path.display()),
            e,
        ));
    }

    debug!(path = %path.display(), bytes = data.len(), "Wrote JSON file");
    Ok(())
}
