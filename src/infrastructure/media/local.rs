//! Filesystem-backed media storage.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::json;
use tokio::fs;
use uuid::Uuid;

use super::{DecodedImage, MediaStorage};
use crate::error::AppError;

/// Stores files under a local media root.
pub struct LocalMediaStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStorage {
    /// Creates a storage rooted at `root`; URLs are built as `{base_url}/media/{path}`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

fn io_error(action: &str, e: std::io::Error) -> AppError {
    tracing::error!(error = %e, "Media storage {action} failed");
    AppError::internal("Media storage error", json!({ "action": action }))
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn save(&self, dir: &str, image: DecodedImage) -> Result<String, AppError> {
        let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
        let relative = format!("{}/{}", dir.trim_matches('/'), file_name);

        let target_dir = self.root.join(dir.trim_matches('/'));
        fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| io_error("create_dir", e))?;
        fs::write(target_dir.join(&file_name), &image.bytes)
            .await
            .map_err(|e| io_error("write", e))?;

        tracing::debug!(path = %relative, size = image.bytes.len(), "Stored media file");
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        if path.split('/').any(|segment| segment == "..") {
            return Err(AppError::bad_request(
                "Invalid media path",
                json!({ "path": path }),
            ));
        }

        match fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete", e)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/media/{}", self.base_url, path)
    }
}
