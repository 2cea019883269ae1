//! JSON file store for the posture reference and check history.
//!
//! The whole document is loaded, changed and written back on every call.
//! Each write goes through its own temp file in the target directory, so a
//! reader never sees a half-written document. There is no locking between
//! load and write: concurrent writers race and the last one wins.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::errors::AppError;
use crate::models::{
    iso_timestamp, GoodPostureReference, PostureCheckRecord, PostureDocument, ReferenceView,
};

/// Posture history backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file yields an empty document.
    pub async fn load(&self) -> Result<PostureDocument, AppError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PostureDocument::default()),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            tracing::error!("Corrupt posture file {}: {}", self.path.display(), e);
            AppError::CorruptDocument(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Write the document, replacing the file in one step.
    pub async fn save(&self, document: &PostureDocument) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(document)?;

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
                })?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), AppError> {
            let mut file = NamedTempFile::new_in(&dir)?;
            file.write_all(json.as_bytes())?;
            file.as_file().sync_all()?;
            file.persist(&path).map_err(|e| {
                AppError::Storage(format!("Failed to replace {}: {}", path.display(), e.error))
            })?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Storage(format!("Write task failed: {}", e)))?
    }

    /// Store `measurements` as the new good-posture reference.
    pub async fn set_reference(&self, measurements: Value) -> Result<GoodPostureReference, AppError> {
        let now = iso_timestamp(Utc::now());
        let mut document = self.load().await?;

        let reference = document.set_reference(measurements, &now).clone();
        self.write(document, &now).await?;

        tracing::info!("Good posture reference set at {}", now);
        Ok(reference)
    }

    /// Append a check exactly as the caller sent it. Returns the new history
    /// length.
    pub async fn append_check(
        &self,
        current: Value,
        differences: Option<Value>,
        score: Value,
        timestamp: Value,
    ) -> Result<usize, AppError> {
        let now = iso_timestamp(Utc::now());
        let mut document = self.load().await?;

        tracing::debug!("Recording posture check (score {})", score);
        document.append_check(
            PostureCheckRecord {
                timestamp: Some(timestamp),
                current_posture: Some(current),
                differences,
                score: Some(score),
                ..PostureCheckRecord::default()
            },
            &now,
        );
        let total = document.posture_history.len();
        self.write(document, &now).await?;

        tracing::debug!("Posture history now holds {} checks", total);
        Ok(total)
    }

    /// The stored reference, or the `not_set` marker.
    pub async fn reference(&self) -> Result<ReferenceView, AppError> {
        Ok(self.load().await?.reference_view())
    }

    /// All check records in insertion order.
    pub async fn history(&self) -> Result<Vec<PostureCheckRecord>, AppError> {
        Ok(self.load().await?.posture_history)
    }

    async fn write(&self, mut document: PostureDocument, now: &str) -> Result<(), AppError> {
        document.prepare_for_write(now);
        self.save(&document).await
    }
}
