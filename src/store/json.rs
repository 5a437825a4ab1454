//! Liked-songs store backed by a single JSON file

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{LikedRecords, LikedStore};
use crate::error::{Error, Result};
use crate::model::Track;

/// Write-through store: records live in memory and every change rewrites the file.
pub struct JsonLikedStore {
    path: PathBuf,
    records: Mutex<LikedRecords>,
}

impl JsonLikedStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => LikedRecords::default(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                Error::store(format!("corrupt liked store {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Liked store file not found, starting empty");
                LikedRecords::default()
            }
            Err(e) => return Err(Error::store(format!("{}: {e}", path.display()))),
        };

        tracing::info!(
            path = %path.display(),
            records = records.records().len(),
            "Opened liked store"
        );

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &LikedRecords) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| Error::store(e.to_string()))?;
            }
        }

        let content =
            serde_json::to_string_pretty(records).map_err(|e| Error::store(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| Error::store(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::store(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LikedStore for JsonLikedStore {
    async fn add(&self, user_id: &str, track: &Track) -> Result<()> {
        let mut records = self.records.lock().await;
        let mut updated = records.clone();
        if !updated.add(user_id, track) {
            return Ok(());
        }
        self.persist(&updated).await?;
        *records = updated;
        tracing::debug!(user_id, track_id = %track.id, "Like persisted");
        Ok(())
    }

    async fn remove(&self, user_id: &str, track_id: &str) -> Result<()> {
        let mut records = self.records.lock().await;
        let mut updated = records.clone();
        if !updated.remove(user_id, track_id) {
            return Ok(());
        }
        self.persist(&updated).await?;
        *records = updated;
        tracing::debug!(user_id, track_id, "Like removed");
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Track>> {
        Ok(self.records.lock().await.list_by_user(user_id))
    }
}
