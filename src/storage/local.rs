// src/storage/local.rs

//! Local filesystem storage implementation.
//!
//! Writes one pretty-printed JSON document per project under the root
//! directory, atomically (write to temp, then rename).

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Blueprint;
use crate::storage::BlueprintStorage;

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path_for(&self, project_name: &str) -> PathBuf {
        self.root_dir.join(format!("{project_name}.json"))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &PathBuf, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl BlueprintStorage for LocalStorage {
    async fn write_blueprint(&self, blueprint: &Blueprint) -> Result<String> {
        let path = self.path_for(&blueprint.project_name);
        let bytes = serde_json::to_vec_pretty(blueprint)?;
        self.write_bytes(&path, &bytes).await?;

        log::info!(
            "blueprint written: {} clusters to {}",
            blueprint.unique_clusters_found,
            path.display()
        );
        Ok(path.display().to_string())
    }

    async fn load_blueprint(&self, project_name: &str) -> Result<Option<Blueprint>> {
        let path = self.path_for(project_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
