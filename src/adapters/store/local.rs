//! Local filesystem store backend
//!
//! Maps store paths onto a root directory. Used for single-node runs and as
//! the backing store of the integration tests.

use super::traits::{head_lines, DistributedStore, Listing, MoveResult, StoreEntry};
use crate::domain::{Result, StoreError, StorePath};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// [`DistributedStore`] rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`
    ///
    /// The directory is not created; store operations create parents on demand.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory backing the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of `path`
    pub fn resolve(&self, path: &StorePath) -> PathBuf {
        self.root.join(path.as_str().trim_start_matches('/'))
    }

    async fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::from)?;
        }
        Ok(())
    }
}

#[async_trait]
impl DistributedStore for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn exists(&self, path: &StorePath) -> bool {
        tokio::fs::try_exists(self.resolve(path))
            .await
            .unwrap_or(false)
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        match tokio::fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from(e).into()),
        }
    }

    async fn remove_recursive(&self, path: &StorePath) -> Result<()> {
        let local = self.resolve(path);
        let result = match tokio::fs::metadata(&local).await {
            Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&local).await,
            Ok(_) => tokio::fs::remove_file(&local).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from(e).into()),
        }
    }

    async fn list(&self, path: &StorePath) -> Result<Listing> {
        let list_error = |e: std::io::Error| StoreError::ListFailed {
            path: path.to_string(),
            cause: e.to_string(),
        };

        let mut dir = tokio::fs::read_dir(self.resolve(path))
            .await
            .map_err(list_error)?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(list_error)? {
            let meta = entry.metadata().await.map_err(list_error)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let child = path.join(&name).map_err(|e| StoreError::ListFailed {
                path: path.to_string(),
                cause: e,
            })?;
            entries.push(StoreEntry {
                path: child,
                is_dir: meta.is_dir(),
                size: if meta.is_dir() { 0 } else { meta.len() },
            });
        }
        // read_dir order is unspecified
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let raw = entries
            .iter()
            .map(|e| format!("{}\t{}\t{}", if e.is_dir { "d" } else { "-" }, e.size, e.path))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Listing { entries, raw })
    }

    async fn move_path(&self, src: &StorePath, dst: &StorePath) -> MoveResult {
        let to = self.resolve(dst);
        if let Err(e) = self.ensure_parent(&to).await {
            return MoveResult::Failed(e.to_string());
        }
        match tokio::fs::rename(self.resolve(src), &to).await {
            Ok(()) => MoveResult::Moved,
            Err(e) => MoveResult::Failed(e.to_string()),
        }
    }

    async fn download(&self, remote: &StorePath, local: &Path) -> Result<()> {
        let from = self.resolve(remote);
        match tokio::fs::copy(&from, local).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(remote.to_string()).into())
            }
            Err(e) => Err(StoreError::from(e).into()),
        }
    }

    async fn upload(&self, local: &Path, remote: &StorePath) -> Result<()> {
        let to = self.resolve(remote);
        self.ensure_parent(&to).await?;
        tokio::fs::copy(local, &to).await.map_err(StoreError::from)?;
        Ok(())
    }

    async fn write_text(&self, path: &StorePath, content: &str) -> Result<()> {
        let to = self.resolve(path);
        self.ensure_parent(&to).await?;
        tokio::fs::write(&to, content).await.map_err(StoreError::from)?;
        Ok(())
    }

    async fn read_head(&self, path: &StorePath, n: usize) -> Result<Vec<String>> {
        match tokio::fs::read_to_string(self.resolve(path)).await {
            Ok(content) => Ok(head_lines(&content, n)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_string()).into())
            }
            Err(e) => Err(StoreError::from(e).into()),
        }
    }
}
