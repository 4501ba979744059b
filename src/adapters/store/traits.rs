//! Distributed store abstraction
//!
//! This module defines the capability set the export engine needs from a
//! distributed store. Each operation reports success or failure distinctly;
//! `move_path` reports failure as a [`MoveResult`] value because a failed
//! rename is an expected outcome that triggers the copy fallback.

use crate::domain::{Result, StorePath};
use async_trait::async_trait;
use std::path::Path;

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// Full path of the entry
    pub path: StorePath,

    /// Whether the entry is a directory
    pub is_dir: bool,

    /// Size in bytes (0 for directories)
    pub size: u64,
}

impl StoreEntry {
    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.file_name()
    }
}

/// Directory listing plus the raw backend output kept for diagnostics
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Parsed entries in backend order
    pub entries: Vec<StoreEntry>,

    /// Raw listing text as produced by the backend
    pub raw: String,
}

/// Outcome of an attempted atomic rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// The object now lives at the destination
    Moved,
    /// The rename did not happen; carries the cause
    Failed(String),
}

impl MoveResult {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveResult::Moved)
    }
}

/// Distributed store capability trait
///
/// Implementations must be safe to share between tasks; a single handle is
/// passed explicitly to every component that talks to the store.
#[async_trait]
pub trait DistributedStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Whether an object or directory exists at `path`
    ///
    /// Never fails: an inability to query is logged and reported as `false`.
    async fn exists(&self, path: &StorePath) -> bool;

    /// Remove a single object; absence is not an error
    async fn remove(&self, path: &StorePath) -> Result<()>;

    /// Remove a directory tree or object; absence is not an error
    async fn remove_recursive(&self, path: &StorePath) -> Result<()>;

    /// List the direct children of `path`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ListFailed` if the path is unreachable.
    async fn list(&self, path: &StorePath) -> Result<Listing>;

    /// Attempt an atomic rename from `src` to `dst`
    async fn move_path(&self, src: &StorePath, dst: &StorePath) -> MoveResult;

    /// Copy a remote object to a local file, overwriting it
    async fn download(&self, remote: &StorePath, local: &Path) -> Result<()>;

    /// Copy a local file to a remote object, overwriting it
    async fn upload(&self, local: &Path, remote: &StorePath) -> Result<()>;

    /// Write `content` as one whole object, overwriting it
    async fn write_text(&self, path: &StorePath, content: &str) -> Result<()>;

    /// First `n` lines of a text object
    async fn read_head(&self, path: &StorePath, n: usize) -> Result<Vec<String>>;
}

/// First `n` lines of a text blob, without line terminators
pub(crate) fn head_lines(content: &str, n: usize) -> Vec<String> {
    content.lines().take(n).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_lines() {
        let content = "a,b\n1,2\n3,4\n";
        assert_eq!(head_lines(content, 2), vec!["a,b", "1,2"]);
        assert_eq!(head_lines(content, 10).len(), 3);
        assert!(head_lines("", 5).is_empty());
    }

    #[test]
    fn test_entry_name() {
        let entry = StoreEntry {
            path: StorePath::new("/tmp/out/part-00000.csv").unwrap(),
            is_dir: false,
            size: 12,
        };
        assert_eq!(entry.name(), "part-00000.csv");
    }

    #[test]
    fn test_move_result() {
        assert!(MoveResult::Moved.is_moved());
        assert!(!MoveResult::Failed("cross-device".into()).is_moved());
    }
}
