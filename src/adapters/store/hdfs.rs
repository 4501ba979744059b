//! HDFS store backend
//!
//! Namespace operations (`ls`, `mv`, `rm`) run through the `hdfs dfs` CLI so
//! they behave exactly like an operator's shell session. Data transfer and
//! existence checks use WebHDFS.

use super::command::{render_command, CommandRunner, ProcessRunner};
use super::retry::with_retry;
use super::traits::{DistributedStore, Listing, MoveResult, StoreEntry};
use super::webhdfs::WebHdfsClient;
use crate::config::{HdfsConfig, RetryConfig};
use crate::domain::{Result, StoreError, StorePath};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// [`DistributedStore`] backed by an HDFS cluster
pub struct HdfsStore {
    rpc_url: String,
    binary: String,
    runner: Arc<dyn CommandRunner>,
    web: WebHdfsClient,
    retry: RetryConfig,
}

impl HdfsStore {
    /// Create a store that shells out to the configured `hdfs` binary
    pub fn new(config: &HdfsConfig, retry: RetryConfig) -> Result<Self> {
        let runner = Arc::new(ProcessRunner::with_timeout_secs(
            config.command_timeout_seconds,
        ));
        Self::with_runner(config, retry, runner)
    }

    /// Create a store with a custom command runner
    pub fn with_runner(
        config: &HdfsConfig,
        retry: RetryConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        Ok(Self {
            rpc_url: config.rpc_url.trim_end_matches('/').to_string(),
            binary: config.binary.clone(),
            runner,
            web: WebHdfsClient::new(config)?,
            retry,
        })
    }

    /// Fully-qualified URI handed to `hdfs dfs`
    fn qualify(&self, path: &StorePath) -> String {
        format!("{}{}", self.rpc_url, path.as_str())
    }

    fn dfs_args(&self, args: &[&str]) -> Vec<String> {
        std::iter::once("dfs")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    /// Run `hdfs <args>` and fail on a non-zero exit status
    async fn dfs(&self, args: &[String]) -> Result<String> {
        let output = self.runner.run(&self.binary, args).await?;
        if output.success() {
            Ok(output.output)
        } else {
            Err(StoreError::CommandFailed {
                command: render_command(&self.binary, args),
                status: output.status,
                output: output.output,
            }
            .into())
        }
    }
}

#[async_trait]
impl DistributedStore for HdfsStore {
    fn backend(&self) -> &'static str {
        "hdfs"
    }

    async fn exists(&self, path: &StorePath) -> bool {
        match with_retry(&self.retry, "exists", || self.web.status(path)).await {
            Ok(status) => status.is_some(),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Existence check failed");
                false
            }
        }
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        let args = self.dfs_args(&["-rm", "-f", &self.qualify(path)]);
        with_retry(&self.retry, "remove", || self.dfs(&args)).await?;
        tracing::debug!(path = %path, "Removed object");
        Ok(())
    }

    async fn remove_recursive(&self, path: &StorePath) -> Result<()> {
        let args = self.dfs_args(&["-rm", "-r", "-f", "-skipTrash", &self.qualify(path)]);
        with_retry(&self.retry, "remove_recursive", || self.dfs(&args)).await?;
        tracing::debug!(path = %path, "Removed directory tree");
        Ok(())
    }

    async fn list(&self, path: &StorePath) -> Result<Listing> {
        let args = self.dfs_args(&["-ls", &self.qualify(path)]);
        let raw = with_retry(&self.retry, "list", || self.dfs(&args))
            .await
            .map_err(|e| StoreError::ListFailed {
                path: path.to_string(),
                cause: e.to_string(),
            })?;

        Ok(Listing {
            entries: parse_ls_output(&raw),
            raw,
        })
    }

    async fn move_path(&self, src: &StorePath, dst: &StorePath) -> MoveResult {
        let args = self.dfs_args(&["-mv", &self.qualify(src), &self.qualify(dst)]);
        match self.dfs(&args).await {
            Ok(_) => MoveResult::Moved,
            Err(e) => MoveResult::Failed(e.to_string()),
        }
    }

    async fn download(&self, remote: &StorePath, local: &Path) -> Result<()> {
        with_retry(&self.retry, "download", || self.web.download(remote, local)).await
    }

    async fn upload(&self, local: &Path, remote: &StorePath) -> Result<()> {
        // Each attempt reopens the file and streams it from the start
        with_retry(&self.retry, "upload", || self.web.create_from_file(remote, local)).await
    }

    async fn write_text(&self, path: &StorePath, content: &str) -> Result<()> {
        with_retry(&self.retry, "write_text", || {
            self.web.create(path, content.as_bytes().to_vec())
        })
        .await
    }

    async fn read_head(&self, path: &StorePath, n: usize) -> Result<Vec<String>> {
        with_retry(&self.retry, "read_head", || self.web.read_head(path, n)).await
    }
}

/// Parse `hdfs dfs -ls` output
///
/// Entry lines have eight whitespace-separated fields with the path last;
/// the `Found N items` header and anything unparseable are skipped.
pub fn parse_ls_output(raw: &str) -> Vec<StoreEntry> {
    raw.lines().filter_map(parse_ls_line).collect()
}

fn parse_ls_line(line: &str) -> Option<StoreEntry> {
    let mut rest = line.trim();
    let mut fields = Vec::with_capacity(7);
    for _ in 0..7 {
        let end = rest.find(char::is_whitespace)?;
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() {
        return None;
    }

    let permissions = fields[0];
    let size = fields[4].parse::<u64>().ok()?;
    let path = StorePath::new(strip_authority(rest)).ok()?;

    Some(StoreEntry {
        path,
        is_dir: permissions.starts_with('d'),
        size,
    })
}

/// `hdfs://namenode:9000/a/b` -> `/a/b`
fn strip_authority(uri: &str) -> &str {
    match uri.split_once("://") {
        Some((_, after_scheme)) => after_scheme
            .find('/')
            .map_or("/", |idx| &after_scheme[idx..]),
        None => uri,
    }
}
