//! WebHDFS REST client
//!
//! Handles the byte-moving operations of the HDFS backend: status lookups,
//! streaming reads and two-step creates with in-memory or streamed file
//! bodies. The namenode answers `OPEN` and
//! `CREATE` with a `307 Temporary Redirect` to a datanode; redirects are
//! followed by hand so the create body is not sent to the namenode.

use crate::config::HdfsConfig;
use crate::domain::{PipelineError, Result, StoreError, StorePath};
use reqwest::header::LOCATION;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, ClientBuilder, Response, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use url::Url;

/// Subset of the WebHDFS `FileStatus` object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    /// `FILE` or `DIRECTORY`
    #[serde(rename = "type")]
    pub kind: String,

    /// Length in bytes
    #[serde(default)]
    pub length: u64,
}

impl FileStatus {
    pub fn is_dir(&self) -> bool {
        self.kind == "DIRECTORY"
    }
}

#[derive(Debug, Deserialize)]
struct FileStatusEnvelope {
    #[serde(rename = "FileStatus")]
    file_status: FileStatus,
}

/// Client for the namenode's WebHDFS endpoint
#[derive(Debug, Clone)]
pub struct WebHdfsClient {
    base_url: Url,
    user: String,
    client: Client,
}

impl WebHdfsClient {
    /// Build a client from the HDFS configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `web_url` is not a valid URL or the
    /// HTTP client cannot be built.
    pub fn new(config: &HdfsConfig) -> Result<Self> {
        let base_url = Url::parse(config.web_url.trim_end_matches('/')).map_err(|e| {
            PipelineError::Configuration(format!("Invalid WebHDFS URL '{}': {e}", config.web_url))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                PipelineError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url,
            user: config.user.clone(),
            client,
        })
    }

    /// REST URL for `op` on `path`
    pub fn op_url(&self, path: &StorePath, op: &str, extra: &[(&str, &str)]) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/webhdfs/v1{}", path.as_str())).map_err(|e| {
            StoreError::InvalidResponse(format!("Cannot build WebHDFS URL for {path}: {e}"))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("op", op);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
            query.append_pair("user.name", &self.user);
        }
        Ok(url)
    }

    /// Status of `path`, `None` when it does not exist
    pub async fn status(&self, path: &StorePath) -> Result<Option<FileStatus>> {
        let url = self.op_url(path, "GETFILESTATUS", &[])?;
        let resp = self.client.get(url).send().await.map_err(connection_error)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let envelope: FileStatusEnvelope = resp.json().await.map_err(|e| {
                    StoreError::InvalidResponse(format!("Malformed FileStatus for {path}: {e}"))
                })?;
                Ok(Some(envelope.file_status))
            }
            _ => Err(http_error(resp).await),
        }
    }

    /// Stream `remote` into `local`, replacing any existing file
    pub async fn download(&self, remote: &StorePath, local: &Path) -> Result<()> {
        let mut resp = self.open(remote).await?;
        let mut file = tokio::fs::File::create(local).await.map_err(StoreError::from)?;

        let mut bytes = 0u64;
        while let Some(chunk) = resp.chunk().await.map_err(connection_error)? {
            file.write_all(&chunk).await.map_err(StoreError::from)?;
            bytes += chunk.len() as u64;
        }
        file.flush().await.map_err(StoreError::from)?;

        tracing::debug!(remote = %remote, local = %local.display(), bytes, "Downloaded object");
        Ok(())
    }

    /// First `n` lines of `path`, reading no more of the body than needed
    pub async fn read_head(&self, path: &StorePath, n: usize) -> Result<Vec<String>> {
        let mut resp = self.open(path).await?;
        let mut buffer: Vec<u8> = Vec::new();

        while buffer.iter().filter(|b| **b == b'\n').count() < n {
            match resp.chunk().await.map_err(connection_error)? {
                Some(chunk) => buffer.extend_from_slice(&chunk),
                None => break,
            }
        }

        let text = String::from_utf8_lossy(&buffer);
        Ok(super::traits::head_lines(&text, n))
    }

    /// Create or overwrite `path` with `data`
    pub async fn create(&self, path: &StorePath, data: Vec<u8>) -> Result<()> {
        let bytes = data.len() as u64;
        self.create_with_body(path, Body::from(data), bytes).await
    }

    /// Create or overwrite `path` with the contents of `local`
    ///
    /// The file is streamed in chunks, never held in memory as a whole.
    pub async fn create_from_file(&self, path: &StorePath, local: &Path) -> Result<()> {
        let file = tokio::fs::File::open(local).await.map_err(|e| {
            PipelineError::Io(format!("Failed to open {}: {e}", local.display()))
        })?;
        let bytes = file.metadata().await.map_err(StoreError::from)?.len();

        let body = Body::wrap_stream(ReaderStream::new(file));
        self.create_with_body(path, body, bytes).await
    }

    async fn create_with_body(&self, path: &StorePath, body: Body, bytes: u64) -> Result<()> {
        let url = self.op_url(path, "CREATE", &[("overwrite", "true")])?;
        let resp = self.client.put(url).send().await.map_err(connection_error)?;

        // Gateways that answer directly (HttpFS) take the body with `data=true`
        let location = match resp.status() {
            StatusCode::TEMPORARY_REDIRECT => redirect_location(&resp)?,
            status if status.is_success() => {
                self.op_url(path, "CREATE", &[("overwrite", "true"), ("data", "true")])?
            }
            _ => return Err(http_error(resp).await),
        };

        let resp = self
            .client
            .put(location)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, bytes)
            .body(body)
            .send()
            .await
            .map_err(connection_error)?;

        if !resp.status().is_success() {
            return Err(http_error(resp).await);
        }

        tracing::debug!(path = %path, bytes, "Created object");
        Ok(())
    }

    async fn open(&self, path: &StorePath) -> Result<Response> {
        let url = self.op_url(path, "OPEN", &[])?;
        let resp = self.client.get(url).send().await.map_err(connection_error)?;

        let resp = match resp.status() {
            StatusCode::TEMPORARY_REDIRECT => {
                let location = redirect_location(&resp)?;
                self.client
                    .get(location)
                    .send()
                    .await
                    .map_err(connection_error)?
            }
            _ => resp,
        };

        match resp.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(path.to_string()).into()),
            status if status.is_success() => Ok(resp),
            _ => Err(http_error(resp).await),
        }
    }
}

fn redirect_location(resp: &Response) -> Result<Url> {
    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| StoreError::InvalidResponse("Redirect without Location header".into()))?;

    // Relative locations resolve against the namenode URL
    resp.url().join(location).map_err(|e| {
        StoreError::InvalidResponse(format!("Invalid redirect location '{location}': {e}")).into()
    })
}

fn connection_error(err: reqwest::Error) -> PipelineError {
    StoreError::Connection(err.to_string()).into()
}

async fn http_error(resp: Response) -> PipelineError {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    StoreError::Http { status, message }.into()
}
